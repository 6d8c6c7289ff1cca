//! Scripted generation backend for relay tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use patter_ai::{AiClient, AiError, AiResponse, Message, TokenUsage};

/// Replies with queued results in order; `"ok"` once the queue is empty.
pub(crate) struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, AiError>>>,
    calls: Mutex<Vec<Vec<Message>>>,
    delay: Duration,
}

impl ScriptedClient {
    pub(crate) fn new(replies: Vec<Result<String, AiError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Message lists received so far, one entry per call.
    pub(crate) fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiClient for ScriptedClient {
    async fn send_message(&self, messages: &[Message]) -> Result<AiResponse, AiError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("ok".into()));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        next.map(|content| AiResponse {
            content,
            usage: TokenUsage::default(),
        })
    }
}
