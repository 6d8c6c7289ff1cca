//! Relay cycle: history → generation → sanitize → persist → reply.
//!
//! History is reloaded from the log store on every cycle, so a dispatcher
//! carries no conversation content between cycles and a restarted process
//! resumes from whatever is on disk. The log record stays held for the
//! whole cycle, which keeps at most one cycle in flight per session.

use std::sync::Arc;

use patter_ai::{AiClient, AiError, MarkupSanitizer};
use patter_common::{Event, EventBus, Message, SessionId};
use patter_log::{LogError, LogStore};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    AwaitingHistory,
    AwaitingGeneration,
    Sanitizing,
    Persisting,
    Replying,
}

/// A cycle failure surfaced to the caller. Nothing was persisted.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("conversation history unavailable: {0}")]
    History(#[source] LogError),

    #[error("generation failed: {0}")]
    Generation(#[from] AiError),
}

impl RelayError {
    /// Machine-readable reason sent to the client.
    pub fn reason(&self) -> &'static str {
        match self {
            RelayError::History(_) => "corrupt_log",
            RelayError::Generation(AiError::Timeout) => "timeout",
            RelayError::Generation(AiError::ParseError(_)) => "malformed_response",
            RelayError::Generation(_) => "backend_error",
        }
    }
}

pub struct Dispatcher {
    store: LogStore,
    client: Arc<dyn AiClient>,
    sanitizer: MarkupSanitizer,
    events: EventBus,
}

impl Dispatcher {
    pub fn new(
        store: LogStore,
        client: Arc<dyn AiClient>,
        sanitizer: MarkupSanitizer,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            client,
            sanitizer,
            events,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        self.store.session_id()
    }

    /// Run one relay cycle for `user_text` and return the sanitized reply.
    ///
    /// A failed save does not fail the cycle: the reply is still returned
    /// and the failure is logged and published as `Event::PersistFailed`.
    pub async fn handle(&self, user_text: &str) -> Result<String, RelayError> {
        let record = self.store.begin().await;

        self.enter(CycleState::AwaitingHistory);
        let mut conversation = match record.load().await {
            Ok(c) => c,
            Err(e) => return Err(self.fail(RelayError::History(e))),
        };

        conversation.push(Message::user(user_text));

        self.enter(CycleState::AwaitingGeneration);
        let response = match self.client.send_message(conversation.messages()).await {
            Ok(r) => r,
            Err(e) => return Err(self.fail(RelayError::Generation(e))),
        };
        debug!(
            session = %self.session_id(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            total_tokens = response.usage.total_tokens(),
            "generation finished"
        );

        self.enter(CycleState::Sanitizing);
        let reply = self.sanitizer.sanitize(&response.content);
        conversation.push(Message::assistant(reply.clone()));

        self.enter(CycleState::Persisting);
        if let Err(e) = record.save(&conversation).await {
            error!(
                session = %self.session_id(),
                error = %e,
                "conversation not persisted; reply still delivered"
            );
            self.events.publish(Event::PersistFailed {
                session_id: self.session_id().to_string(),
                error: e.to_string(),
            });
        }
        drop(record);

        self.enter(CycleState::Replying);
        info!(
            session = %self.session_id(),
            turns = conversation.len(),
            "relay cycle complete"
        );
        self.events.publish(Event::CycleCompleted {
            session_id: self.session_id().to_string(),
            turns: conversation.len(),
        });

        self.enter(CycleState::Idle);
        Ok(reply)
    }

    fn enter(&self, state: CycleState) {
        debug!(session = %self.session_id(), state = ?state, "cycle state");
    }

    fn fail(&self, err: RelayError) -> RelayError {
        warn!(
            session = %self.session_id(),
            reason = err.reason(),
            error = %err,
            "relay cycle aborted"
        );
        self.events.publish(Event::CycleFailed {
            session_id: self.session_id().to_string(),
            reason: err.reason().to_string(),
        });
        self.enter(CycleState::Idle);
        err
    }
}
