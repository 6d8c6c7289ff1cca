//! AiClient trait implementation for OllamaClient.

use async_trait::async_trait;
use tracing::debug;

use crate::{AiClient, AiError, AiResponse, Message};

use super::client::OllamaClient;

fn classify(e: reqwest::Error) -> AiError {
    if e.is_timeout() {
        AiError::Timeout
    } else if e.is_decode() {
        AiError::ParseError(e.to_string())
    } else {
        AiError::NetworkError(e.to_string())
    }
}

#[async_trait]
impl AiClient for OllamaClient {
    async fn send_message(&self, messages: &[Message]) -> Result<AiResponse, AiError> {
        let body = self.build_request_body(messages);

        debug!(
            model = %self.config.model,
            messages = messages.len(),
            "Ollama chat request"
        );

        let response = self
            .http
            .post(self.config.chat_url())
            .json(&body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.chars().take(200).collect::<String>();
            return Err(AiError::ApiError(format!("HTTP {status}: {text}")));
        }

        let text = response.text().await.map_err(classify)?;
        let json: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| AiError::ParseError(e.to_string()))?;

        self.parse_response(json)
    }
}
