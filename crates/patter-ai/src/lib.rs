//! Generation backend access for Patter.
//!
//! Provides:
//! - the `AiClient` trait the relay calls with the full conversation
//! - an Ollama chat API client
//! - the reasoning-markup sanitizer applied to generated replies

pub mod markup;
pub mod ollama;

use async_trait::async_trait;

pub use markup::{sanitize, MarkupError, MarkupSanitizer};
pub use ollama::{OllamaClient, OllamaConfig};
pub use patter_common::{Message, Role};

/// A generation backend. One call is one blocking round trip.
#[async_trait]
pub trait AiClient: Send + Sync {
    async fn send_message(&self, messages: &[Message]) -> Result<AiResponse, AiError>;
}

#[derive(Debug, Clone)]
pub struct AiResponse {
    pub content: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Timeout")]
    Timeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_tokens_saturates() {
        let usage = TokenUsage {
            input_tokens: u64::MAX,
            output_tokens: 5,
        };
        assert_eq!(usage.total_tokens(), u64::MAX);
    }

    #[test]
    fn ai_error_display() {
        assert_eq!(AiError::Timeout.to_string(), "Timeout");
        assert_eq!(
            AiError::ApiError("HTTP 500: boom".into()).to_string(),
            "API error: HTTP 500: boom"
        );
        assert_eq!(
            AiError::ParseError("missing message".into()).to_string(),
            "Parse error: missing message"
        );
    }
}
