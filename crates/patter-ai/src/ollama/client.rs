//! Ollama client struct, request building, and response parsing.

use crate::{AiError, AiResponse, Message, Role, TokenUsage};

use super::config::OllamaConfig;

/// Ollama API client.
pub struct OllamaClient {
    pub(crate) config: OllamaConfig,
    pub(crate) http: reqwest::Client,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::NetworkError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    /// Build the JSON request body for `/api/chat`.
    pub(crate) fn build_request_body(&self, messages: &[Message]) -> serde_json::Value {
        let mut msgs = Vec::with_capacity(messages.len() + 1);
        if let Some(ref system) = self.config.system_prompt {
            msgs.push(serde_json::json!({
                "role": "system",
                "content": system,
            }));
        }
        for msg in messages {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            msgs.push(serde_json::json!({
                "role": role,
                "content": msg.content,
            }));
        }

        serde_json::json!({
            "model": self.config.model,
            "messages": msgs,
            "stream": false,
        })
    }

    /// Parse a non-streaming `/api/chat` response.
    pub(crate) fn parse_response(&self, json: serde_json::Value) -> Result<AiResponse, AiError> {
        if let Some(err) = json.get("error").and_then(|e| e.as_str()) {
            return Err(AiError::ApiError(err.to_string()));
        }

        let content = json["message"]["content"]
            .as_str()
            .ok_or_else(|| AiError::ParseError("response has no message.content".into()))?
            .to_string();

        let usage = TokenUsage {
            input_tokens: json["prompt_eval_count"].as_u64().unwrap_or(0),
            output_tokens: json["eval_count"].as_u64().unwrap_or(0),
        };

        Ok(AiResponse { content, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(config: OllamaConfig) -> OllamaClient {
        OllamaClient::new(config).unwrap()
    }

    #[test]
    fn request_body_carries_history_in_order() {
        let c = client(OllamaConfig::default());
        let messages = vec![
            Message::user("hello"),
            Message::assistant("Hi there"),
            Message::user("where does it hurt?"),
        ];
        let body = c.build_request_body(&messages);

        assert_eq!(body["model"], "deepseek-r1:8b");
        assert_eq!(body["stream"], false);
        let msgs = body["messages"].as_array().unwrap();
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[0]["role"], "user");
        assert_eq!(msgs[0]["content"], "hello");
        assert_eq!(msgs[1]["role"], "assistant");
        assert_eq!(msgs[2]["content"], "where does it hurt?");
    }

    #[test]
    fn system_prompt_goes_first() {
        let c = client(OllamaConfig::default().with_system_prompt("Play the patient."));
        let body = c.build_request_body(&[Message::user("hi")]);
        let msgs = body["messages"].as_array().unwrap();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0]["role"], "system");
        assert_eq!(msgs[0]["content"], "Play the patient.");
        assert_eq!(msgs[1]["role"], "user");
    }

    #[test]
    fn parses_reply_and_usage() {
        let c = client(OllamaConfig::default());
        let json = serde_json::json!({
            "model": "deepseek-r1:8b",
            "message": { "role": "assistant", "content": "<think>hm</think>Hi" },
            "done": true,
            "prompt_eval_count": 26,
            "eval_count": 12,
        });
        let resp = c.parse_response(json).unwrap();
        assert_eq!(resp.content, "<think>hm</think>Hi");
        assert_eq!(resp.usage.input_tokens, 26);
        assert_eq!(resp.usage.output_tokens, 12);
    }

    #[test]
    fn missing_content_is_parse_error() {
        let c = client(OllamaConfig::default());
        let err = c
            .parse_response(serde_json::json!({ "done": true }))
            .unwrap_err();
        assert!(matches!(err, AiError::ParseError(_)));
    }

    #[test]
    fn error_field_is_api_error() {
        let c = client(OllamaConfig::default());
        let err = c
            .parse_response(serde_json::json!({ "error": "model 'x' not found" }))
            .unwrap_err();
        assert!(matches!(err, AiError::ApiError(ref m) if m.contains("not found")));
    }

    #[test]
    fn chat_url_handles_trailing_slash() {
        let a = OllamaConfig::new("http://localhost:11434/", "m");
        let b = OllamaConfig::new("http://localhost:11434", "m");
        assert_eq!(a.chat_url(), "http://localhost:11434/api/chat");
        assert_eq!(a.chat_url(), b.chat_url());
    }
}
