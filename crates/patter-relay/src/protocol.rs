//! Relay wire protocol. Inbound text frames are raw user utterances; every
//! outbound frame is one of these JSON messages.

use serde::{Deserialize, Serialize};

/// Reason sent when a frame carries no text.
pub const EMPTY_MESSAGE: &str = "empty_message";

/// Messages the relay sends back to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayResponse {
    SessionReady { session_id: String },

    /// Sanitized assistant reply for the latest utterance.
    Reply { content: String },

    Error { reason: String, message: String },
}

impl RelayResponse {
    pub fn error(reason: impl Into<String>, message: impl Into<String>) -> Self {
        RelayResponse::Error {
            reason: reason.into(),
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("relay responses always serialize")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shapes() {
        assert_eq!(
            RelayResponse::SessionReady {
                session_id: "20250312_090507".into()
            }
            .to_json(),
            r#"{"type":"session_ready","session_id":"20250312_090507"}"#
        );
        assert_eq!(
            RelayResponse::Reply {
                content: "Hi there".into()
            }
            .to_json(),
            r#"{"type":"reply","content":"Hi there"}"#
        );
        assert_eq!(
            RelayResponse::error("timeout", "generation failed: Timeout").to_json(),
            r#"{"type":"error","reason":"timeout","message":"generation failed: Timeout"}"#
        );
    }

    #[test]
    fn parses_back() {
        let json = r#"{"type":"reply","content":"ok"}"#;
        let parsed: RelayResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed,
            RelayResponse::Reply {
                content: "ok".into()
            }
        );
    }
}
