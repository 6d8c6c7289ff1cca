//! Conversation data model shared by the log store, the generation client,
//! and the relay.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered sequence of messages. Serializes as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True when roles alternate strictly, starting with `user`.
    pub fn alternates(&self) -> bool {
        self.messages.iter().enumerate().all(|(i, m)| {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            m.role == expected
        })
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result = serde_json::from_str::<Message>(r#"{"role":"system","content":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn extra_field_is_rejected() {
        let result =
            serde_json::from_str::<Message>(r#"{"role":"user","content":"x","extra":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn conversation_is_plain_array() {
        let convo = Conversation::from(vec![Message::user("hello"), Message::assistant("hi")]);
        let json = serde_json::to_string(&convo).unwrap();
        assert_eq!(
            json,
            r#"[{"role":"user","content":"hello"},{"role":"assistant","content":"hi"}]"#
        );
    }

    #[test]
    fn alternation_check() {
        let mut convo = Conversation::new();
        assert!(convo.alternates());
        convo.push(Message::user("a"));
        convo.push(Message::assistant("b"));
        assert!(convo.alternates());
        convo.push(Message::assistant("c"));
        assert!(!convo.alternates());

        let starts_wrong = Conversation::from(vec![Message::assistant("x")]);
        assert!(!starts_wrong.alternates());
    }
}
