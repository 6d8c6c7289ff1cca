use serde::{Deserialize, Serialize};

/// Delimiters of the reasoning spans stripped from generated replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    pub begin: String,
    pub end: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            begin: "<think>".into(),
            end: "</think>".into(),
        }
    }
}
