use serde::{Deserialize, Serialize};

/// Generation backend (Ollama chat API) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: String,
    pub model: String,
    /// Whole-request deadline, covering the full generation time.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Sent ahead of the history on every call; never written to the log.
    pub system_prompt: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            model: "deepseek-r1:8b".into(),
            timeout_secs: 120,
            connect_timeout_secs: 10,
            system_prompt: None,
        }
    }
}
