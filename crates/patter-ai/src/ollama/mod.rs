//! Ollama chat API client.
//!
//! Implements the `AiClient` trait against a local or remote Ollama
//! server via `POST /api/chat` with streaming disabled, so each call
//! returns the whole reply at once.

mod api;
mod client;
mod config;

pub use client::OllamaClient;
pub use config::OllamaConfig;
