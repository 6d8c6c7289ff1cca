//! patter-relay: WebSocket relay between a chat client and a generation
//! backend.
//!
//! Each inbound text frame is one user utterance. The relay reloads the
//! session's conversation log, asks the backend for the next turn, strips
//! reasoning markup from it, saves the extended conversation, and sends
//! the sanitized reply back on the same connection.

mod connection;
mod dispatcher;
mod monitor;
mod protocol;
mod session;
#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use patter_ai::{MarkupSanitizer, OllamaClient, OllamaConfig};
use patter_common::{ConfigError, Event, EventBus, PatterError, SessionId};
use patter_config::{GenerationConfig, PatterConfig};
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_tungstenite::accept_async;
use tracing_subscriber::EnvFilter;

use crate::connection::handle_connection;
use crate::session::{SessionFactory, SessionStore};

/// Extra time past the generation timeout for a running cycle to persist
/// during shutdown.
const SHUTDOWN_SLACK: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "patter-relay", version, about = "WebSocket relay for LLM conversations")]
struct Args {
    /// Config file path (defaults to the platform config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory for conversation log records.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Generation model name.
    #[arg(long)]
    model: Option<String>,

    /// Log filter override (e.g. "patter_relay=debug").
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut PatterConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref dir) = self.log_dir {
            config.log.dir = dir.clone();
        }
        if let Some(ref model) = self.model {
            config.generation.model = model.clone();
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let directive = args.log_level.as_deref().unwrap_or("patter_relay=info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        )
        .init();

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "patter-relay stopped");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> patter_common::Result<()> {
    let mut config = patter_config::load_config(args.config.as_deref())?;
    args.apply(&mut config);

    let session = SessionId::at_process_start();
    let client = OllamaClient::new(ollama_config(&config.generation))
        .map_err(|e| PatterError::Network(e.to_string()))?;
    let sanitizer = MarkupSanitizer::new(&config.markup.begin, &config.markup.end)
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

    let events = EventBus::new(64);
    let monitor = monitor::spawn_event_logger(&events);

    let sessions = SessionStore::new(
        config.server.session_scope,
        session.clone(),
        SessionFactory {
            log_dir: config.log.dir.clone(),
            client: Arc::new(client),
            sanitizer,
            events: events.clone(),
        },
    );

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(
        addr = %addr,
        session = %session,
        scope = ?config.server.session_scope,
        model = %config.generation.model,
        log_dir = %config.log.dir.display(),
        "patter-relay listening"
    );

    let mut connections = JoinSet::new();
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let sessions = sessions.clone();
                    connections.spawn(async move {
                        match accept_async(stream).await {
                            Ok(ws) => handle_connection(ws, peer, sessions).await,
                            Err(e) => {
                                tracing::warn!(peer = %peer, error = %e, "WS handshake failed");
                            }
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "TCP accept error");
                }
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            _ = tokio::signal::ctrl_c() => {
                let open = sessions.count().await;
                tracing::info!(sessions = open, connections = connections.len(), "Shutting down");
                break;
            }
        }
    }

    // Stop reading utterances, then give running cycles time to persist.
    drop(listener);
    sessions.close();
    let grace = Duration::from_secs(config.generation.timeout_secs) + SHUTDOWN_SLACK;
    let drained = tokio::time::timeout(grace, async {
        while connections.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        tracing::warn!(
            connections = connections.len(),
            "Shutdown grace period elapsed; abandoning running cycles"
        );
    }

    events.publish(Event::Shutdown);
    let _ = monitor.await;
    Ok(())
}

fn ollama_config(generation: &GenerationConfig) -> OllamaConfig {
    let mut config = OllamaConfig::new(&generation.base_url, &generation.model)
        .with_timeout(Duration::from_secs(generation.timeout_secs))
        .with_connect_timeout(Duration::from_secs(generation.connect_timeout_secs));
    if let Some(ref prompt) = generation.system_prompt {
        config = config.with_system_prompt(prompt);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_config() {
        let args = Args::parse_from([
            "patter-relay",
            "--port",
            "9001",
            "--log-dir",
            "/var/lib/patter",
            "--model",
            "qwen3:4b",
        ]);
        let mut config = PatterConfig::default();
        args.apply(&mut config);

        assert_eq!(config.server.port, 9001);
        assert_eq!(config.log.dir, PathBuf::from("/var/lib/patter"));
        assert_eq!(config.generation.model, "qwen3:4b");
    }

    #[test]
    fn absent_flags_keep_config() {
        let args = Args::parse_from(["patter-relay"]);
        let mut config = PatterConfig::default();
        args.apply(&mut config);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.generation.model, "deepseek-r1:8b");
    }

    #[test]
    fn generation_config_maps_to_ollama() {
        let generation = GenerationConfig {
            timeout_secs: 30,
            system_prompt: Some("Play the patient.".into()),
            ..GenerationConfig::default()
        };
        let ollama = ollama_config(&generation);
        assert_eq!(ollama.timeout, Duration::from_secs(30));
        assert_eq!(ollama.connect_timeout, Duration::from_secs(10));
        assert_eq!(ollama.system_prompt.as_deref(), Some("Play the patient."));
        assert_eq!(ollama.chat_url(), "http://localhost:11434/api/chat");
    }
}
