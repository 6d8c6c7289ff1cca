//! Operator channel: turns relay events into log lines and keeps a
//! running count of failed log writes.

use patter_common::{Event, EventBus};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Log every event published on `events` until shutdown.
pub fn spawn_event_logger(events: &EventBus) -> JoinHandle<()> {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        let mut failed_writes: u64 = 0;
        loop {
            match rx.recv().await {
                Ok(Event::PersistFailed { session_id, error }) => {
                    failed_writes += 1;
                    tracing::warn!(
                        session = %session_id,
                        error = %error,
                        failed_writes,
                        "Conversation log is not durable"
                    );
                }
                Ok(Event::CycleFailed { session_id, reason }) => {
                    tracing::warn!(session = %session_id, reason = %reason, "Relay cycle failed");
                }
                Ok(Event::CycleCompleted { session_id, turns }) => {
                    tracing::debug!(session = %session_id, turns, "Relay cycle completed");
                }
                Ok(Event::Shutdown) | Err(RecvError::Closed) => break,
                Ok(Event::Unknown) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event logger fell behind");
                }
            }
        }
    })
}
