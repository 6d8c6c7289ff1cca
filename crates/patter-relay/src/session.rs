//! Session table: maps connections onto dispatchers and their log records.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use patter_ai::{AiClient, MarkupSanitizer};
use patter_common::{EventBus, SessionId};
use patter_config::SessionScope;
use patter_log::LogStore;
use tokio::sync::{watch, RwLock};
use tracing::info;

use crate::dispatcher::Dispatcher;

/// A live session and the connections currently attached to it.
struct Session {
    dispatcher: Arc<Dispatcher>,
    connections: usize,
    opened_at: Instant,
}

/// Everything needed to open a dispatcher for a new session.
pub struct SessionFactory {
    pub log_dir: PathBuf,
    pub client: Arc<dyn AiClient>,
    pub sanitizer: MarkupSanitizer,
    pub events: EventBus,
}

/// Thread-safe session table.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    scope: SessionScope,
    /// Fixed at process start; connection-scoped ids derive from it.
    process_session: SessionId,
    next_seq: AtomicU64,
    factory: SessionFactory,
    sessions: RwLock<HashMap<SessionId, Session>>,
    /// Flips to true once the server stops taking new utterances.
    closing: watch::Sender<bool>,
}

impl SessionStore {
    pub fn new(scope: SessionScope, process_session: SessionId, factory: SessionFactory) -> Self {
        Self {
            inner: Arc::new(Inner {
                scope,
                process_session,
                next_seq: AtomicU64::new(1),
                factory,
                sessions: RwLock::new(HashMap::new()),
                closing: watch::Sender::new(false),
            }),
        }
    }

    /// Attach a new connection and return its session's dispatcher.
    ///
    /// Process scope: every connection shares the process session.
    /// Connection scope: each call opens a fresh session.
    pub async fn attach(&self) -> Arc<Dispatcher> {
        let session_id = match self.inner.scope {
            SessionScope::Process => self.inner.process_session.clone(),
            SessionScope::Connection => {
                let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
                self.inner.process_session.child(seq)
            }
        };

        let mut map = self.inner.sessions.write().await;
        let session = map.entry(session_id.clone()).or_insert_with(|| {
            info!(session = %session_id, "Opening session");
            Session {
                dispatcher: Arc::new(self.open(session_id.clone())),
                connections: 0,
                opened_at: Instant::now(),
            }
        });
        session.connections += 1;
        session.dispatcher.clone()
    }

    /// Detach a connection. Connection-scoped sessions are dropped once
    /// nothing is attached; the process session lives for the whole run.
    /// Returns true if the session was removed.
    pub async fn detach(&self, session_id: &SessionId) -> bool {
        let mut map = self.inner.sessions.write().await;
        let Some(session) = map.get_mut(session_id) else {
            return false;
        };
        session.connections = session.connections.saturating_sub(1);

        if session.connections == 0 && self.inner.scope == SessionScope::Connection {
            let age = session.opened_at.elapsed();
            map.remove(session_id);
            info!(session = %session_id, age_secs = age.as_secs(), "Closing session");
            return true;
        }
        false
    }

    /// Number of connections attached to a session.
    pub async fn connections(&self, session_id: &SessionId) -> usize {
        self.inner
            .sessions
            .read()
            .await
            .get(session_id)
            .map_or(0, |s| s.connections)
    }

    /// Number of open sessions.
    pub async fn count(&self) -> usize {
        self.inner.sessions.read().await.len()
    }

    /// Tell every connection to stop reading new utterances. Cycles already
    /// running are left to finish and persist.
    pub fn close(&self) {
        self.inner.closing.send_replace(true);
    }

    /// Watch for [`SessionStore::close`].
    pub fn closing(&self) -> watch::Receiver<bool> {
        self.inner.closing.subscribe()
    }

    fn open(&self, session_id: SessionId) -> Dispatcher {
        let factory = &self.inner.factory;
        Dispatcher::new(
            LogStore::new(&factory.log_dir, session_id),
            factory.client.clone(),
            factory.sanitizer.clone(),
            factory.events.clone(),
        )
    }
}
