//! Log store: one session's record on disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use patter_common::{Conversation, SessionId};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::error::LogError;

/// Durable record of one conversation.
///
/// The record path is fixed at construction: `<dir>/chat<session_id>.json`.
/// `load` and `save` are serialized; use [`LogStore::begin`] to hold the
/// record across a load/save pair.
pub struct LogStore {
    session_id: SessionId,
    path: PathBuf,
    lock: Mutex<()>,
}

impl LogStore {
    pub fn new(dir: impl AsRef<Path>, session_id: SessionId) -> Self {
        let path = dir.as_ref().join(format!("chat{session_id}.json"));
        Self {
            session_id,
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Take exclusive access to the record until the guard is dropped.
    pub async fn begin(&self) -> RecordGuard<'_> {
        RecordGuard {
            store: self,
            _held: self.lock.lock().await,
        }
    }

    /// Full ordered conversation on disk, or empty if no record exists.
    pub async fn load(&self) -> Result<Conversation, LogError> {
        self.begin().await.load().await
    }

    /// Atomically replace the record with `conversation`.
    pub async fn save(&self, conversation: &Conversation) -> Result<(), LogError> {
        self.begin().await.save(conversation).await
    }

    /// Load, apply `f`, and save without releasing the record in between.
    pub async fn update<F>(&self, f: F) -> Result<Conversation, LogError>
    where
        F: FnOnce(&mut Conversation),
    {
        let guard = self.begin().await;
        let mut conversation = guard.load().await?;
        f(&mut conversation);
        guard.save(&conversation).await?;
        Ok(conversation)
    }

    async fn read_record(&self) -> Result<Conversation, LogError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no log record yet");
                return Ok(Conversation::new());
            }
            Err(e) => return Err(self.corrupt(e.to_string())),
        };

        if content.trim().is_empty() {
            return Ok(Conversation::new());
        }

        let conversation: Conversation =
            serde_json::from_str(&content).map_err(|e| self.corrupt(e.to_string()))?;

        if !conversation.alternates() {
            warn!(
                session = %self.session_id,
                messages = conversation.len(),
                "log record roles do not alternate user/assistant"
            );
        }

        Ok(conversation)
    }

    async fn write_record(&self, conversation: &Conversation) -> Result<(), LogError> {
        let bytes = to_pretty_json(conversation).map_err(|e| self.write_error(e.into()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.write_error(e))?;
            }
        }

        let tmp_path = self.temp_path();
        if let Err(e) = write_synced(&tmp_path, &bytes).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(self.write_error(e));
        }

        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(self.write_error(e));
        }

        debug!(
            session = %self.session_id,
            messages = conversation.len(),
            "log record saved"
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn corrupt(&self, reason: String) -> LogError {
        LogError::Corrupt {
            path: self.path.clone(),
            reason,
        }
    }

    fn write_error(&self, source: std::io::Error) -> LogError {
        LogError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

/// Exclusive hold on a [`LogStore`] record.
pub struct RecordGuard<'a> {
    store: &'a LogStore,
    _held: MutexGuard<'a, ()>,
}

impl RecordGuard<'_> {
    pub async fn load(&self) -> Result<Conversation, LogError> {
        self.store.read_record().await
    }

    pub async fn save(&self, conversation: &Conversation) -> Result<(), LogError> {
        self.store.write_record(conversation).await
    }
}

/// JSON array with four-space indentation.
fn to_pretty_json(conversation: &Conversation) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    conversation.serialize(&mut ser)?;
    Ok(out)
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}
