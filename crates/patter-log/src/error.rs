use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The on-disk record exists but cannot be read or parsed.
    #[error("corrupt log record {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// The record could not be written; the previous record is intact.
    #[error("failed to write log record {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
