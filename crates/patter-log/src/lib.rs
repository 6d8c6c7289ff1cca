//! Durable conversation log for Patter.
//!
//! One JSON record per session, rewritten whole on every save through a
//! temporary file and an atomic rename, so a reader only ever sees the
//! previous or the next complete record.

mod error;
mod store;

pub use error::LogError;
pub use store::{LogStore, RecordGuard};
