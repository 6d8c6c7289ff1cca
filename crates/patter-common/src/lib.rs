pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{ConfigError, PatterError};
pub use events::{Event, EventBus};
pub use id::{new_correlation_id, SessionId};
pub use types::{Conversation, Message, Role};

pub type Result<T> = std::result::Result<T, PatterError>;
