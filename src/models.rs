pub mod conversation;
pub mod message;
pub mod record;

pub use conversation::Conversation;
pub use message::{ChatMessage, Role};
pub use record::RecordLine;
