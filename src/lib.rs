pub mod answerer;
pub mod database;
pub mod doctor;
pub mod flatten;
pub mod models;
pub mod ollama;
pub mod retriever;
pub mod service;
pub mod tui;
pub mod utils;

pub use database::{Database, DbStatus};
pub use models::{ChatMessage, Conversation, RecordLine, Role};
pub use service::{Answer, AssistantService, NOT_FOUND_MESSAGE};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_accessible_from_crate_root() {
        let db = Database::from_lines(vec!["USER (Bob) | Currency: EUR".to_string()]);
        assert_eq!(db.status(), DbStatus::Loaded { records: 1 });
    }

    #[test]
    fn types_accessible_from_crate_root() {
        let line = RecordLine::new("USER (Bob Smith) | Currency: EUR");
        assert_eq!(line.last_field(), "EUR");

        let mut conversation = Conversation::new();
        conversation.push_user("hello");
        assert_eq!(conversation.messages()[0].role, Role::User);

        assert!(NOT_FOUND_MESSAGE.contains("could not find"));
    }
}
