use super::message::{ChatMessage, Role};

/// Session-scoped ordered log of chat messages.
///
/// Owned by whichever interface is running (TUI or a future caller) and
/// passed by reference to the rendering layer. Not global state: creating a
/// new `Conversation` or calling [`Conversation::clear`] is the only way to
/// reset history.
///
/// # Examples
///
/// ```
/// use factline::{Conversation, Role};
///
/// let mut conversation = Conversation::new();
/// conversation.push_user("What currency does Bob use?");
/// conversation.push_assistant("EUR");
/// assert_eq!(conversation.len(), 2);
///
/// conversation.clear();
/// assert!(conversation.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Creates an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a user question to the log.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(Role::User, content));
    }

    /// Appends an assistant reply to the log.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages
            .push(ChatMessage::new(Role::Assistant, content));
    }

    /// Returns the messages in insertion order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages in the log.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Discards all messages. The explicit "clear conversation" action.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
