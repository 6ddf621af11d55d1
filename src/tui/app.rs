use crate::database::DbStatus;
use crate::models::{Conversation, Role};

/// Application state for the chat TUI.
///
/// Manages the conversation history, the input buffer, database status for
/// the header, and history scrolling.
#[derive(Debug, Clone)]
pub struct App {
    /// Chat history shown in the main panel
    conversation: Conversation,
    /// Input buffer for the question being typed
    input: String,
    /// Database availability, shown in the header
    db_status: DbStatus,
    /// Model label shown in the header
    model: String,
    /// Scroll offset for the history panel
    history_scroll: u16,
    /// Whether a question is currently being answered
    waiting: bool,
}

impl App {
    /// Creates a new App with an empty conversation.
    ///
    /// # Examples
    ///
    /// ```
    /// use factline::database::DbStatus;
    /// use factline::tui::App;
    ///
    /// let app = App::new(DbStatus::Missing);
    /// assert!(app.conversation().is_empty());
    /// assert_eq!(app.input(), "");
    /// ```
    pub fn new(db_status: DbStatus) -> Self {
        Self {
            conversation: Conversation::new(),
            input: String::new(),
            db_status,
            model: String::new(),
            history_scroll: 0,
            waiting: false,
        }
    }

    /// Sets the model label shown in the header.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Returns the model label shown in the header.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the conversation history.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns the input buffer.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns the database status shown in the header.
    pub fn db_status(&self) -> DbStatus {
        self.db_status
    }

    /// Returns whether an answer is currently in flight.
    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Returns the current history scroll offset.
    pub fn history_scroll(&self) -> u16 {
        self.history_scroll
    }

    /// Refreshes the database status shown in the header.
    pub fn set_db_status(&mut self, status: DbStatus) {
        self.db_status = status;
    }

    /// Adds a character to the input buffer.
    pub fn push_input_char(&mut self, c: char) {
        self.input.push(c);
    }

    /// Removes the last character from the input buffer.
    pub fn pop_input_char(&mut self) {
        self.input.pop();
    }

    /// Takes the input buffer for submission, leaving it empty.
    ///
    /// Returns `None` when the trimmed input is empty, so Enter on a blank
    /// line does nothing.
    pub fn take_input(&mut self) -> Option<String> {
        let question = self.input.trim().to_string();
        self.input.clear();
        if question.is_empty() {
            None
        } else {
            Some(question)
        }
    }

    /// Records the user's question and marks an answer as in flight.
    pub fn begin_question(&mut self, question: &str) {
        self.conversation.push_user(question);
        self.waiting = true;
        self.scroll_to_bottom();
    }

    /// Records the assistant's reply and clears the waiting flag.
    pub fn finish_answer(&mut self, answer: &str) {
        self.conversation.push_assistant(answer);
        self.waiting = false;
        self.scroll_to_bottom();
    }

    /// Clears the conversation history and input.
    pub fn clear_conversation(&mut self) {
        self.conversation.clear();
        self.input.clear();
        self.history_scroll = 0;
        self.waiting = false;
    }

    /// Scrolls the history panel up by the specified amount.
    pub fn scroll_history_up(&mut self, amount: u16) {
        self.history_scroll = self.history_scroll.saturating_sub(amount);
    }

    /// Scrolls the history panel down by the specified amount.
    pub fn scroll_history_down(&mut self, amount: u16) {
        self.history_scroll = self.history_scroll.saturating_add(amount);
    }

    // Jump the viewport past the last message. The renderer clamps the
    // offset to the actual content height.
    fn scroll_to_bottom(&mut self) {
        self.history_scroll = u16::MAX;
    }

    /// Returns the role of the last message, if any.
    pub fn last_role(&self) -> Option<Role> {
        self.conversation.messages().last().map(|m| m.role)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(DbStatus::Missing)
    }
}
