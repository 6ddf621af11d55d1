//! Keyboard event handling for the chat TUI.
//!
//! Maps crossterm keyboard events to application actions. Unlike a
//! navigation-heavy UI, almost every printable key belongs to the input
//! buffer, so quit and clear live on modifier chords.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::App;

/// Action the event loop should take after a key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do beyond the state change already applied.
    None,
    /// Exit the TUI.
    Quit,
    /// Submit this question to the assistant.
    Submit(String),
    /// Clear the conversation history.
    Clear,
}

/// Handles a keyboard event and updates the app state accordingly.
///
/// # Event Handling
///
/// - `Esc` / `Ctrl+C`: quit
/// - `Ctrl+L`: clear the conversation
/// - `Enter`: submit the input buffer (ignored while blank or waiting)
/// - `Backspace`: delete the last input character
/// - `Up` / `Down`: scroll the history panel
/// - Printable characters: append to the input buffer
///
/// # Examples
///
/// ```
/// use factline::tui::{App, event::{Action, handle_key_event}};
/// use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
///
/// let mut app = App::default();
/// let key = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
/// assert_eq!(handle_key_event(&mut app, key), Action::Quit);
/// ```
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Action {
    if key.code == KeyCode::Esc {
        return Action::Quit;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('l') => Action::Clear,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Enter => {
            // One question at a time; Enter while waiting is dropped.
            if app.is_waiting() {
                return Action::None;
            }
            match app.take_input() {
                Some(question) => Action::Submit(question),
                None => Action::None,
            }
        }
        KeyCode::Backspace => {
            app.pop_input_char();
            Action::None
        }
        KeyCode::Up => {
            app.scroll_history_up(1);
            Action::None
        }
        KeyCode::Down => {
            app.scroll_history_down(1);
            Action::None
        }
        KeyCode::Char(c) => {
            app.push_input_char(c);
            Action::None
        }
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn esc_quits() {
        let mut app = App::default();
        assert_eq!(handle_key_event(&mut app, key(KeyCode::Esc)), Action::Quit);
    }

    #[test]
    fn ctrl_c_quits() {
        let mut app = App::default();
        assert_eq!(handle_key_event(&mut app, ctrl('c')), Action::Quit);
    }

    #[test]
    fn ctrl_l_clears() {
        let mut app = App::default();
        assert_eq!(handle_key_event(&mut app, ctrl('l')), Action::Clear);
    }

    #[test]
    fn typing_builds_input_buffer() {
        let mut app = App::default();
        for c in "bob".chars() {
            assert_eq!(
                handle_key_event(&mut app, key(KeyCode::Char(c))),
                Action::None
            );
        }
        assert_eq!(app.input(), "bob");

        handle_key_event(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.input(), "bo");
    }

    #[test]
    fn enter_submits_trimmed_question() {
        let mut app = App::default();
        for c in " what currency? ".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }

        let action = handle_key_event(&mut app, key(KeyCode::Enter));
        assert_eq!(action, Action::Submit("what currency?".to_string()));
        assert_eq!(app.input(), "");
    }

    #[test]
    fn enter_on_blank_input_does_nothing() {
        let mut app = App::default();
        handle_key_event(&mut app, key(KeyCode::Char(' ')));
        assert_eq!(handle_key_event(&mut app, key(KeyCode::Enter)), Action::None);
    }

    #[test]
    fn enter_is_dropped_while_waiting() {
        let mut app = App::default();
        app.begin_question("first");
        for c in "second".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }

        assert_eq!(handle_key_event(&mut app, key(KeyCode::Enter)), Action::None);
    }

    #[test]
    fn arrow_keys_scroll_history() {
        let mut app = App::default();
        handle_key_event(&mut app, key(KeyCode::Down));
        handle_key_event(&mut app, key(KeyCode::Down));
        assert_eq!(app.history_scroll(), 2);

        handle_key_event(&mut app, key(KeyCode::Up));
        assert_eq!(app.history_scroll(), 1);
    }
}
