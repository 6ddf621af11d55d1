//! Terminal User Interface module for factline.
//!
//! Provides a chat interface over the retrieve-then-answer pipeline using
//! ratatui for rendering and crossterm for terminal management.

use std::io;
use std::panic;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::{
    event::{self as crossterm_event, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::answerer::OllamaAnswererBuilder;
use crate::database::Database;
use crate::ollama::OllamaClientBuilder;
use crate::retriever::RetrievalConfig;
use crate::service::AssistantService;

mod app;
pub mod event;
mod ui;

pub use app::App;

/// Initializes the terminal for TUI rendering.
///
/// Enables raw mode and enters the alternate screen.
/// Returns a configured Terminal instance.
///
/// # Errors
///
/// Returns an error if terminal initialization fails.
fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// Disables raw mode and leaves the alternate screen.
/// This should always be called before exiting the TUI,
/// even in error cases, to prevent terminal corruption.
///
/// # Errors
///
/// Returns an error if terminal restoration fails.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// Minimal terminal restoration for panic handler.
///
/// Does not require a Terminal reference, making it safe to call
/// from a panic hook where we may not have access to the Terminal.
/// Ignores errors since we're likely already in a bad state.
fn restore_terminal_panic() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Initializes a panic hook that restores the terminal before panicking.
///
/// This ensures the terminal is restored even if a panic occurs anywhere
/// in the application, not just in the event loop. The original panic
/// hook is preserved and called after terminal restoration.
fn init_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal_panic();
        original_hook(panic_info);
    }));
}

/// Runs the main event loop for the TUI.
///
/// Polls for keyboard events, updates app state, and re-renders.
/// Exits when the user presses Esc or Ctrl+C, or an error occurs.
///
/// # Errors
///
/// Returns an error if event polling, rendering, or terminal operations fail.
/// Terminal state is always restored, even on error.
pub fn run_event_loop(app: &mut App, service: &AssistantService) -> Result<()> {
    let mut terminal = init_terminal()?;

    // Ensure terminal is restored even if we panic or error
    let result = run_event_loop_internal(app, service, &mut terminal);

    // Always restore terminal state
    if let Err(e) = restore_terminal(&mut terminal) {
        eprintln!("Error restoring terminal: {e}");
    }

    result
}

/// Internal event loop implementation.
///
/// Separated from `run_event_loop` to ensure terminal restoration happens
/// in the outer function.
fn run_event_loop_internal(
    app: &mut App,
    service: &AssistantService,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    loop {
        // Render the current state
        terminal.draw(|frame| {
            ui::draw(frame, app);
        })?;

        // Poll for events
        if crossterm_event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = crossterm_event::read()?
        {
            match event::handle_key_event(app, key) {
                event::Action::Quit => break,
                event::Action::Clear => app.clear_conversation(),
                event::Action::Submit(question) => {
                    app.begin_question(&question);
                    // Show the question before blocking on the model
                    terminal.draw(|frame| {
                        ui::draw(frame, app);
                    })?;

                    let answer = answer_question(app, service, &question)?;
                    app.finish_answer(&answer);
                }
                event::Action::None => {}
            }
        }
    }

    Ok(())
}

/// Answers one question synchronously and refreshes the header status.
///
/// The pipeline runs in-line with the event loop: one question at a time,
/// with the "thinking..." indicator covering the model's latency.
fn answer_question(app: &mut App, service: &AssistantService, question: &str) -> Result<String> {
    let answer = service.ask(question)?;
    app.set_db_status(service.db_status());
    Ok(answer.text)
}

/// Entry point for the TUI application.
///
/// Builds the Ollama client and answerer, opens the record database, and
/// starts the event loop.
///
/// # Errors
///
/// Returns an error if:
/// - Data path cannot be determined
/// - Ollama client configuration is invalid
/// - Terminal initialization or event loop fails
pub fn run() -> Result<()> {
    // Install panic hook to restore terminal on panic
    init_panic_hook();

    let data_path = crate::utils::get_data_path().context("Failed to get data path")?;
    let db = Database::open(&data_path);

    let client = Arc::new(
        OllamaClientBuilder::new()
            .build()
            .context("Failed to build Ollama client")?,
    );
    let model = client.model().to_string();
    let answerer = OllamaAnswererBuilder::new()
        .client(client)
        .model(&model)
        .build();

    let service = AssistantService::new(db, Arc::new(answerer), RetrievalConfig::from_env());

    let mut app = App::new(service.db_status()).with_model(&model);
    run_event_loop(&mut app, &service).context("TUI event loop failed")?;

    Ok(())
}
