//! UI rendering functions for the chat TUI.
//!
//! Implements the chat layout with a status header, scrollable message
//! history, input box, and shortcut bar using ratatui widgets.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::database::DbStatus;
use crate::models::Role;

use super::app::App;

/// Main rendering function for the TUI.
///
/// Draws the chat layout: status header, message history, input box, and
/// shortcut bar.
pub fn draw(frame: &mut Frame, app: &App) {
    let size = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status header
            Constraint::Min(0),    // Message history
            Constraint::Length(3), // Input box
            Constraint::Length(1), // Shortcut bar
        ])
        .split(size);

    render_status_header(frame, app, chunks[0]);
    render_history(frame, app, chunks[1]);
    render_input(frame, app, chunks[2]);
    render_shortcut_bar(frame, chunks[3]);
}

/// Renders the status header showing database availability.
fn render_status_header(frame: &mut Frame, app: &App, area: Rect) {
    let (status_text, status_style) = match app.db_status() {
        DbStatus::Loaded { records } => (
            format!("database ready ({records} records)"),
            Style::default().fg(Color::Green),
        ),
        DbStatus::Missing => (
            "no database found. Run `factline flatten` to build one.".to_string(),
            Style::default().fg(Color::Yellow),
        ),
    };

    let mut spans = vec![
        Span::styled("factline", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" | "),
        Span::styled(status_text, status_style),
    ];
    if !app.model().is_empty() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            app.model().to_string(),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Renders the scrollable message history.
///
/// User messages are plain text with a `You:` label; assistant messages are
/// rendered as markdown, since models occasionally emit emphasis or lists.
fn render_history(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Chat");

    let mut text = Text::default();
    for message in app.conversation().messages() {
        match message.role {
            Role::User => {
                text.lines.push(Line::from(vec![
                    Span::styled(
                        "You: ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(message.content.clone()),
                ]));
            }
            Role::Assistant => {
                text.lines.push(Line::from(Span::styled(
                    "Assistant:",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )));
                let rendered = tui_markdown::from_str(&message.content);
                for line in rendered.lines {
                    // Re-own the borrowed spans so the Text outlives the loop
                    let owned: Vec<Span> = line
                        .spans
                        .iter()
                        .map(|s| Span::styled(s.content.to_string(), s.style))
                        .collect();
                    text.lines.push(Line::from(owned));
                }
            }
        }
        text.lines.push(Line::from(""));
    }

    if app.is_waiting() {
        text.lines.push(Line::from(Span::styled(
            "thinking...",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let scroll = clamp_scroll(app.history_scroll(), text.lines.len(), area);

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(paragraph, area);
}

// App uses u16::MAX to mean "bottom"; clamp to the last visible page.
fn clamp_scroll(requested: u16, content_lines: usize, area: Rect) -> u16 {
    let visible = area.height.saturating_sub(2) as usize;
    let max_scroll = content_lines.saturating_sub(visible).min(u16::MAX as usize) as u16;
    requested.min(max_scroll)
}

/// Renders the input box with a cursor indicator.
fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Ask")
        .border_style(Style::default().fg(Color::Cyan));

    let mut content = app.input().to_string();
    content.push('\u{2588}'); // Cursor indicator

    frame.render_widget(Paragraph::new(content).block(block), area);
}

/// Renders the shortcut bar at the bottom of the screen.
fn render_shortcut_bar(frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(Color::Cyan);
    let sep_style = Style::default().fg(Color::DarkGray);

    let spans = vec![
        Span::styled("Enter", key_style),
        Span::raw(": ask"),
        Span::styled(" | ", sep_style),
        Span::styled("Ctrl+L", key_style),
        Span::raw(": clear"),
        Span::styled(" | ", sep_style),
        Span::styled("Up/Down", key_style),
        Span::raw(": scroll"),
        Span::styled(" | ", sep_style),
        Span::styled("Esc", key_style),
        Span::raw(": quit"),
    ];

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
