//! Single-line text input overlay

use super::centered_rect;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Alignment,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// State for the prompt overlay
#[derive(Debug, Clone, PartialEq)]
pub struct PromptState {
    pub title: String,
    pub label: String,
    pub input: String,
}

impl PromptState {
    /// Create a prompt pre-filled with `initial`
    pub fn new(title: impl Into<String>, label: impl Into<String>, initial: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            label: label.into(),
            input: initial.into(),
        }
    }
}

/// Result of handling a key in the prompt
#[derive(Debug, PartialEq)]
pub enum PromptResult {
    /// Dismissed without an answer
    Cancel,
    /// Key was consumed but no action needed
    Consumed,
    /// Answer given, possibly empty
    Submit(String),
}

/// Render the prompt overlay
pub fn render(state: &PromptState, frame: &mut Frame) {
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(&state.label, Style::default().fg(Color::Cyan))),
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Yellow)),
            Span::raw(&state.input),
            Span::styled("_", Style::default().fg(Color::White)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter] ", Style::default().fg(Color::Green)),
            Span::raw("Accept  "),
            Span::styled("[Esc] ", Style::default().fg(Color::Red)),
            Span::raw("Cancel"),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", state.title))
            .title_alignment(Alignment::Center),
    );

    frame.render_widget(paragraph, area);
}

/// Handle key input for the prompt
pub fn handle_key(state: &mut PromptState, key: KeyEvent) -> PromptResult {
    match key.code {
        KeyCode::Esc => PromptResult::Cancel,
        KeyCode::Enter => PromptResult::Submit(state.input.clone()),
        KeyCode::Char(c) => {
            state.input.push(c);
            PromptResult::Consumed
        }
        KeyCode::Backspace => {
            state.input.pop();
            PromptResult::Consumed
        }
        _ => PromptResult::Consumed,
    }
}
