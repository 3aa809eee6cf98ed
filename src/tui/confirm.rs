//! Yes/no confirmation overlay

use super::centered_rect;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Alignment,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmState {
    pub message: String,
}

impl ConfirmState {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum ConfirmResult {
    Yes,
    No,
    Consumed,
}

pub fn render(state: &ConfirmState, frame: &mut Frame) {
    let area = centered_rect(50, 25, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(state.message.as_str()),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y] ", Style::default().fg(Color::Green)),
            Span::raw("Yes  "),
            Span::styled("[n] ", Style::default().fg(Color::Red)),
            Span::raw("No"),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirm ")
                .title_alignment(Alignment::Center),
        );

    frame.render_widget(paragraph, area);
}

pub fn handle_key(key: KeyEvent) -> ConfirmResult {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => ConfirmResult::Yes,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => ConfirmResult::No,
        _ => ConfirmResult::Consumed,
    }
}
