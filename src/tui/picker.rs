//! File picker overlay
//!
//! Lists candidate files under a root directory and narrows them down as the
//! operator types. When nothing matches, the typed text itself is the answer.

use super::centered_rect;
use crate::scanner;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::path::PathBuf;

/// State for the file picker overlay
#[derive(Debug)]
pub struct PickerState {
    pub title: String,
    pub query: String,
    pub selected: usize,
    pub candidates: Vec<PathBuf>,
    pub filtered: Vec<usize>, // Indices into candidates
}

impl PickerState {
    pub fn new(title: impl Into<String>, candidates: Vec<PathBuf>) -> Self {
        let filtered = (0..candidates.len()).collect();
        Self {
            title: title.into(),
            query: String::new(),
            selected: 0,
            candidates,
            filtered,
        }
    }

    /// Update the filtered list based on current query
    pub fn update_filter(&mut self) {
        self.filtered = scanner::filter_candidates(&self.candidates, &self.query);
        if self.selected >= self.filtered.len() {
            self.selected = 0;
        }
    }

    /// Get the currently highlighted candidate
    pub fn selected_candidate(&self) -> Option<&PathBuf> {
        self.filtered.get(self.selected).map(|&i| &self.candidates[i])
    }
}

/// Result of handling a key in the picker
#[derive(Debug, PartialEq)]
pub enum PickerResult {
    Cancel,
    Consumed,
    Pick(PathBuf),
}

pub fn render(state: &PickerState, frame: &mut Frame) {
    let area = centered_rect(80, 70, frame.area());
    frame.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Input
            Constraint::Min(3),    // Candidates
            Constraint::Length(1), // Hints
        ])
        .split(area);

    let input = Paragraph::new(format!("> {}_", state.query))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", state.title))
                .title_alignment(Alignment::Center),
        )
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(input, chunks[0]);

    let items: Vec<ListItem> = state
        .filtered
        .iter()
        .map(|&i| ListItem::new(Line::from(state.candidates[i].display().to_string())))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut list_state = ListState::default();
    if !state.filtered.is_empty() {
        list_state.select(Some(state.selected));
    }
    frame.render_stateful_widget(list, chunks[1], &mut list_state);

    let hints = Paragraph::new(" type to filter  ↑/↓:move  Enter:pick (or use typed path)  Esc:cancel")
        .style(Style::default().fg(Color::DarkGray).bg(Color::Black));
    frame.render_widget(hints, chunks[2]);
}

pub fn handle_key(state: &mut PickerState, key: KeyEvent) -> PickerResult {
    match key.code {
        KeyCode::Esc => PickerResult::Cancel,
        KeyCode::Enter => {
            if let Some(path) = state.selected_candidate() {
                PickerResult::Pick(path.clone())
            } else if !state.query.trim().is_empty() {
                PickerResult::Pick(PathBuf::from(state.query.trim()))
            } else {
                PickerResult::Consumed
            }
        }
        KeyCode::Up => {
            state.selected = state.selected.saturating_sub(1);
            PickerResult::Consumed
        }
        KeyCode::Down => {
            if state.selected + 1 < state.filtered.len() {
                state.selected += 1;
            }
            PickerResult::Consumed
        }
        KeyCode::Char(c) => {
            state.query.push(c);
            state.update_filter();
            PickerResult::Consumed
        }
        KeyCode::Backspace => {
            state.query.pop();
            state.update_filter();
            PickerResult::Consumed
        }
        _ => PickerResult::Consumed,
    }
}
