//! TUI rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::app::{App, Overlay, Screen};
use super::{centered_rect, confirm, notice, picker, prompt};

/// Render the application UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(5),    // Values
            Constraint::Length(1), // Actions
            Constraint::Length(7), // Files
            Constraint::Length(3), // Pattern
        ])
        .split(frame.area());

    render_header(frame, chunks[0]);
    render_values(frame, chunks[1], app);
    render_actions(frame, chunks[2], app);
    render_files(frame, chunks[3], app);
    render_pattern(frame, chunks[4], app);

    // Dialogs block the main view until closed
    match app.screen {
        Screen::Main => {}
        Screen::Files => render_files_dialog(frame, app),
        Screen::Values => render_values_dialog(frame, app),
        Screen::Patterns => render_patterns_dialog(frame, app),
    }

    match &app.overlay {
        Some(Overlay::Prompt { state, .. }) => prompt::render(state, frame),
        Some(Overlay::Confirm { state, .. }) => confirm::render(state, frame),
        Some(Overlay::Picker { state, .. }) => picker::render(state, frame),
        None => {}
    }

    if let Some(current) = app.notices.front() {
        notice::render(current, frame);
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let header = Paragraph::new("Select the value to use:")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn render_values(frame: &mut Frame, area: Rect, app: &App) {
    let discovered = app.discovered.len();
    let items: Vec<ListItem> = app
        .values()
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i < discovered {
                Style::default()
            } else {
                Style::default().fg(Color::Cyan)
            };
            ListItem::new(Span::styled(item.label, style))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Values "))
        .highlight_style(Style::default().bg(Color::Blue).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(app.value_selected);
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_actions(frame: &mut Frame, area: Rect, app: &App) {
    // Update is only available while there is something to update
    let update_style = if app.session.can_apply() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let key_style = Style::default().fg(Color::Yellow);

    let line = Line::from(vec![
        Span::styled(" Enter/u:update files", update_style),
        Span::styled("  f", key_style),
        Span::raw(":manage files"),
        Span::styled("  v", key_style),
        Span::raw(":manage values"),
        Span::styled("  p", key_style),
        Span::raw(":manage patterns"),
        Span::styled("  q", key_style),
        Span::raw(":exit"),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_files(frame: &mut Frame, area: Rect, app: &App) {
    let files = &app.session.state().files;
    let items: Vec<ListItem> = if files.is_empty() {
        vec![ListItem::new(Span::styled(
            "No files yet. Press f to add some.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        files
            .iter()
            .map(|path| ListItem::new(path.display().to_string()))
            .collect()
    };

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Files to modify "));
    frame.render_widget(list, area);
}

fn render_pattern(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.session.state();
    let pattern = Paragraph::new(state.expression.as_str())
        .style(Style::default().fg(Color::White).bg(Color::DarkGray))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Pattern in use ({}) ", state.selected_pattern)),
        );
    frame.render_widget(pattern, area);
}

fn render_files_dialog(frame: &mut Frame, app: &App) {
    let rows = app
        .session
        .state()
        .files
        .iter()
        .map(|path| path.display().to_string())
        .collect();
    render_dialog(frame, app, "Manage files", rows, "a:add  m:modify  d:delete  Esc:close");
}

fn render_values_dialog(frame: &mut Frame, app: &App) {
    let rows = app
        .session
        .state()
        .custom_values
        .iter()
        .map(|(value, description)| {
            if description.is_empty() {
                value.to_string()
            } else {
                format!("{} - {}", value, description)
            }
        })
        .collect();
    render_dialog(frame, app, "Manage values", rows, "a:add  m:modify  d:delete  Esc:close");
}

fn render_patterns_dialog(frame: &mut Frame, app: &App) {
    let state = app.session.state();
    let rows = state
        .patterns
        .iter()
        .map(|(label, expression)| {
            let marker = if label == state.selected_pattern {
                " (selected)"
            } else {
                ""
            };
            format!("{}: {}{}", label, expression, marker)
        })
        .collect();
    render_dialog(
        frame,
        app,
        "Manage patterns",
        rows,
        "Enter/s:select  a:add  m:modify  d:delete  Esc:close",
    );
}

fn render_dialog(frame: &mut Frame, app: &App, title: &str, rows: Vec<String>, hints: &str) {
    let area = centered_rect(80, 60, frame.area());
    frame.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let items: Vec<ListItem> = rows.into_iter().map(ListItem::new).collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title))
                .title_alignment(Alignment::Center),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(app.dialog_selected);
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let footer = Paragraph::new(format!(" {}", hints)).style(Style::default().fg(Color::DarkGray).bg(Color::Black));
    frame.render_widget(footer, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;
    use crate::session::Session;
    use crate::tui::notice::Notice;
    use crate::tui::prompt::PromptState;
    use crate::tui::app::PromptPurpose;
    use ratatui::{backend::TestBackend, Terminal};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn make_test_app(dir: &TempDir) -> App {
        let session = Session::open(ConfigStore::new(dir.path().join("repoint.toml")));
        App::new(session, vec!["127.0.0.1".to_string()], dir.path().to_path_buf())
    }

    fn draw(app: &App, width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_main_view() {
        let dir = TempDir::new().unwrap();
        let app = make_test_app(&dir);
        let terminal = draw(&app, 100, 30);
        let text = screen_text(&terminal);
        assert!(text.contains("127.0.0.1"));
        assert!(text.contains("No files yet"));
        assert!(text.contains("Pattern in use (IPv4)"));
    }

    #[test]
    fn test_render_every_dialog() {
        let dir = TempDir::new().unwrap();
        let mut app = make_test_app(&dir);
        app.session.add_file(PathBuf::from("/srv/app.conf")).unwrap();
        app.session.add_custom_value("10.0.0.5", "staging").unwrap();

        for screen in [Screen::Files, Screen::Values, Screen::Patterns] {
            app.screen = screen;
            app.dialog_selected = Some(0);
            let terminal = draw(&app, 100, 30);
            assert!(screen_text(&terminal).contains("Manage"));
        }
    }

    #[test]
    fn test_render_with_overlay_and_notice() {
        let dir = TempDir::new().unwrap();
        let mut app = make_test_app(&dir);
        app.overlay = Some(Overlay::Prompt {
            state: PromptState::new("New value", "Enter the value:", ""),
            purpose: PromptPurpose::NewValue,
        });
        app.notices.push_back(Notice::error("Error", "The value is empty."));

        let terminal = draw(&app, 100, 30);
        assert!(screen_text(&terminal).contains("The value is empty."));
    }

    #[test]
    fn test_layout_adapts_to_small_terminal() {
        let dir = TempDir::new().unwrap();
        let app = make_test_app(&dir);
        for (width, height) in [(20, 5), (40, 10), (200, 60)] {
            draw(&app, width, height);
        }
    }
}
