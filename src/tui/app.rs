//! Shell state and key handling

use super::confirm::{self, ConfirmResult, ConfirmState};
use super::notice::Notice;
use super::picker::{self, PickerResult, PickerState};
use super::prompt::{self, PromptResult, PromptState};
use super::ui;
use crate::scanner;
use crate::session::{Session, SessionError};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use std::collections::VecDeque;
use std::path::PathBuf;
use tracing::info;

/// Which view has the keyboard when no overlay is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Value list with the main actions
    Main,
    /// Target file management dialog
    Files,
    /// Custom value management dialog
    Values,
    /// Pattern management dialog
    Patterns,
}

/// What a submitted prompt answers
#[derive(Debug, Clone, PartialEq)]
pub enum PromptPurpose {
    NewValue,
    NewValueDescription { value: String },
    EditValue { old: String },
    EditValueDescription { old: String, new: String },
    NewPatternName,
    NewPatternExpression { label: String },
    EditPatternName { old: String },
    EditPatternExpression { old: String, new: String },
}

/// What a confirmation approves
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmPurpose {
    RemoveValue(String),
    RemovePattern(String),
}

/// Where a picked file goes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickPurpose {
    Add,
    Replace(usize),
}

/// Modal overlay on top of the current screen
#[derive(Debug)]
pub enum Overlay {
    Prompt {
        state: PromptState,
        purpose: PromptPurpose,
    },
    Confirm {
        state: ConfirmState,
        purpose: ConfirmPurpose,
    },
    Picker {
        state: PickerState,
        purpose: PickPurpose,
    },
}

/// One row of the main value list
#[derive(Debug, Clone, PartialEq)]
pub struct ValueItem {
    pub value: String,
    pub label: String,
}

/// Main shell state
pub struct App {
    pub session: Session,
    /// Addresses found at startup
    pub discovered: Vec<String>,
    pub screen: Screen,
    /// Selection in the main value list
    pub value_selected: Option<usize>,
    /// Selection in the open management dialog
    pub dialog_selected: Option<usize>,
    pub overlay: Option<Overlay>,
    /// Pending notifications, oldest first
    pub notices: VecDeque<Notice>,
    pub should_quit: bool,
    /// Directory the file picker lists and relative paths resolve against
    picker_root: PathBuf,
}

impl App {
    pub fn new(session: Session, discovered: Vec<String>, picker_root: PathBuf) -> Self {
        Self {
            session,
            discovered,
            screen: Screen::Main,
            value_selected: None,
            dialog_selected: None,
            overlay: None,
            notices: VecDeque::new(),
            should_quit: false,
            picker_root,
        }
    }

    /// Discovered addresses followed by custom values
    pub fn values(&self) -> Vec<ValueItem> {
        let discovered = self.discovered.iter().map(|value| ValueItem {
            value: value.clone(),
            label: value.clone(),
        });
        let custom = self
            .session
            .state()
            .custom_values
            .iter()
            .map(|(value, description)| ValueItem {
                value: value.to_string(),
                label: describe(value, description),
            });
        discovered.chain(custom).collect()
    }

    pub fn selected_value(&self) -> Option<String> {
        let index = self.value_selected?;
        self.values().into_iter().nth(index).map(|item| item.value)
    }

    /// Run the application event loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, self))?;

            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Persist everything before the process ends
    pub fn shutdown(&self) {
        self.session.persist();
        info!("Application closed by user.");
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // Notifications come first and only need acknowledging
        if !self.notices.is_empty() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.notices.pop_front();
            }
            return;
        }

        if let Some(overlay) = self.overlay.take() {
            self.handle_overlay_key(overlay, key);
            return;
        }

        match self.screen {
            Screen::Main => self.handle_main_key(key),
            Screen::Files => self.handle_files_key(key),
            Screen::Values => self.handle_values_key(key),
            Screen::Patterns => self.handle_patterns_key(key),
        }
    }

    fn handle_overlay_key(&mut self, overlay: Overlay, key: KeyEvent) {
        match overlay {
            Overlay::Prompt { mut state, purpose } => match prompt::handle_key(&mut state, key) {
                PromptResult::Consumed => self.overlay = Some(Overlay::Prompt { state, purpose }),
                PromptResult::Cancel => self.on_prompt(purpose, None),
                PromptResult::Submit(input) => self.on_prompt(purpose, Some(input)),
            },
            Overlay::Confirm { state, purpose } => match confirm::handle_key(key) {
                ConfirmResult::Consumed => self.overlay = Some(Overlay::Confirm { state, purpose }),
                ConfirmResult::Yes => self.on_confirm(purpose),
                ConfirmResult::No => {}
            },
            Overlay::Picker { mut state, purpose } => match picker::handle_key(&mut state, key) {
                PickerResult::Consumed => self.overlay = Some(Overlay::Picker { state, purpose }),
                PickerResult::Cancel => {}
                PickerResult::Pick(path) => self.on_pick(purpose, path),
            },
        }
    }

    fn handle_main_key(&mut self, key: KeyEvent) {
        let len = self.values().len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.value_selected = next(self.value_selected, len),
            KeyCode::Char('k') | KeyCode::Up => self.value_selected = previous(self.value_selected, len),
            KeyCode::Enter | KeyCode::Char('u') => self.update_files(),
            KeyCode::Char('f') => self.open_dialog(Screen::Files),
            KeyCode::Char('v') => self.open_dialog(Screen::Values),
            KeyCode::Char('p') => self.open_dialog(Screen::Patterns),
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_files_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('a') => self.open_picker("Select a file to add", PickPurpose::Add),
            KeyCode::Char('m') => match self.dialog_selected {
                Some(index) => self.open_picker("Select the new file", PickPurpose::Replace(index)),
                None => self.selection_required("Select a file to modify."),
            },
            KeyCode::Char('d') => match self.dialog_selected {
                Some(index) => {
                    let result = self.session.remove_file(index);
                    self.report(result);
                }
                None => self.selection_required("Select a file to delete."),
            },
            _ => self.handle_dialog_common(key),
        }
    }

    fn handle_values_key(&mut self, key: KeyEvent) {
        let selected = self.dialog_selected.and_then(|index| {
            self.session
                .state()
                .custom_values
                .get_index(index)
                .map(|(value, _)| value.to_string())
        });

        match key.code {
            KeyCode::Char('a') => {
                self.open_prompt("New value", "Enter the value:", "", PromptPurpose::NewValue)
            }
            KeyCode::Char('m') => match selected {
                Some(old) => {
                    let initial = old.clone();
                    self.open_prompt("Modify value", "New value:", &initial, PromptPurpose::EditValue { old });
                }
                None => self.selection_required("Select a value to modify."),
            },
            KeyCode::Char('d') => match selected {
                Some(value) => {
                    self.open_confirm(format!("Delete value {}?", value), ConfirmPurpose::RemoveValue(value))
                }
                None => self.selection_required("Select a value to delete."),
            },
            _ => self.handle_dialog_common(key),
        }
    }

    fn handle_patterns_key(&mut self, key: KeyEvent) {
        let selected = self.dialog_selected.and_then(|index| {
            self.session.state().patterns.names().nth(index).map(str::to_string)
        });

        match key.code {
            KeyCode::Enter | KeyCode::Char('s') => {
                if let Some(label) = selected {
                    let result = self.session.select_pattern(&label);
                    self.report(result);
                }
            }
            KeyCode::Char('a') => self.open_prompt(
                "Pattern name",
                "Enter a name for the pattern:",
                "",
                PromptPurpose::NewPatternName,
            ),
            KeyCode::Char('m') => match selected {
                Some(old) => {
                    let initial = old.clone();
                    self.open_prompt("Modify name", "New name:", &initial, PromptPurpose::EditPatternName { old });
                }
                None => self.selection_required("Select a pattern to modify."),
            },
            KeyCode::Char('d') => match selected {
                Some(_) if self.session.state().patterns.len() == 1 => {
                    self.notices.push_back(Notice::error("Error", SessionError::LastPattern.to_string()));
                }
                Some(label) => self.open_confirm(
                    format!("Delete pattern '{}'?", label),
                    ConfirmPurpose::RemovePattern(label),
                ),
                None => self.selection_required("Select a pattern to delete."),
            },
            _ => self.handle_dialog_common(key),
        }
    }

    /// Navigation and closing, shared by every dialog
    fn handle_dialog_common(&mut self, key: KeyEvent) {
        let len = self.dialog_len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.dialog_selected = next(self.dialog_selected, len),
            KeyCode::Char('k') | KeyCode::Up => self.dialog_selected = previous(self.dialog_selected, len),
            KeyCode::Esc | KeyCode::Char('c') | KeyCode::Char('q') => self.close_dialog(),
            _ => {}
        }
    }

    fn on_prompt(&mut self, purpose: PromptPurpose, input: Option<String>) {
        match purpose {
            PromptPurpose::NewValue => {
                let value = input.unwrap_or_default().trim().to_string();
                if value.is_empty() {
                    self.error(SessionError::EmptyValue);
                } else if self.session.state().custom_values.contains(&value) {
                    self.error(SessionError::DuplicateValue(value));
                } else {
                    self.open_prompt(
                        "Description",
                        "Enter the description:",
                        "",
                        PromptPurpose::NewValueDescription { value },
                    );
                }
            }
            PromptPurpose::NewValueDescription { value } => {
                let description = input.unwrap_or_default();
                let result = self.session.add_custom_value(&value, &description);
                self.report(result);
            }
            PromptPurpose::EditValue { old } => {
                let Some(new) = non_empty(input) else {
                    return;
                };
                let values = &self.session.state().custom_values;
                if new != old && values.contains(&new) {
                    self.error(SessionError::DuplicateValue(new));
                    return;
                }
                let description = values.get(&old).unwrap_or_default().to_string();
                self.open_prompt(
                    "Modify description",
                    "New description:",
                    &description,
                    PromptPurpose::EditValueDescription { old, new },
                );
            }
            PromptPurpose::EditValueDescription { old, new } => {
                let Some(description) = input else {
                    return;
                };
                let result = self.session.rename_custom_value(&old, &new, &description);
                self.report(result);
            }
            PromptPurpose::NewPatternName => {
                let label = input.unwrap_or_default().trim().to_string();
                if label.is_empty() {
                    self.error(SessionError::EmptyPatternName);
                } else if self.session.state().patterns.contains(&label) {
                    self.error(SessionError::DuplicatePattern(label));
                } else {
                    self.open_prompt(
                        "Pattern",
                        "Enter the pattern (regular expression):",
                        "",
                        PromptPurpose::NewPatternExpression { label },
                    );
                }
            }
            PromptPurpose::NewPatternExpression { label } => {
                let Some(expression) = non_empty(input) else {
                    return;
                };
                let result = self.session.add_pattern(&label, &expression);
                self.report(result);
            }
            PromptPurpose::EditPatternName { old } => {
                let Some(new) = non_empty(input) else {
                    return;
                };
                let patterns = &self.session.state().patterns;
                if new != old && patterns.contains(&new) {
                    self.error(SessionError::DuplicatePattern(new));
                    return;
                }
                let expression = patterns.get(&old).unwrap_or_default().to_string();
                self.open_prompt(
                    "Modify pattern",
                    "New pattern:",
                    &expression,
                    PromptPurpose::EditPatternExpression { old, new },
                );
            }
            PromptPurpose::EditPatternExpression { old, new } => {
                let Some(expression) = non_empty(input) else {
                    return;
                };
                let result = self.session.rename_pattern(&old, &new, &expression);
                self.report(result);
            }
        }
    }

    fn on_confirm(&mut self, purpose: ConfirmPurpose) {
        let result = match purpose {
            ConfirmPurpose::RemoveValue(value) => self.session.remove_custom_value(&value),
            ConfirmPurpose::RemovePattern(label) => self.session.remove_pattern(&label),
        };
        self.report(result);
    }

    fn on_pick(&mut self, purpose: PickPurpose, path: PathBuf) {
        let path = if path.is_relative() {
            self.picker_root.join(path)
        } else {
            path
        };
        match purpose {
            PickPurpose::Add => {
                let result = self.session.add_file(path);
                self.report(result);
            }
            PickPurpose::Replace(index) => {
                let result = self.session.replace_file(index, path);
                self.report(result);
            }
        }
    }

    /// Rewrite every target file with the selected value
    fn update_files(&mut self) {
        if !self.session.can_apply() {
            return;
        }
        let Some(value) = self.selected_value() else {
            self.notices.push_back(Notice::warning(
                "Selection required",
                "Select a value before updating the files.",
            ));
            return;
        };

        info!("Update requested. Selected value: {}", value);
        match self.session.apply(&value) {
            Ok(report) => {
                for failure in &report.failed {
                    self.notices.push_back(Notice::error(
                        "Error",
                        format!(
                            "Could not modify the file:\n{}\n\n{:#}",
                            failure.path.display(),
                            failure.error
                        ),
                    ));
                }
                let mut message = format!(
                    "Values updated to {}.\n{} file(s) updated, {} failed.\n",
                    value,
                    report.succeeded(),
                    report.failed_count()
                );
                for update in &report.updated {
                    message.push_str(&format!("\n{} ({} match(es))", update.path.display(), update.matches));
                }
                self.notices.push_back(Notice::info("Update completed", message));
            }
            Err(e) => self.notices.push_back(Notice::error("Error", format!("{:#}", e))),
        }
    }

    fn open_dialog(&mut self, screen: Screen) {
        self.screen = screen;
        self.dialog_selected = None;
    }

    fn close_dialog(&mut self) {
        self.screen = Screen::Main;
        self.dialog_selected = None;
        let len = self.values().len();
        self.value_selected = self.value_selected.filter(|&index| index < len);
    }

    fn open_prompt(&mut self, title: &str, label: &str, initial: &str, purpose: PromptPurpose) {
        self.overlay = Some(Overlay::Prompt {
            state: PromptState::new(title, label, initial),
            purpose,
        });
    }

    fn open_confirm(&mut self, message: String, purpose: ConfirmPurpose) {
        self.overlay = Some(Overlay::Confirm {
            state: ConfirmState::new(message),
            purpose,
        });
    }

    fn open_picker(&mut self, title: &str, purpose: PickPurpose) {
        let candidates = scanner::list_candidates(&self.picker_root, scanner::DEFAULT_MAX_DEPTH);
        self.overlay = Some(Overlay::Picker {
            state: PickerState::new(title, candidates),
            purpose,
        });
    }

    /// Number of rows in the open dialog
    fn dialog_len(&self) -> usize {
        let state = self.session.state();
        match self.screen {
            Screen::Main => 0,
            Screen::Files => state.files.len(),
            Screen::Values => state.custom_values.len(),
            Screen::Patterns => state.patterns.len(),
        }
    }

    /// Surface a rejected mutation and keep the dialog selection in range
    fn report<T>(&mut self, result: Result<T, SessionError>) {
        if let Err(e) = result {
            self.error(e);
        }
        let len = self.dialog_len();
        self.dialog_selected = self.dialog_selected.filter(|_| len > 0).map(|index| index.min(len - 1));
    }

    fn error(&mut self, error: SessionError) {
        self.notices.push_back(Notice::error("Error", error.to_string()));
    }

    fn selection_required(&mut self, message: &str) {
        self.notices.push_back(Notice::warning("Selection required", message));
    }
}

fn describe(value: &str, description: &str) -> String {
    if description.is_empty() {
        value.to_string()
    } else {
        format!("{} - {}", value, description)
    }
}

fn non_empty(input: Option<String>) -> Option<String> {
    input.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Move selection down (wraps around)
fn next(selected: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match selected {
        Some(index) => (index + 1) % len,
        None => 0,
    })
}

/// Move selection up (wraps around)
fn previous(selected: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match selected {
        Some(0) | None => len - 1,
        Some(index) => index - 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigStore, DEFAULT_PATTERN_LABEL};
    use crate::tui::notice::NoticeLevel;
    use std::fs;
    use tempfile::TempDir;

    fn make_key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn make_app(dir: &TempDir) -> App {
        let session = Session::open(ConfigStore::new(dir.path().join("repoint.toml")));
        App::new(
            session,
            vec!["10.0.0.1".to_string(), "127.0.0.1".to_string()],
            dir.path().to_path_buf(),
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(make_key(code));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn reload(dir: &TempDir) -> crate::config::SessionState {
        ConfigStore::new(dir.path().join("repoint.toml")).load()
    }

    #[test]
    fn test_update_is_ignored_without_files() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert!(app.notices.is_empty());
    }

    #[test]
    fn test_update_without_selection_warns() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app.conf");
        fs::write(&file, "ip=10.9.9.9").unwrap();
        let mut app = make_app(&dir);
        app.session.add_file(file.clone()).unwrap();

        press(&mut app, KeyCode::Char('u'));

        assert_eq!(app.notices.len(), 1);
        assert_eq!(app.notices[0].level, NoticeLevel::Warning);
        assert_eq!(fs::read_to_string(&file).unwrap(), "ip=10.9.9.9");
    }

    #[test]
    fn test_update_reports_each_failure_then_completion() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app.conf");
        fs::write(&file, "server=10.0.0.1;backup=10.0.0.2").unwrap();
        let mut app = make_app(&dir);
        app.session.add_file(file.clone()).unwrap();
        app.session.add_file(dir.path().join("missing.conf")).unwrap();

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected_value().as_deref(), Some("127.0.0.1"));
        press(&mut app, KeyCode::Enter);

        assert_eq!(fs::read_to_string(&file).unwrap(), "server=127.0.0.1;backup=127.0.0.1");
        assert_eq!(app.notices.len(), 2);
        assert_eq!(app.notices[0].level, NoticeLevel::Error);
        assert!(app.notices[0].message.contains("missing.conf"));
        assert_eq!(app.notices[1].level, NoticeLevel::Info);
        assert!(app.notices[1].message.contains("1 file(s) updated, 1 failed"));
        assert!(app.notices[1].message.contains("app.conf (2 match(es))"));

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert!(app.notices.is_empty());
    }

    #[test]
    fn test_add_custom_value_flow() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir);

        press(&mut app, KeyCode::Char('v'));
        assert_eq!(app.screen, Screen::Values);
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "192.168.1.50");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "lab");
        press(&mut app, KeyCode::Enter);

        assert!(app.overlay.is_none());
        assert_eq!(app.session.state().custom_values.get("192.168.1.50"), Some("lab"));
        assert_eq!(reload(&dir).custom_values.get("192.168.1.50"), Some("lab"));

        press(&mut app, KeyCode::Esc);
        let labels: Vec<String> = app.values().into_iter().map(|item| item.label).collect();
        assert_eq!(labels.last().map(String::as_str), Some("192.168.1.50 - lab"));
    }

    #[test]
    fn test_duplicate_custom_value_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir);
        app.session.add_custom_value("10.0.0.5", "staging").unwrap();

        press(&mut app, KeyCode::Char('v'));
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "10.0.0.5");
        press(&mut app, KeyCode::Enter);

        assert!(app.overlay.is_none());
        assert_eq!(app.notices.len(), 1);
        assert_eq!(app.notices[0].level, NoticeLevel::Error);
        assert_eq!(app.session.state().custom_values.len(), 1);
        assert_eq!(app.session.state().custom_values.get("10.0.0.5"), Some("staging"));
    }

    #[test]
    fn test_modify_value_cancelled_description_keeps_value() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir);
        app.session.add_custom_value("10.0.0.5", "staging").unwrap();

        press(&mut app, KeyCode::Char('v'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('m'));
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('6'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);

        assert!(app.session.state().custom_values.contains("10.0.0.5"));
        assert!(!app.session.state().custom_values.contains("10.0.0.6"));
    }

    #[test]
    fn test_deleting_last_pattern_shows_error() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir);

        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('d'));

        assert!(app.overlay.is_none());
        assert_eq!(app.notices.len(), 1);
        assert_eq!(app.notices[0].message, "There must be at least one pattern.");
        assert_eq!(app.session.state().patterns.len(), 1);
    }

    #[test]
    fn test_add_select_and_delete_pattern() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir);

        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Host");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, r"host=\S+");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.state().patterns.get("Host"), Some(r"host=\S+"));

        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.session.state().selected_pattern, "Host");
        assert_eq!(app.session.state().expression, r"host=\S+");

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.session.state().selected_pattern, DEFAULT_PATTERN_LABEL);
        assert_eq!(app.dialog_selected, Some(0));
    }

    #[test]
    fn test_invalid_pattern_expression_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir);

        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Broken");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "(oops");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.notices.len(), 1);
        assert!(!app.session.state().patterns.contains("Broken"));
    }

    #[test]
    fn test_file_dialog_add_and_delete() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("db.properties"), "ip=10.0.0.1").unwrap();
        let mut app = make_app(&dir);

        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "db.prop");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.session.state().files, vec![dir.path().join("db.properties")]);
        assert!(app.session.can_apply());

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.notices.len(), 1);
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('d'));
        assert!(app.session.state().files.is_empty());
        assert!(!app.session.can_apply());
        assert_eq!(app.dialog_selected, None);
    }

    #[test]
    fn test_typed_relative_path_resolves_against_root() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir);

        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "conf/new.ini");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.session.state().files, vec![dir.path().join("conf/new.ini")]);
    }

    #[test]
    fn test_quit_and_shutdown_persist() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);

        app.shutdown();
        assert!(dir.path().join("repoint.toml").exists());
    }

    #[test]
    fn test_selection_wraps() {
        assert_eq!(next(None, 3), Some(0));
        assert_eq!(next(Some(2), 3), Some(0));
        assert_eq!(previous(None, 3), Some(2));
        assert_eq!(previous(Some(1), 3), Some(0));
        assert_eq!(next(Some(1), 0), None);
    }
}
