use crate::config::{ConfigStore, SessionState};
use crate::replacer::{self, ApplyReport};
use anyhow::Result;
use regex::Regex;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Operator input rejected by a [`Session`] mutation
///
/// The state is unchanged whenever one of these is returned.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("The file path is empty.")]
    EmptyPath,

    #[error("The file is already in the list: {}", .0.display())]
    DuplicateFile(PathBuf),

    #[error("The file path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("There is no file at position {0}.")]
    NoSuchFile(usize),

    #[error("The value is empty.")]
    EmptyValue,

    #[error("The value already exists: {0}")]
    DuplicateValue(String),

    #[error("Unknown value: {0}")]
    UnknownValue(String),

    #[error("The pattern name is empty.")]
    EmptyPatternName,

    #[error("The pattern name already exists: {0}")]
    DuplicatePattern(String),

    #[error("Unknown pattern: {0}")]
    UnknownPattern(String),

    #[error("The pattern expression is empty.")]
    EmptyExpression,

    #[error("Invalid regular expression: {0}")]
    InvalidExpression(#[from] regex::Error),

    #[error("There must be at least one pattern.")]
    LastPattern,
}

/// The running session: in-memory state plus the store it persists to
///
/// Every successful mutation is saved before returning.
#[derive(Debug)]
pub struct Session {
    store: ConfigStore,
    state: SessionState,
}

impl Session {
    /// Load the persisted state, or defaults
    pub fn open(store: ConfigStore) -> Self {
        let state = store.load();
        Self { store, state }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Save the current state, whether or not anything changed
    pub fn persist(&self) {
        self.store.save(&self.state);
    }

    /// Whether an update has any file to work on
    pub fn can_apply(&self) -> bool {
        !self.state.files.is_empty()
    }

    /// Rewrite every target file with `value` using the active expression
    pub fn apply(&self, value: &str) -> Result<ApplyReport> {
        replacer::apply(&self.state.files, value, &self.state.expression)
    }

    pub fn add_file(&mut self, path: PathBuf) -> Result<(), SessionError> {
        let path = storable_path(path)?;
        if self.state.files.contains(&path) {
            return Err(SessionError::DuplicateFile(path));
        }
        info!("File added: {}", path.display());
        self.state.files.push(path);
        self.persist();
        Ok(())
    }

    /// Point the entry at `index` to another file, returning the old path
    pub fn replace_file(&mut self, index: usize, path: PathBuf) -> Result<PathBuf, SessionError> {
        if index >= self.state.files.len() {
            return Err(SessionError::NoSuchFile(index));
        }
        let path = storable_path(path)?;
        let taken = self
            .state
            .files
            .iter()
            .enumerate()
            .any(|(i, existing)| i != index && *existing == path);
        if taken {
            return Err(SessionError::DuplicateFile(path));
        }

        info!("File modified: {} -> {}", self.state.files[index].display(), path.display());
        let old = std::mem::replace(&mut self.state.files[index], path);
        self.persist();
        Ok(old)
    }

    pub fn remove_file(&mut self, index: usize) -> Result<PathBuf, SessionError> {
        if index >= self.state.files.len() {
            return Err(SessionError::NoSuchFile(index));
        }
        let removed = self.state.files.remove(index);
        info!("File removed: {}", removed.display());
        self.persist();
        Ok(removed)
    }

    pub fn add_custom_value(&mut self, value: &str, description: &str) -> Result<(), SessionError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(SessionError::EmptyValue);
        }
        if !self.state.custom_values.insert(value, description.trim()) {
            return Err(SessionError::DuplicateValue(value.to_string()));
        }
        info!("Custom value added: {}", value);
        self.persist();
        Ok(())
    }

    pub fn rename_custom_value(&mut self, old: &str, new: &str, description: &str) -> Result<(), SessionError> {
        let new = new.trim();
        if !self.state.custom_values.contains(old) {
            return Err(SessionError::UnknownValue(old.to_string()));
        }
        if new.is_empty() {
            return Err(SessionError::EmptyValue);
        }
        if !self.state.custom_values.rename(old, new, description.trim()) {
            return Err(SessionError::DuplicateValue(new.to_string()));
        }
        info!("Custom value modified: {} -> {}", old, new);
        self.persist();
        Ok(())
    }

    pub fn remove_custom_value(&mut self, value: &str) -> Result<(), SessionError> {
        if self.state.custom_values.remove(value).is_none() {
            return Err(SessionError::UnknownValue(value.to_string()));
        }
        info!("Custom value removed: {}", value);
        self.persist();
        Ok(())
    }

    /// Make `label` the selected pattern and its expression the active one
    pub fn select_pattern(&mut self, label: &str) -> Result<(), SessionError> {
        let expression = self
            .state
            .patterns
            .get(label)
            .ok_or_else(|| SessionError::UnknownPattern(label.to_string()))?
            .to_string();
        self.state.selected_pattern = label.to_string();
        self.state.expression = expression;
        info!("Pattern selected: {}", label);
        self.persist();
        Ok(())
    }

    pub fn add_pattern(&mut self, label: &str, expression: &str) -> Result<(), SessionError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(SessionError::EmptyPatternName);
        }
        if self.state.patterns.contains(label) {
            return Err(SessionError::DuplicatePattern(label.to_string()));
        }
        let expression = validate_expression(expression)?;
        self.state.patterns.insert(label, expression);
        info!("Pattern added: {} = {}", label, expression);
        self.persist();
        Ok(())
    }

    /// Rename a pattern and replace its expression in one step
    ///
    /// A selected pattern stays selected under its new name and the active
    /// expression follows it.
    pub fn rename_pattern(&mut self, old: &str, new: &str, expression: &str) -> Result<(), SessionError> {
        let new = new.trim();
        if !self.state.patterns.contains(old) {
            return Err(SessionError::UnknownPattern(old.to_string()));
        }
        if new.is_empty() {
            return Err(SessionError::EmptyPatternName);
        }
        if new != old && self.state.patterns.contains(new) {
            return Err(SessionError::DuplicatePattern(new.to_string()));
        }
        let expression = validate_expression(expression)?;

        self.state.patterns.rename(old, new, expression);
        if self.state.selected_pattern == old {
            self.state.selected_pattern = new.to_string();
            self.state.expression = expression.to_string();
        }
        info!("Pattern modified: {} -> {} = {}", old, new, expression);
        self.persist();
        Ok(())
    }

    /// Delete a pattern; the last one can never be removed
    pub fn remove_pattern(&mut self, label: &str) -> Result<(), SessionError> {
        if !self.state.patterns.contains(label) {
            return Err(SessionError::UnknownPattern(label.to_string()));
        }
        if self.state.patterns.len() == 1 {
            return Err(SessionError::LastPattern);
        }

        self.state.patterns.remove(label);
        if self.state.selected_pattern == label {
            if let Some((first, expression)) = self.state.patterns.get_index(0) {
                self.state.selected_pattern = first.to_string();
                self.state.expression = expression.to_string();
            }
        }
        info!("Pattern removed: {}", label);
        self.persist();
        Ok(())
    }
}

/// Only paths that survive a save and reload unchanged can be targets
fn storable_path(path: PathBuf) -> Result<PathBuf, SessionError> {
    if path.as_os_str().is_empty() {
        return Err(SessionError::EmptyPath);
    }
    if path.to_str().is_none() {
        return Err(SessionError::NonUtf8Path(path));
    }
    Ok(path)
}

fn validate_expression(expression: &str) -> Result<&str, SessionError> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(SessionError::EmptyExpression);
    }
    Regex::new(expression)?;
    Ok(expression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_PATTERN, DEFAULT_PATTERN_LABEL};
    use std::fs;
    use tempfile::TempDir;

    fn open_session() -> (TempDir, Session) {
        let dir = TempDir::new().unwrap();
        let session = Session::open(ConfigStore::new(dir.path().join("repoint.toml")));
        (dir, session)
    }

    fn reload(dir: &TempDir) -> SessionState {
        ConfigStore::new(dir.path().join("repoint.toml")).load()
    }

    #[test]
    fn test_fresh_session_has_default_pattern() {
        let (_dir, session) = open_session();
        assert_eq!(session.state().selected_pattern, DEFAULT_PATTERN_LABEL);
        assert_eq!(session.state().expression, DEFAULT_PATTERN);
        assert!(!session.can_apply());
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let (dir, mut session) = open_session();
        session.add_file(PathBuf::from("/srv/a.conf")).unwrap();
        session.add_custom_value(" 10.0.0.5 ", " staging ").unwrap();
        session.add_pattern("Host", r"host=\S+").unwrap();
        session.select_pattern("Host").unwrap();

        let stored = reload(&dir);
        assert_eq!(&stored, session.state());
        assert_eq!(stored.custom_values.get("10.0.0.5"), Some("staging"));
        assert_eq!(stored.expression, r"host=\S+");
        assert!(session.can_apply());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (dir, mut session) = open_session();
        let odd = dir.path().join(OsStr::from_bytes(b"db\xff.conf"));

        assert!(matches!(session.add_file(odd.clone()), Err(SessionError::NonUtf8Path(_))));
        assert!(!session.can_apply());

        session.add_file(dir.path().join("db.conf")).unwrap();
        assert!(matches!(session.replace_file(0, odd), Err(SessionError::NonUtf8Path(_))));
        assert_eq!(session.state().files, vec![dir.path().join("db.conf")]);
        assert_eq!(&reload(&dir), session.state());
    }

    #[test]
    fn test_duplicate_file_is_rejected() {
        let (_dir, mut session) = open_session();
        session.add_file(PathBuf::from("/srv/a.conf")).unwrap();
        let err = session.add_file(PathBuf::from("/srv/a.conf")).unwrap_err();
        assert!(matches!(err, SessionError::DuplicateFile(_)));
        assert_eq!(session.state().files.len(), 1);
    }

    #[test]
    fn test_replace_and_remove_files() {
        let (dir, mut session) = open_session();
        session.add_file(PathBuf::from("/srv/a.conf")).unwrap();
        session.add_file(PathBuf::from("/srv/b.conf")).unwrap();

        assert!(matches!(
            session.replace_file(0, PathBuf::from("/srv/b.conf")),
            Err(SessionError::DuplicateFile(_))
        ));
        let old = session.replace_file(0, PathBuf::from("/srv/c.conf")).unwrap();
        assert_eq!(old, PathBuf::from("/srv/a.conf"));
        assert!(matches!(session.remove_file(5), Err(SessionError::NoSuchFile(5))));

        session.remove_file(1).unwrap();
        assert_eq!(reload(&dir).files, vec![PathBuf::from("/srv/c.conf")]);
        assert!(session.can_apply());

        session.remove_file(0).unwrap();
        assert!(!session.can_apply());
    }

    #[test]
    fn test_duplicate_custom_value_is_rejected() {
        let (_dir, mut session) = open_session();
        session.add_custom_value("10.0.0.5", "staging").unwrap();
        let before = session.state().custom_values.clone();

        let err = session.add_custom_value("10.0.0.5", "other").unwrap_err();
        assert!(matches!(err, SessionError::DuplicateValue(_)));
        assert_eq!(session.state().custom_values, before);
        assert!(matches!(session.add_custom_value("  ", ""), Err(SessionError::EmptyValue)));
    }

    #[test]
    fn test_rename_custom_value() {
        let (_dir, mut session) = open_session();
        session.add_custom_value("10.0.0.5", "staging").unwrap();
        session.add_custom_value("10.0.0.6", "qa").unwrap();

        assert!(matches!(
            session.rename_custom_value("10.0.0.5", "10.0.0.6", ""),
            Err(SessionError::DuplicateValue(_))
        ));
        session.rename_custom_value("10.0.0.5", "10.0.0.7", "staging 2").unwrap();
        let names: Vec<&str> = session.state().custom_values.names().collect();
        assert_eq!(names, vec!["10.0.0.7", "10.0.0.6"]);

        session.remove_custom_value("10.0.0.6").unwrap();
        assert!(matches!(
            session.remove_custom_value("10.0.0.6"),
            Err(SessionError::UnknownValue(_))
        ));
    }

    #[test]
    fn test_last_pattern_cannot_be_removed() {
        let (_dir, mut session) = open_session();
        let before = session.state().patterns.clone();
        let err = session.remove_pattern(DEFAULT_PATTERN_LABEL).unwrap_err();
        assert!(matches!(err, SessionError::LastPattern));
        assert_eq!(session.state().patterns, before);
    }

    #[test]
    fn test_removing_selected_pattern_moves_selection() {
        let (dir, mut session) = open_session();
        session.add_pattern("Host", r"host=\S+").unwrap();
        session.select_pattern("Host").unwrap();

        session.remove_pattern("Host").unwrap();
        assert_eq!(session.state().selected_pattern, DEFAULT_PATTERN_LABEL);
        assert_eq!(session.state().expression, DEFAULT_PATTERN);
        assert_eq!(reload(&dir).selected_pattern, DEFAULT_PATTERN_LABEL);
    }

    #[test]
    fn test_removing_unselected_pattern_keeps_selection() {
        let (_dir, mut session) = open_session();
        session.add_pattern("Host", r"host=\S+").unwrap();
        session.remove_pattern("Host").unwrap();
        assert_eq!(session.state().selected_pattern, DEFAULT_PATTERN_LABEL);
        assert_eq!(session.state().patterns.len(), 1);
    }

    #[test]
    fn test_renaming_selected_pattern_transfers_selection() {
        let (_dir, mut session) = open_session();
        session.rename_pattern(DEFAULT_PATTERN_LABEL, "Address", r"\d+\.\d+\.\d+\.\d+").unwrap();
        assert_eq!(session.state().selected_pattern, "Address");
        assert_eq!(session.state().expression, r"\d+\.\d+\.\d+\.\d+");
        assert!(!session.state().patterns.contains(DEFAULT_PATTERN_LABEL));
    }

    #[test]
    fn test_renaming_unselected_pattern_leaves_expression() {
        let (_dir, mut session) = open_session();
        session.add_pattern("Host", r"host=\S+").unwrap();
        session.rename_pattern("Host", "Hostname", r"hostname=\S+").unwrap();
        assert_eq!(session.state().selected_pattern, DEFAULT_PATTERN_LABEL);
        assert_eq!(session.state().expression, DEFAULT_PATTERN);
        assert_eq!(session.state().patterns.get("Hostname"), Some(r"hostname=\S+"));
    }

    #[test]
    fn test_invalid_or_duplicate_patterns_are_rejected() {
        let (_dir, mut session) = open_session();
        assert!(matches!(
            session.add_pattern("Broken", "(unclosed"),
            Err(SessionError::InvalidExpression(_))
        ));
        assert!(matches!(
            session.add_pattern(DEFAULT_PATTERN_LABEL, "x"),
            Err(SessionError::DuplicatePattern(_))
        ));
        assert!(matches!(session.add_pattern("Empty", "  "), Err(SessionError::EmptyExpression)));
        assert!(matches!(
            session.rename_pattern(DEFAULT_PATTERN_LABEL, "IPv4", "[z-a]"),
            Err(SessionError::InvalidExpression(_))
        ));
        assert_eq!(session.state().patterns.len(), 1);
    }

    #[test]
    fn test_expression_drift_survives_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("repoint.toml");
        fs::write(
            &path,
            "[general]\npattern = 'db=\\w+'\npattern_selected = \"IPv4\"\n",
        )
        .unwrap();

        let mut session = Session::open(ConfigStore::new(&path));
        session.add_custom_value("10.0.0.5", "").unwrap();

        let stored = reload(&dir);
        assert_eq!(stored.expression, r"db=\w+");
        assert_eq!(stored.patterns.get("IPv4"), Some(DEFAULT_PATTERN));
    }

    #[test]
    fn test_apply_uses_active_expression() {
        let (dir, mut session) = open_session();
        let file = dir.path().join("app.conf");
        fs::write(&file, "server=10.0.0.1;backup=10.0.0.2").unwrap();
        session.add_file(file.clone()).unwrap();

        let report = session.apply("192.168.1.50").unwrap();
        assert_eq!(report.succeeded(), 1);
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "server=192.168.1.50;backup=192.168.1.50"
        );
    }
}
