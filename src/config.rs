use crate::entries::Entries;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use toml::{Table, Value};
use tracing::{error, info};

/// Label of the built-in pattern used when none is persisted
pub const DEFAULT_PATTERN_LABEL: &str = "IPv4";

/// Four dot-separated groups of one to three digits
pub const DEFAULT_PATTERN: &str = r"\b(?:\d{1,3}\.){3}\d{1,3}\b";

const GENERAL: &str = "general";
const FILES: &str = "archivos";
const CUSTOM_VALUES: &str = "personalizadas";
const PATTERNS: &str = "patrones";

const KEY_PATTERN: &str = "pattern";
const KEY_PATTERN_SELECTED: &str = "pattern_selected";
const FILE_KEY_PREFIX: &str = "archivo";

/// Everything one session persists between runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Files rewritten on update, in display order
    pub files: Vec<PathBuf>,

    /// Expression used for the next update
    ///
    /// Tracked independently of `patterns[selected_pattern]`; the two are kept
    /// in step by pattern selection but are allowed to drift.
    pub expression: String,

    /// Operator-defined values with their descriptions
    pub custom_values: Entries,

    /// Named patterns, never empty
    pub patterns: Entries,

    /// Label of the selected pattern, always a key of `patterns`
    pub selected_pattern: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            expression: DEFAULT_PATTERN.to_string(),
            custom_values: Entries::new(),
            patterns: default_patterns(),
            selected_pattern: DEFAULT_PATTERN_LABEL.to_string(),
        }
    }
}

fn default_patterns() -> Entries {
    [(DEFAULT_PATTERN_LABEL, DEFAULT_PATTERN)].into_iter().collect()
}

/// Loads and saves [`SessionState`] as a sectioned TOML file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted state
    ///
    /// Never fails: a missing or unreadable file yields the defaults, and each
    /// missing or malformed section falls back to its own default.
    pub fn load(&self) -> SessionState {
        if !self.path.exists() {
            info!("No configuration at {}. Using defaults.", self.path.display());
            return resolve(Vec::new(), None, Entries::new(), Entries::new(), None);
        }

        match self.read_table() {
            Ok(table) => from_table(&table),
            Err(e) => {
                error!("Error loading configuration: {:#}", e);
                resolve(Vec::new(), None, Entries::new(), Entries::new(), None)
            }
        }
    }

    /// Overwrite the configuration file with `state`
    ///
    /// Failures are logged and swallowed.
    pub fn save(&self, state: &SessionState) {
        match self.write(state) {
            Ok(()) => info!("Configuration saved."),
            Err(e) => error!("Error saving configuration: {:#}", e),
        }
    }

    fn read_table(&self) -> Result<Table> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        content
            .parse::<Table>()
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    fn write(&self, state: &SessionState) -> Result<()> {
        let content = toml::to_string(&to_table(state)).context("Failed to serialize configuration")?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        tmp.write_all(content.as_bytes())
            .context("Failed to write temporary configuration")?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

fn from_table(table: &Table) -> SessionState {
    let files = section(table, FILES).map(ordered_files).unwrap_or_default();
    let custom_values = section(table, CUSTOM_VALUES)
        .map(|s| string_entries(CUSTOM_VALUES, s))
        .unwrap_or_default();
    let patterns = section(table, PATTERNS)
        .map(|s| string_entries(PATTERNS, s))
        .unwrap_or_default();

    let general = section(table, GENERAL);
    let expression = general.and_then(|g| string_key(GENERAL, g, KEY_PATTERN));
    let selected = general.and_then(|g| string_key(GENERAL, g, KEY_PATTERN_SELECTED));

    resolve(files, expression, custom_values, patterns, selected)
}

/// Fill in defaults for whatever the file did not provide
fn resolve(
    files: Vec<PathBuf>,
    expression: Option<String>,
    custom_values: Entries,
    mut patterns: Entries,
    selected: Option<String>,
) -> SessionState {
    if patterns.is_empty() {
        patterns = default_patterns();
    }

    let first = patterns.first_name().unwrap_or(DEFAULT_PATTERN_LABEL).to_string();
    let selected_pattern = match selected {
        Some(label) if patterns.contains(&label) => label,
        Some(label) => {
            error!("Selected pattern '{}' does not exist. Selecting '{}'.", label, first);
            first
        }
        None => first,
    };

    let expression = match expression {
        Some(expression) => expression,
        None => {
            info!("No pattern found in the configuration. Using the selected pattern.");
            patterns
                .get(&selected_pattern)
                .unwrap_or(DEFAULT_PATTERN)
                .to_string()
        }
    };

    SessionState {
        files,
        expression,
        custom_values,
        patterns,
        selected_pattern,
    }
}

fn section<'a>(table: &'a Table, name: &str) -> Option<&'a Table> {
    match table.get(name) {
        Some(Value::Table(section)) => Some(section),
        Some(_) => {
            error!("Section [{}] is not a table. Using defaults.", name);
            None
        }
        None => None,
    }
}

fn string_key(section: &str, table: &Table, key: &str) -> Option<String> {
    match table.get(key) {
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            error!("[{}] {} is not a string. Ignoring it.", section, key);
            None
        }
        None => None,
    }
}

fn string_entries(section: &str, table: &Table) -> Entries {
    table
        .keys()
        .filter_map(|key| string_key(section, table, key).map(|value| (key.clone(), value)))
        .collect()
}

/// File entries ordered by the number after `archivo`
fn ordered_files(table: &Table) -> Vec<PathBuf> {
    let mut numbered: Vec<(u64, String)> = table
        .keys()
        .filter_map(|key| {
            let value = string_key(FILES, table, key)?;
            let number = key
                .strip_prefix(FILE_KEY_PREFIX)
                .and_then(|suffix| suffix.parse::<u64>().ok())
                .unwrap_or(u64::MAX);
            Some((number, value))
        })
        .collect();

    // Stable: unnumbered keys keep their file order after the numbered ones
    numbered.sort_by_key(|(number, _)| *number);
    numbered.into_iter().map(|(_, path)| PathBuf::from(path)).collect()
}

fn to_table(state: &SessionState) -> Table {
    let mut general = Table::new();
    general.insert(KEY_PATTERN.to_string(), Value::String(state.expression.clone()));
    general.insert(
        KEY_PATTERN_SELECTED.to_string(),
        Value::String(state.selected_pattern.clone()),
    );

    let files: Table = state
        .files
        .iter()
        .enumerate()
        .map(|(i, path)| {
            (
                format!("{}{}", FILE_KEY_PREFIX, i + 1),
                Value::String(path.to_string_lossy().into_owned()),
            )
        })
        .collect();

    let mut table = Table::new();
    table.insert(GENERAL.to_string(), Value::Table(general));
    table.insert(FILES.to_string(), Value::Table(files));
    table.insert(CUSTOM_VALUES.to_string(), Value::Table(entries_table(&state.custom_values)));
    table.insert(PATTERNS.to_string(), Value::Table(entries_table(&state.patterns)));
    table
}

fn entries_table(entries: &Entries) -> Table {
    entries
        .iter()
        .map(|(name, text)| (name.to_string(), Value::String(text.to_string())))
        .collect()
}
