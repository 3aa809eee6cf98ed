use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;

/// Install the global subscriber, appending plain-text entries to `log_path`
///
/// The terminal belongs to the interactive shell, so nothing is written to
/// stdout or stderr.
pub fn init(log_path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_max_level(Level::INFO)
        .try_init()
        .map_err(|e| anyhow!("Failed to set log subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_fails_for_unwritable_location() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("missing").join("repoint.log");
        assert!(init(&log_path).is_err());
        assert!(!log_path.exists());
    }
}
