use anyhow::{Context, Result};
use regex::{NoExpand, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// A file rewritten successfully
#[derive(Debug)]
pub struct FileUpdate {
    pub path: PathBuf,

    /// Number of matches replaced
    pub matches: usize,
}

/// A file that could not be rewritten
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: anyhow::Error,
}

/// Outcome of one batch, in file order
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub updated: Vec<FileUpdate>,
    pub failed: Vec<FileFailure>,
}

impl ApplyReport {
    pub fn succeeded(&self) -> usize {
        self.updated.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// Replace every match of `expression` with `value` in each file
///
/// Files are handled independently: a failure is recorded and the batch moves
/// on, so partial application is a normal outcome. Originals are overwritten
/// without a backup. Only an invalid expression fails the whole call, before
/// any file is touched.
///
/// # Arguments
/// * `files` - Files to rewrite in place
/// * `value` - Literal replacement text
/// * `expression` - Regular expression to search for
pub fn apply(files: &[PathBuf], value: &str, expression: &str) -> Result<ApplyReport> {
    let pattern = Regex::new(expression).map_err(|e| {
        error!("Invalid pattern {}: {}", expression, e);
        anyhow::Error::new(e).context(format!("Invalid pattern: {}", expression))
    })?;

    let mut report = ApplyReport::default();

    for path in files {
        match replace_file(path, &pattern, value) {
            Ok(matches) => {
                info!(
                    "Updated: {} (pattern: {}, new value: {}, matches: {})",
                    path.display(),
                    expression,
                    value,
                    matches
                );
                report.updated.push(FileUpdate {
                    path: path.clone(),
                    matches,
                });
            }
            Err(e) => {
                error!("Could not modify {}: {:#}", path.display(), e);
                report.failed.push(FileFailure {
                    path: path.clone(),
                    error: e,
                });
            }
        }
    }

    info!(
        "Update to {} completed: {} file(s) updated, {} failed.",
        value,
        report.succeeded(),
        report.failed_count()
    );

    Ok(report)
}

/// Rewrite one file, returning the number of replacements
fn replace_file(path: &Path, pattern: &Regex, value: &str) -> Result<usize> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let (replaced, matches) = replace_content(&content, pattern, value);

    fs::write(path, replaced.as_bytes())
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    Ok(matches)
}

/// Replace every non-overlapping match in `content`
///
/// # Returns
/// * `(String, usize)` - The new content and the number of matches
pub fn replace_content(content: &str, pattern: &Regex, value: &str) -> (String, usize) {
    let matches = pattern.find_iter(content).count();
    let replaced = pattern.replace_all(content, NoExpand(value)).into_owned();
    (replaced, matches)
}
