use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::error;

/// How deep the file picker looks below its root
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// List the regular files under `root` that can be registered as targets
///
/// Hidden files are included since configuration often lives in dotfiles, but
/// `.git` is never entered. `.gitignore` rules are honoured. Walk errors are
/// logged and skipped.
///
/// # Arguments
/// * `root` - Directory to scan
/// * `max_depth` - Maximum directory depth below `root`
///
/// # Returns
/// * `Vec<PathBuf>` - Files found, relative to `root` and sorted
pub fn list_candidates(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .max_depth(Some(max_depth))
        .filter_entry(|entry| entry.file_name() != ".git")
        .build();

    let mut files = Vec::new();

    for result in walker {
        match result {
            Ok(entry) => {
                if entry.file_type().is_some_and(|kind| kind.is_file()) {
                    let path = entry.path();
                    files.push(path.strip_prefix(root).unwrap_or(path).to_path_buf());
                }
            }
            Err(err) => {
                error!("Error walking {}: {}", root.display(), err);
            }
        }
    }

    files.sort();
    files
}

/// Keep the candidates whose path contains `query`, ignoring case
///
/// # Returns
/// * `Vec<usize>` - Indices into `candidates`
pub fn filter_candidates(candidates: &[PathBuf], query: &str) -> Vec<usize> {
    let query = query.to_lowercase();
    candidates
        .iter()
        .enumerate()
        .filter(|(_, path)| query.is_empty() || path.to_string_lossy().to_lowercase().contains(&query))
        .map(|(i, _)| i)
        .collect()
}
