use anyhow::{anyhow, Context, Result};
use atty::Stream;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Persisted session file, kept in the working directory
pub const CONFIG_FILE: &str = "repoint.toml";

/// Append-only activity log, kept in the working directory
pub const LOG_FILE: &str = "repoint.log";

/// Command line arguments parser
///
/// Everything is driven from the interactive shell; the command line only
/// carries `--help` and `--version`.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Point configuration files at a new address")]
#[command(name = "repoint")]
pub struct Args {
    /// Directory the session files live in and the file picker starts from
    #[arg(skip)]
    pub working_dir: PathBuf,

    #[arg(skip)]
    pub config_file: PathBuf,

    #[arg(skip)]
    pub log_file: PathBuf,
}

impl Args {
    /// Anchor the session files in `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            working_dir: dir.to_path_buf(),
            config_file: dir.join(CONFIG_FILE),
            log_file: dir.join(LOG_FILE),
        }
    }
}

/// Parse command line arguments and resolve the session file locations
pub fn parse() -> Result<Args> {
    let mut args = Args::parse();

    if !atty::is(Stream::Stdin) || !atty::is(Stream::Stdout) {
        return Err(anyhow!("repoint is interactive and needs a terminal"));
    }

    let dir = std::env::current_dir().context("Failed to resolve the working directory")?;
    let located = Args::in_dir(&dir);
    args.working_dir = located.working_dir;
    args.config_file = located.config_file;
    args.log_file = located.log_file;
    Ok(args)
}
