mod args;
mod config;
mod discovery;
mod entries;
mod logging;
mod replacer;
mod scanner;
mod session;
mod tui;

use anyhow::{Context, Result};
use std::process;
use tracing::info;

/// Main entry point of the application
/// Resolves the session files, starts logging and hands the terminal to the shell
fn main() -> Result<()> {
    let args = args::parse().context("Failed to parse arguments")?;

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    Ok(())
}

/// Load the session, discover local addresses and run the shell until exit
fn run(args: args::Args) -> Result<()> {
    logging::init(&args.log_file)?;

    let store = config::ConfigStore::new(args.config_file);
    info!("Application started. Configuration: {}", store.path().display());
    let session = session::Session::open(store);
    let discovered = discovery::discover_addresses();

    tui::run(tui::App::new(session, discovered, args.working_dir))
}
