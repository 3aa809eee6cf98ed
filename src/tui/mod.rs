//! Full-screen terminal shell
//!
//! One main view plus three management dialogs. Overlays (prompt, confirm,
//! file picker) and notifications render on top and capture all keyboard
//! input until closed.

pub mod app;
pub mod confirm;
pub mod notice;
pub mod picker;
pub mod prompt;
pub mod ui;

use anyhow::{Context, Result};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, ExecutableCommand};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Terminal;
use std::io;

pub use app::App;

/// Take over the terminal and run the shell until the operator exits
pub fn run(app: App) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut shell = Shell { app };

    io::stdout()
        .execute(EnterAlternateScreen)
        .context("enter alternate screen")?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    shell.app.run(&mut terminal)
}

/// Holds the app while it owns the terminal
///
/// Dropping it persists the session and gives the terminal back, on every
/// exit path including setup errors and panics.
struct Shell {
    app: App,
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.app.shutdown();

        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = stdout.execute(LeaveAlternateScreen);
        let _ = stdout.execute(cursor::Show);
    }
}

/// Calculate a centered rectangle with given percentage dimensions
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
