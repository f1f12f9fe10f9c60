//! Terminal front end
//!
//! The pet lives in the terminal's alternate screen: [`TerminalRenderer`]
//! draws frames at the pet's position, [`TerminalPrompt`] is the modal input
//! box used during interactions, and mouse clicks on the pet become
//! [`Trigger`](crate::types::Trigger)s.
//!
//! Critical: includes a panic hook that restores the terminal on crash.

mod prompt;
mod renderer;

pub use prompt::TerminalPrompt;
pub use renderer::TerminalRenderer;

use std::io::{self, stdout, Stdout};
use std::panic;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Install panic hook that restores terminal before showing panic info.
/// Without this, a panic in raw mode leaves the terminal unusable.
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal FIRST, before printing anything
        let _ = restore();
        original_hook(panic_info);
    }));
}

/// Initialize the terminal
///
/// - Installs custom panic hook
/// - Enables raw mode
/// - Enters alternate screen
/// - Enables mouse capture (clicks on the pet are triggers)
pub fn init() -> io::Result<Tui> {
    install_panic_hook();

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        stdout(),
        DisableMouseCapture,
        LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    Ok(())
}
