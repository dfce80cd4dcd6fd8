//! # I/O Abstraction Layer
//!
//! Trait abstraction over the terminal surface the shell writes to,
//! enabling dependency injection without polluting the engine with
//! terminal-specific code.
//!
//! ## Architecture
//!
//! ```text
//! Production:  Shell ──▶ CrosstermTerminal ──▶ crossterm::execute!()
//! Testing:     Shell ──▶ MockTerminal      ──▶ Vec<RenderOp>
//! ```
//!
//! The surface models one editable line: printed text (the prompt prefix)
//! followed by the visible input region and a cursor column. Everything
//! printed with a newline scrolls away above it.

use anyhow::Result;

pub mod mock;
pub mod terminal;

pub use mock::{MockTerminal, RenderOp};
pub use terminal::CrosstermTerminal;

/// Rendering sink the shell core writes through
pub trait TerminalIo: Send {
    /// Print text on the current line (no trailing newline)
    fn print(&mut self, text: &str) -> Result<()>;

    /// Print text followed by a newline
    fn println(&mut self, text: &str) -> Result<()>;

    /// Clear the current line, prompt included
    fn clear_line(&mut self) -> Result<()>;

    /// Clear the whole screen
    fn clear_screen(&mut self) -> Result<()>;

    /// Visible editable input text (excluding the prompt prefix)
    fn input(&self) -> String;

    /// Replace the visible input text, redrawing the line
    fn set_input(&mut self, text: &str) -> Result<()>;

    /// Cursor offset within the input, in characters
    fn cursor(&self) -> usize;

    /// Move the cursor to a character offset within the input
    fn set_cursor(&mut self, col: usize) -> Result<()>;

    /// Raw text of the line the cursor is on, prompt included.
    /// Used for prompt-prefix detection when re-issuing a prompt.
    fn current_line(&self) -> Option<String>;
}
