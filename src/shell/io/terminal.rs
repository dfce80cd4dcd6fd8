//! # Terminal I/O Implementation
//!
//! Production implementation of the rendering sink using crossterm.
//! All crossterm dependencies are isolated to this module.
//!
//! The terminal keeps a shadow of the current line (printed prefix plus
//! input region) because a real terminal cannot be read back; the shadow
//! backs `input()`, `cursor()` and `current_line()`.

use super::TerminalIo;
use anyhow::Result;
use crossterm::cursor::MoveToColumn;
use crossterm::execute;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

/// Crossterm-backed rendering sink
pub struct CrosstermTerminal<W: Write + Send = io::Stdout> {
    writer: W,
    printed: String,
    input: String,
    cursor: usize,
}

impl CrosstermTerminal<io::Stdout> {
    /// Create a terminal sink writing to stdout
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl<W: Write + Send> CrosstermTerminal<W> {
    /// Create a terminal sink with a custom writer
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            printed: String::new(),
            input: String::new(),
            cursor: 0,
        }
    }

    fn byte_offset(input: &str, col: usize) -> usize {
        input
            .char_indices()
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(input.len())
    }

    /// Display column of the cursor, accounting for wide glyphs
    fn cursor_column(&self) -> u16 {
        let before = &self.input[..Self::byte_offset(&self.input, self.cursor)];
        (self.printed.width() + before.width()) as u16
    }

    /// Redraw the whole current line from the shadow state
    fn redraw(&mut self) -> Result<()> {
        let column = self.cursor_column();
        execute!(
            self.writer,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(&self.printed),
            Print(&self.input),
            MoveToColumn(column),
        )?;
        Ok(())
    }

    /// Append raw text to the shadow, completing lines at each newline
    fn track(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.printed.clear();
                self.input.clear();
                self.cursor = 0;
            } else if ch != '\r' {
                self.printed.push(ch);
            }
        }
    }
}

impl<W: Write + Send> TerminalIo for CrosstermTerminal<W> {
    fn print(&mut self, text: &str) -> Result<()> {
        // Raw mode needs explicit carriage returns
        let text = text.replace('\n', "\r\n");
        execute!(self.writer, Print(&text))?;
        self.track(&text);
        Ok(())
    }

    fn println(&mut self, text: &str) -> Result<()> {
        let end = (self.printed.width() + self.input.width()) as u16;
        execute!(self.writer, MoveToColumn(end), Print(text), Print("\r\n"))?;
        self.track(text);
        self.track("\n");
        Ok(())
    }

    fn clear_line(&mut self) -> Result<()> {
        self.printed.clear();
        self.input.clear();
        self.cursor = 0;
        execute!(self.writer, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        Ok(())
    }

    fn clear_screen(&mut self) -> Result<()> {
        self.printed.clear();
        self.input.clear();
        self.cursor = 0;
        execute!(
            self.writer,
            Clear(ClearType::All),
            crossterm::cursor::MoveTo(0, 0)
        )?;
        Ok(())
    }

    fn input(&self) -> String {
        self.input.clone()
    }

    fn set_input(&mut self, text: &str) -> Result<()> {
        self.input = text.to_string();
        self.cursor = self.cursor.min(self.input.chars().count());
        self.redraw()
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn set_cursor(&mut self, col: usize) -> Result<()> {
        self.cursor = col.min(self.input.chars().count());
        let column = self.cursor_column();
        execute!(self.writer, MoveToColumn(column))?;
        Ok(())
    }

    fn current_line(&self) -> Option<String> {
        Some(format!("{}{}", self.printed, self.input))
    }
}

impl Default for CrosstermTerminal<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink() -> CrosstermTerminal<Vec<u8>> {
        CrosstermTerminal::with_writer(Vec::new())
    }

    #[test]
    fn print_tracks_the_current_line() {
        let mut term = sink();
        term.print("$ ").unwrap();
        term.set_input("help").unwrap();
        assert_eq!(term.current_line().unwrap(), "$ help");
        assert_eq!(term.input(), "help");
    }

    #[test]
    fn println_resets_the_line_shadow() {
        let mut term = sink();
        term.print("$ ").unwrap();
        term.set_input("run").unwrap();
        term.println("").unwrap();
        assert_eq!(term.current_line().unwrap(), "");
    }

    #[test]
    fn cursor_clamps_to_input_length() {
        let mut term = sink();
        term.set_input("ab").unwrap();
        term.set_cursor(10).unwrap();
        assert_eq!(term.cursor(), 2);
    }

    #[test]
    fn cursor_column_counts_wide_glyphs() {
        let mut term = sink();
        term.print("$ ").unwrap();
        term.set_input("日本").unwrap();
        term.set_cursor(2).unwrap();
        // "$ " is 2 columns, each glyph 2 columns
        assert_eq!(term.cursor_column(), 6);
    }
}
