//! # Mock I/O Implementation for Testing
//!
//! Records every rendering operation and models the visible line so tests
//! can drive the shell without a terminal. The mock is cloneable; clones
//! share state, so tests keep one clone for inspection and hand the other
//! to the shell.

use super::TerminalIo;
use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex};

/// Recorded render operation for verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOp {
    Print(String),
    Println(String),
    ClearLine,
    ClearScreen,
    SetInput(String),
    SetCursor(usize),
}

#[derive(Debug, Default)]
struct MockState {
    /// Completed (scrolled-away) lines, oldest first
    lines: Vec<String>,
    /// Text printed on the current line (the prompt prefix)
    printed: String,
    input: String,
    cursor: usize,
    ops: Vec<RenderOp>,
    /// Remaining number of `print` calls that should fail
    failing_prints: usize,
}

impl MockState {
    fn write_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' || ch == '\r' {
                let line = format!("{}{}", self.printed, self.input);
                self.lines.push(line);
                self.printed.clear();
                self.input.clear();
                self.cursor = 0;
            } else {
                self.printed.push(ch);
            }
        }
    }
}

/// Shared-state mock rendering sink
#[derive(Clone, Default)]
pub struct MockTerminal {
    state: Arc<Mutex<MockState>>,
}

impl MockTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` calls to `print` fail
    pub fn fail_next_prints(&self, count: usize) {
        self.state.lock().unwrap().failing_prints = count;
    }

    /// Recorded operations, in order
    pub fn ops(&self) -> Vec<RenderOp> {
        self.state.lock().unwrap().ops.clone()
    }

    /// Completed lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.state.lock().unwrap().lines.clone()
    }

    /// Everything on screen: completed lines plus the current line
    pub fn screen(&self) -> String {
        let state = self.state.lock().unwrap();
        let mut screen = state.lines.join("\n");
        if !screen.is_empty() {
            screen.push('\n');
        }
        screen.push_str(&state.printed);
        screen.push_str(&state.input);
        screen
    }

    pub fn input_text(&self) -> String {
        self.state.lock().unwrap().input.clone()
    }

    pub fn cursor_col(&self) -> usize {
        self.state.lock().unwrap().cursor
    }

    pub fn current_line_text(&self) -> String {
        let state = self.state.lock().unwrap();
        format!("{}{}", state.printed, state.input)
    }

    pub fn clear_screen_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .ops
            .iter()
            .filter(|op| **op == RenderOp::ClearScreen)
            .count()
    }
}

impl TerminalIo for MockTerminal {
    fn print(&mut self, text: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.failing_prints > 0 {
            state.failing_prints -= 1;
            return Err(anyhow!("render surface unavailable"));
        }
        state.ops.push(RenderOp::Print(text.to_string()));
        state.write_text(text);
        Ok(())
    }

    fn println(&mut self, text: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(RenderOp::Println(text.to_string()));
        state.write_text(text);
        state.write_text("\n");
        Ok(())
    }

    fn clear_line(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(RenderOp::ClearLine);
        state.printed.clear();
        state.input.clear();
        state.cursor = 0;
        Ok(())
    }

    fn clear_screen(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(RenderOp::ClearScreen);
        state.lines.clear();
        state.printed.clear();
        state.input.clear();
        state.cursor = 0;
        Ok(())
    }

    fn input(&self) -> String {
        self.state.lock().unwrap().input.clone()
    }

    fn set_input(&mut self, text: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(RenderOp::SetInput(text.to_string()));
        state.input = text.to_string();
        let len = state.input.chars().count();
        state.cursor = state.cursor.min(len);
        Ok(())
    }

    fn cursor(&self) -> usize {
        self.state.lock().unwrap().cursor
    }

    fn set_cursor(&mut self, col: usize) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(RenderOp::SetCursor(col));
        let len = state.input.chars().count();
        state.cursor = col.min(len);
        Ok(())
    }

    fn current_line(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        Some(format!("{}{}", state.printed, state.input))
    }
}
