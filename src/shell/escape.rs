//! # Escape-Sequence Decoder
//!
//! Classifies raw terminal input chunks into logical edit actions.
//!
//! A chunk is either a pasted block (expanded into per-character events by
//! the controller) or a single logical unit: an escape sequence, a control
//! byte, or printable text to insert at the cursor. Classification is pure;
//! applying the action to the line buffer is the controller's job.

use crate::config::PASTE_MIN_CHUNK_LEN;

/// A logical edit action decoded from one input unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Carriage return; submits or inserts a literal newline depending on
    /// the continuation predicate
    Enter,
    /// Erase the character before the cursor (BACKSPACE, CTRL+H)
    Backspace,
    /// Erase the character under the cursor (`ESC [3~`, CTRL+D)
    Delete,
    /// Autocomplete trigger
    Tab,
    CursorLeft,
    CursorRight,
    Home,
    End,
    /// ALT+LEFT: move to the previous word boundary
    WordLeft,
    /// ALT+RIGHT: move to the next word boundary
    WordRight,
    /// CTRL+BACKSPACE / ALT+BACKSPACE: erase back to the word boundary
    WordErase,
    /// CTRL+K
    KillToEnd,
    /// CTRL+U
    KillToStart,
    /// Up arrow / CTRL+P
    HistoryPrevious,
    /// Down arrow / CTRL+N
    HistoryNext,
    /// CTRL+C. Let through even while the shell is inactive; the core
    /// binds no action to it.
    Interrupt,
    /// Printable text to insert at the cursor
    Insert(String),
    /// Recognizably a key, but not one the shell acts on
    Unknown,
}

/// One classified input chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermInput {
    /// A pasted block, newlines already normalized to carriage returns.
    /// Each character must be fed to the single-unit handler in order.
    Pasted(String),
    Key(KeyAction),
}

/// Classify one raw input chunk.
///
/// The paste heuristic is deliberately exact: more than three characters
/// and not starting with the escape byte. Callers depend on the threshold.
pub fn classify(chunk: &str) -> TermInput {
    let mut chars = chunk.chars();
    let first = match chars.next() {
        Some(ch) => ch,
        None => return TermInput::Key(KeyAction::Unknown),
    };
    if first != '\x1b' && chunk.chars().count() >= PASTE_MIN_CHUNK_LEN {
        return TermInput::Pasted(normalize_paste(chunk));
    }
    TermInput::Key(classify_unit(chunk, first))
}

/// Normalize pasted newlines so each line break submits like ENTER
fn normalize_paste(chunk: &str) -> String {
    chunk.replace("\r\n", "\r").replace('\n', "\r")
}

fn classify_unit(chunk: &str, first: char) -> KeyAction {
    if first == '\x1b' {
        return classify_escape_suffix(&chunk[1..]);
    }
    if first < '\x20' || first == '\x7f' {
        return classify_control(first);
    }
    KeyAction::Insert(chunk.to_string())
}

fn classify_escape_suffix(suffix: &str) -> KeyAction {
    match suffix {
        "[A" => KeyAction::HistoryPrevious,
        "[B" => KeyAction::HistoryNext,
        "[D" => KeyAction::CursorLeft,
        "[C" => KeyAction::CursorRight,
        "[3~" => KeyAction::Delete,
        "[H" | "OH" => KeyAction::Home,
        "[F" | "OF" => KeyAction::End,
        "b" => KeyAction::WordLeft,
        "f" => KeyAction::WordRight,
        "\x7f" | "\x08" => KeyAction::WordErase,
        _ => KeyAction::Unknown,
    }
}

fn classify_control(byte: char) -> KeyAction {
    match byte {
        '\r' => KeyAction::Enter,
        '\x7f' | '\x08' => KeyAction::Backspace,
        '\x04' => KeyAction::Delete,
        '\t' => KeyAction::Tab,
        '\x01' => KeyAction::Home,
        '\x05' => KeyAction::End,
        '\x02' => KeyAction::CursorLeft,
        '\x06' => KeyAction::CursorRight,
        '\x0b' => KeyAction::KillToEnd,
        '\x15' => KeyAction::KillToStart,
        '\x10' => KeyAction::HistoryPrevious,
        '\x0e' => KeyAction::HistoryNext,
        '\x03' => KeyAction::Interrupt,
        _ => KeyAction::Unknown,
    }
}

/// Default multi-line continuation predicate: a line with more opening
/// `(`/`[`/`{` than closing counterparts is incomplete, so ENTER inserts a
/// literal newline instead of submitting.
pub fn has_unbalanced_brackets(input: &str) -> bool {
    let mut round = 0i32;
    let mut square = 0i32;
    let mut curly = 0i32;
    for ch in input.chars() {
        match ch {
            '(' => round += 1,
            ')' => round -= 1,
            '[' => square += 1,
            ']' => square -= 1,
            '{' => curly += 1,
            '}' => curly -= 1,
            _ => {}
        }
    }
    round > 0 || square > 0 || curly > 0
}
