//! # Input Line Model
//!
//! The current input line and its cursor: pure data plus mutators.
//! Every edit action the decoder produces lands here; the controller
//! mirrors the result onto the rendering sink afterwards.
//!
//! The cursor is a character offset in `[0, len]` (not a byte offset and
//! not a display column; wide-glyph columns are the rendering sink's
//! concern).

/// Current line content plus cursor offset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLine {
    text: String,
    cursor: usize,
}

impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor offset in characters
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Line length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the whole line and put the cursor at its end
    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.len();
    }

    /// Reset to an empty line
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// The fragment from line start to the cursor
    pub fn fragment_before_cursor(&self) -> &str {
        &self.text[..self.byte_offset(self.cursor)]
    }

    /// Insert a character at the cursor, advancing it
    pub fn insert(&mut self, ch: char) {
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
    }

    /// Insert a string at the cursor, advancing past it
    pub fn insert_str(&mut self, s: &str) {
        let at = self.byte_offset(self.cursor);
        self.text.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    /// Erase the character before the cursor. Returns false at the start.
    pub fn erase_backward(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let start = self.byte_offset(self.cursor - 1);
        let end = self.byte_offset(self.cursor);
        self.text.replace_range(start..end, "");
        self.cursor -= 1;
        true
    }

    /// Erase the character under the cursor. Returns false at the end.
    pub fn erase_forward(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        let start = self.byte_offset(self.cursor);
        let end = self.byte_offset(self.cursor + 1);
        self.text.replace_range(start..end, "");
        true
    }

    /// Erase from the previous word boundary up to the cursor
    pub fn erase_word(&mut self) {
        let boundary = self.previous_word_boundary();
        let start = self.byte_offset(boundary);
        let end = self.byte_offset(self.cursor);
        self.text.replace_range(start..end, "");
        self.cursor = boundary;
    }

    /// Erase from the cursor to the end of the line
    pub fn kill_to_end(&mut self) {
        let at = self.byte_offset(self.cursor);
        self.text.truncate(at);
    }

    /// Erase from the start of the line to the cursor
    pub fn kill_to_start(&mut self) {
        let at = self.byte_offset(self.cursor);
        self.text.replace_range(..at, "");
        self.cursor = 0;
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    /// Move the cursor to the start of the word left of it
    pub fn move_word_left(&mut self) {
        self.cursor = self.previous_word_boundary();
    }

    /// Move the cursor past the end of the word right of it
    pub fn move_word_right(&mut self) {
        self.cursor = self.next_word_boundary();
    }

    /// Find the nearest boundary left of the cursor: skip whitespace, then
    /// skip the word (a maximal non-whitespace run), stopping at its start.
    pub fn previous_word_boundary(&self) -> usize {
        let chars: Vec<char> = self.text.chars().collect();
        let mut idx = self.cursor;
        while idx > 0 && chars[idx - 1].is_whitespace() {
            idx -= 1;
        }
        while idx > 0 && !chars[idx - 1].is_whitespace() {
            idx -= 1;
        }
        idx
    }

    /// Find the nearest boundary right of the cursor: skip whitespace, then
    /// skip the word, stopping just past its end.
    pub fn next_word_boundary(&self) -> usize {
        let chars: Vec<char> = self.text.chars().collect();
        let mut idx = self.cursor;
        while idx < chars.len() && chars[idx].is_whitespace() {
            idx += 1;
        }
        while idx < chars.len() && !chars[idx].is_whitespace() {
            idx += 1;
        }
        idx
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}
