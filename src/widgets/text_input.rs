use std::collections::VecDeque;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Free-text field state with send history
#[derive(Debug, Clone)]
pub struct TextInputState {
    input: String,
    cursor_pos: usize, // in chars
    history: VecDeque<String>,
    history_index: Option<usize>,
    max_history: usize,
    min_command_length: usize, // Shorter submissions are not recorded
    draft: String,             // Unsent text parked while browsing history
}

impl TextInputState {
    pub fn new(max_history: usize) -> Self {
        Self {
            input: String::new(),
            cursor_pos: 0,
            history: VecDeque::with_capacity(max_history),
            history_index: None,
            max_history,
            min_command_length: 1,
            draft: String::new(),
        }
    }

    pub fn set_min_command_length(&mut self, min_length: usize) {
        self.min_command_length = min_length;
    }

    pub fn as_str(&self) -> &str {
        &self.input
    }

    pub fn cursor_pos(&self) -> usize {
        self.cursor_pos
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_idx = self.char_pos_to_byte_idx(self.cursor_pos);
        self.input.insert(byte_idx, c);
        self.cursor_pos += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| !c.is_control()) {
            self.insert_char(c);
        }
    }

    /// Backspace
    pub fn delete_char(&mut self) {
        if self.cursor_pos > 0 {
            let byte_idx = self.char_pos_to_byte_idx(self.cursor_pos - 1);
            self.input.remove(byte_idx);
            self.cursor_pos -= 1;
        }
    }

    /// Delete
    pub fn delete_at_cursor(&mut self) {
        if self.cursor_pos < self.input.chars().count() {
            let byte_idx = self.char_pos_to_byte_idx(self.cursor_pos);
            self.input.remove(byte_idx);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        let char_count = self.input.chars().count();
        if self.cursor_pos < char_count {
            self.cursor_pos += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_pos = self.input.chars().count();
    }

    fn char_pos_to_byte_idx(&self, char_pos: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_pos)
            .map(|(idx, _)| idx)
            .unwrap_or(self.input.len())
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor_pos = 0;
        self.history_index = None;
        self.draft.clear();
    }

    /// Take the field contents for sending and clear the field.
    ///
    /// An empty field still submits: the device receives a bare `$` frame.
    pub fn submit(&mut self) -> String {
        let text = std::mem::take(&mut self.input);

        if !text.is_empty() && text.chars().count() >= self.min_command_length {
            let should_add = self
                .history
                .front()
                .map(|last| last != &text)
                .unwrap_or(true);

            if should_add {
                self.history.push_front(text.clone());
                if self.history.len() > self.max_history {
                    self.history.pop_back();
                }
            }
        }

        self.clear();
        text
    }

    /// Step back to an older entry, stashing the unsent text on the first step.
    pub fn history_previous(&mut self) {
        let older = self.history_index.map_or(0, |idx| idx + 1);
        if older >= self.history.len() {
            return;
        }
        if self.history_index.is_none() {
            self.draft = std::mem::take(&mut self.input);
        }
        self.recall(Some(older));
    }

    /// Step toward newer entries. Past the newest the stashed text comes back.
    pub fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => self.recall(None),
            Some(idx) => self.recall(Some(idx - 1)),
        }
    }

    fn recall(&mut self, index: Option<usize>) {
        self.input = match index {
            Some(idx) => self.history.get(idx).cloned().unwrap_or_default(),
            None => std::mem::take(&mut self.draft),
        };
        self.history_index = index;
        self.cursor_pos = self.input.chars().count();
    }

    /// Load send history from disk (most recent first)
    pub fn load_history(&mut self, path: &Path) -> std::io::Result<()> {
        if !path.exists() {
            return Ok(());
        }

        let reader = BufReader::new(fs::File::open(path)?);
        self.history.clear();

        for line in reader.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                self.history.push_back(line);
                if self.history.len() > self.max_history {
                    self.history.pop_back();
                }
            }
        }

        tracing::debug!("Loaded {} entries from send history", self.history.len());
        Ok(())
    }

    /// Save send history to disk
    pub fn save_history(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(path)?;
        for cmd in &self.history {
            writeln!(file, "{}", cmd)?;
        }

        tracing::debug!("Saved {} entries to send history", self.history.len());
        Ok(())
    }
}

#[cfg(test)]
impl TextInputState {
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
