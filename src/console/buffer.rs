// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Editable command line and its submit history.
//!
//! The cursor is a character index, so `0 <= cursor <= char_len()` holds
//! after every operation.

#[derive(Debug, Default)]
pub(crate) struct History {
    entries: Vec<String>,
}

impl History {
    /// Record a submission. Empty lines and repeats of the last entry are skipped.
    pub(crate) fn push(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            return false;
        }
        if let Some(last) = self.entries.last()
            && last == line
        {
            return false;
        }
        self.entries.push(line.to_string());
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&String> {
        self.entries.get(index)
    }
}

#[derive(Debug, Default)]
pub(crate) struct InputBuffer {
    text: String,
    cursor: usize,
    history: History,
    history_index: Option<usize>,
}

impl InputBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub(crate) fn history(&self) -> &History {
        &self.history
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }

    pub(crate) fn insert(&mut self, s: &str) {
        let at = self.byte_offset(self.cursor);
        self.text.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    pub(crate) fn delete_back(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = self.byte_offset(self.cursor - 1);
        let end = self.byte_offset(self.cursor);
        self.text.drain(start..end);
        self.cursor -= 1;
    }

    pub(crate) fn delete_forward(&mut self) {
        if self.cursor >= self.char_len() {
            return;
        }
        let start = self.byte_offset(self.cursor);
        let end = self.byte_offset(self.cursor + 1);
        self.text.drain(start..end);
    }

    /// Move the cursor by `delta` characters, clamped to the text.
    pub(crate) fn move_cursor(&mut self, delta: isize) {
        let target = self.cursor as isize + delta;
        self.cursor = target.clamp(0, self.char_len() as isize) as usize;
    }

    pub(crate) fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.history_index = None;
    }

    fn load(&mut self, text: String) {
        self.cursor = text.chars().count();
        self.text = text;
    }

    pub(crate) fn history_up(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let next = match self.history_index {
            None => self.history.len() - 1,
            Some(0) => return,
            Some(i) => i - 1,
        };
        if let Some(entry) = self.history.get(next) {
            let entry = entry.clone();
            self.load(entry);
            self.history_index = Some(next);
        }
    }

    /// Moving past the newest entry leaves an empty buffer; text typed before
    /// browsing is not restored.
    pub(crate) fn history_down(&mut self) {
        let Some(idx) = self.history_index else {
            return;
        };
        let next = idx + 1;
        if next >= self.history.len() {
            self.load(String::new());
            self.history_index = None;
        } else if let Some(entry) = self.history.get(next) {
            let entry = entry.clone();
            self.load(entry);
            self.history_index = Some(next);
        }
    }

    /// Hand out the current text for submission and reset the line.
    pub(crate) fn take(&mut self) -> String {
        let text = std::mem::take(&mut self.text);
        self.history.push(&text);
        self.clear();
        text
    }

    /// Record text that was submitted without passing through the line.
    pub(crate) fn remember(&mut self, text: &str) {
        self.history.push(text);
        self.history_index = None;
    }
}
