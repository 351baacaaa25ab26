// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Append-only record of everything the console has shown.

use super::ansi::{self, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    /// A line the user submitted
    Command,
    /// Output discovered by the result stream
    Output,
    /// Transport, protocol or local failure
    Error,
    /// Progress notice, e.g. while connecting
    Loading,
    /// Direct result of the user's own submission
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TranscriptEntry {
    pub text: String,
    pub raw_text: Option<String>,
    pub kind: EntryKind,
    pub colorized: bool,
    pub spans: Vec<Span>,
}

impl TranscriptEntry {
    fn plain(kind: EntryKind, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            spans: vec![Span {
                text: text.clone(),
                color: None,
            }],
            text,
            raw_text: None,
            kind,
            colorized: false,
        }
    }

    pub(crate) fn command(code: impl Into<String>) -> Self {
        Self::plain(EntryKind::Command, code)
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        Self::plain(EntryKind::Error, message)
    }

    pub(crate) fn loading(message: impl Into<String>) -> Self {
        Self::plain(EntryKind::Loading, message)
    }

    /// Decode remote text, keeping the undecoded form alongside.
    pub(crate) fn decoded(kind: EntryKind, raw: &str) -> Self {
        let spans = ansi::decode(raw);
        let text: String = spans.iter().map(|s| s.text.as_str()).collect();
        let colorized = spans.iter().any(|s| s.color.is_some());
        Self {
            text,
            raw_text: Some(raw.to_string()),
            kind,
            colorized,
            spans,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct TranscriptLog {
    entries: Vec<TranscriptEntry>,
}

impl TranscriptLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries appended at or after `start`.
    pub(crate) fn since(&self, start: usize) -> &[TranscriptEntry] {
        &self.entries[start.min(self.entries.len())..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ansi::AnsiColor;

    #[test]
    fn test_decoded_entry_keeps_raw_text() {
        let entry = TranscriptEntry::decoded(EntryKind::Output, "\x1b[32mOK\x1b[0m");
        assert_eq!(entry.text, "OK");
        assert_eq!(entry.raw_text.as_deref(), Some("\x1b[32mOK\x1b[0m"));
        assert!(entry.colorized);
        assert_eq!(entry.spans[0].color, Some(AnsiColor::Green));
    }

    #[test]
    fn test_plain_entry_is_not_colorized() {
        let entry = TranscriptEntry::decoded(EntryKind::Success, "2");
        assert!(!entry.colorized);
        assert_eq!(TranscriptEntry::error("boom").kind, EntryKind::Error);
    }

    #[test]
    fn test_since_clamps() {
        let mut log = TranscriptLog::new();
        log.push(TranscriptEntry::command("1+1"));
        assert_eq!(log.since(0).len(), 1);
        assert!(log.since(5).is_empty());
    }
}
