// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeyAction {
    Insert(char),
    DeleteBack,
    DeleteForward,
    MoveLeft,
    MoveRight,
    HistoryUp,
    HistoryDown,
    Submit,
    /// Ctrl+E: edit the line in the multi-line external editor
    OpenEditor,
    /// Esc: leave the full-screen view
    ExitFullscreen,
    /// Ctrl+L
    ClearView,
    Quit,
    Ignore,
}

impl KeyAction {
    /// Actions that still apply while a round trip is in flight.
    pub(crate) fn bypasses_gate(&self) -> bool {
        matches!(self, Self::Quit | Self::ExitFullscreen | Self::ClearView)
    }
}

pub(crate) fn dispatch(key: KeyEvent) -> KeyAction {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return KeyAction::Ignore;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => KeyAction::Quit,
        KeyCode::Char('e') if ctrl => KeyAction::OpenEditor,
        KeyCode::Char('l') if ctrl => KeyAction::ClearView,
        KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => KeyAction::Ignore,
        KeyCode::Char(ch) => KeyAction::Insert(ch),
        KeyCode::Backspace => KeyAction::DeleteBack,
        KeyCode::Delete => KeyAction::DeleteForward,
        KeyCode::Left => KeyAction::MoveLeft,
        KeyCode::Right => KeyAction::MoveRight,
        KeyCode::Up => KeyAction::HistoryUp,
        KeyCode::Down => KeyAction::HistoryDown,
        KeyCode::Enter => KeyAction::Submit,
        KeyCode::Esc => KeyAction::ExitFullscreen,
        _ => KeyAction::Ignore,
    }
}

/// Paste text reduced to a single editable line.
pub(crate) fn normalize_paste_text(pasted: &str) -> String {
    pasted
        .replace("\r\n", "\n")
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' || ch == '\t' { ' ' } else { ch })
        .filter(|ch| !ch.is_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_printable_and_editing_keys() {
        assert_eq!(
            dispatch(key(KeyCode::Char('x'), KeyModifiers::NONE)),
            KeyAction::Insert('x')
        );
        assert_eq!(
            dispatch(key(KeyCode::Char('X'), KeyModifiers::SHIFT)),
            KeyAction::Insert('X')
        );
        assert_eq!(
            dispatch(key(KeyCode::Backspace, KeyModifiers::NONE)),
            KeyAction::DeleteBack
        );
        assert_eq!(
            dispatch(key(KeyCode::Delete, KeyModifiers::NONE)),
            KeyAction::DeleteForward
        );
        assert_eq!(
            dispatch(key(KeyCode::Up, KeyModifiers::NONE)),
            KeyAction::HistoryUp
        );
        assert_eq!(
            dispatch(key(KeyCode::Enter, KeyModifiers::NONE)),
            KeyAction::Submit
        );
    }

    #[test]
    fn test_control_shortcuts() {
        assert_eq!(
            dispatch(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Quit
        );
        assert_eq!(
            dispatch(key(KeyCode::Char('e'), KeyModifiers::CONTROL)),
            KeyAction::OpenEditor
        );
        assert_eq!(
            dispatch(key(KeyCode::Char('k'), KeyModifiers::CONTROL)),
            KeyAction::Ignore
        );
    }

    #[test]
    fn test_release_events_ignored() {
        let mut event = key(KeyCode::Char('a'), KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        assert_eq!(dispatch(event), KeyAction::Ignore);
    }

    #[test]
    fn test_normalize_paste_text() {
        assert_eq!(normalize_paste_text("a\r\nb\tc\x07"), "a b c");
    }
}
