// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

use std::io;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthChar;

use crate::console::Console;
use crate::console::ansi::AnsiColor;
use crate::console::connection::ConnectionState;
use crate::console::transcript::{EntryKind, TranscriptEntry};
use crate::remote::Remote;
use crate::surface::{GridSurface, Surface};

const COMMAND_MARKER: &str = "› ";
/// Border rows around the input pane
const INPUT_CHROME: u16 = 2;

fn color(color: AnsiColor) -> Color {
    match color {
        AnsiColor::Black => Color::Black,
        AnsiColor::Red => Color::Red,
        AnsiColor::Green => Color::Green,
        AnsiColor::Yellow => Color::Yellow,
        AnsiColor::Blue => Color::Blue,
        AnsiColor::Magenta => Color::Magenta,
        AnsiColor::Cyan => Color::Cyan,
        AnsiColor::White => Color::Gray,
        AnsiColor::BrightBlack => Color::DarkGray,
        AnsiColor::BrightRed => Color::LightRed,
        AnsiColor::BrightGreen => Color::LightGreen,
        AnsiColor::BrightYellow => Color::LightYellow,
        AnsiColor::BrightBlue => Color::LightBlue,
        AnsiColor::BrightMagenta => Color::LightMagenta,
        AnsiColor::BrightCyan => Color::LightCyan,
        AnsiColor::BrightWhite => Color::White,
    }
}

/// Styled pieces of an entry before wrapping.
fn entry_pieces(entry: &TranscriptEntry) -> Vec<(String, Style)> {
    let decoded = || -> Vec<(String, Style)> {
        entry
            .spans
            .iter()
            .map(|span| {
                let style = span
                    .color
                    .map(|c| Style::default().fg(color(c)))
                    .unwrap_or_default();
                (span.text.clone(), style)
            })
            .collect()
    };

    match entry.kind {
        EntryKind::Command => vec![
            (
                COMMAND_MARKER.to_string(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            (entry.text.clone(), Style::default()),
        ],
        EntryKind::Output | EntryKind::Success => decoded(),
        EntryKind::Error if entry.colorized => decoded(),
        EntryKind::Error => vec![(entry.text.clone(), Style::default().fg(Color::Red))],
        EntryKind::Loading => vec![(entry.text.clone(), Style::default().fg(Color::DarkGray))],
    }
}

/// Break styled text into rows of at most `width` cells.
fn wrap_pieces(pieces: Vec<(String, Style)>, width: usize, out: &mut Vec<Line<'static>>) {
    let width = width.max(1);
    let mut row: Vec<Span<'static>> = Vec::new();
    let mut used = 0;

    for (text, style) in pieces {
        let mut current = String::new();
        for ch in text.chars() {
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
            let overflow = used + ch_width > width && used > 0;
            if ch == '\n' || overflow {
                if !current.is_empty() {
                    row.push(Span::styled(std::mem::take(&mut current), style));
                }
                out.push(Line::from(std::mem::take(&mut row)));
                used = 0;
                if ch == '\n' {
                    continue;
                }
            }
            current.push(ch);
            used += ch_width;
        }
        if !current.is_empty() {
            row.push(Span::styled(current, style));
        }
    }
    out.push(Line::from(row));
}

/// The last `height` rows of the transcript. Entries are wrapped newest
/// first until the rows are filled; older ones are never touched.
fn transcript_tail(
    entries: &[TranscriptEntry],
    width: u16,
    height: usize,
) -> Vec<Line<'static>> {
    let mut chunks = Vec::new();
    let mut rows = 0;
    for entry in entries.iter().rev() {
        if rows >= height {
            break;
        }
        let mut lines = Vec::new();
        wrap_pieces(entry_pieces(entry), width as usize, &mut lines);
        rows += lines.len();
        chunks.push(lines);
    }

    let mut lines: Vec<Line<'static>> = chunks.into_iter().rev().flatten().collect();
    let start = lines.len().saturating_sub(height);
    lines.drain(..start);
    lines
}

fn state_style(state: ConnectionState) -> Style {
    let fg = match state {
        ConnectionState::Connected => Color::Green,
        ConnectionState::Busy | ConnectionState::AwaitingFirstAck => Color::Yellow,
        ConnectionState::Disconnected => Color::Red,
    };
    Style::default().fg(fg)
}

/// The input line as painted on a grid, plus what the view has hidden.
pub(super) struct View {
    grid: GridSurface,
    /// Entries before this index were cleared from view
    pub(super) hidden: usize,
}

impl View {
    pub(super) fn new() -> Self {
        Self {
            grid: GridSurface::new(1),
            hidden: 0,
        }
    }

    /// Repaint the input line for a frame `width` cells wide.
    pub(super) fn prepare<R: Remote>(
        &mut self,
        console: &mut Console<R>,
        width: u16,
    ) -> io::Result<()> {
        let columns = width.max(1);
        if self.grid.columns() != columns {
            self.grid.reset(columns);
            console.reattach();
        }
        console.repaint(&mut self.grid)
    }
}

pub(super) fn draw<R: Remote>(frame: &mut Frame, console: &Console<R>, view: &View) {
    let area = frame.area();
    let input_rows = console.redraw_state().row_count as u16;
    let max_input = area.height.saturating_sub(2).max(1) / 2;
    let visible_rows = input_rows.min(max_input.max(1));

    let [transcript_area, status_area, input_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(visible_rows + INPUT_CHROME),
    ])
    .areas(area);

    let entries = console.transcript().since(view.hidden);
    let height = transcript_area.height as usize;
    let lines = transcript_tail(entries, transcript_area.width, height);
    frame.render_widget(Paragraph::new(lines), transcript_area);

    let status = Line::from(vec![
        Span::styled(
            format!(" {} ", console.target()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(console.state().label(), state_style(console.state())),
        Span::styled(
            "  Esc line mode · Ctrl+E editor · Ctrl+C quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(status), status_area);

    let (cursor_row, cursor_col) = view.grid.cursor();
    let scroll = (cursor_row + 1).saturating_sub(visible_rows as usize);
    let input_lines: Vec<Line> = view
        .grid
        .lines()
        .into_iter()
        .take(input_rows as usize)
        .skip(scroll)
        .map(Line::from)
        .collect();
    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(input_area);
    frame.render_widget(Paragraph::new(input_lines).block(block), input_area);

    if console.state().accepts_input() {
        let x = inner.x + (cursor_col as u16).min(inner.width.saturating_sub(1));
        let y = inner.y + (cursor_row - scroll) as u16;
        frame.set_cursor_position((x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn test_wrap_by_width() {
        let mut lines = Vec::new();
        wrap_pieces(
            vec![
                ("abc".into(), Style::default()),
                ("defgh".into(), Style::default().fg(Color::Red)),
            ],
            4,
            &mut lines,
        );
        assert_eq!(texts(&lines), vec!["abcd", "efgh"]);
        assert_eq!(lines[0].spans.len(), 2);
    }

    #[test]
    fn test_wrap_keeps_line_breaks() {
        let mut lines = Vec::new();
        wrap_pieces(vec![("a\n\nb".into(), Style::default())], 10, &mut lines);
        assert_eq!(texts(&lines), vec!["a", "", "b"]);
    }

    #[test]
    fn test_entries_to_lines() {
        let entries = vec![
            TranscriptEntry::command("1+1"),
            TranscriptEntry::decoded(EntryKind::Success, "\x1b[33m2\x1b[0m"),
        ];
        let lines = transcript_tail(&entries, 80, 10);
        assert_eq!(texts(&lines), vec!["› 1+1", "2"]);
        assert_eq!(lines[1].spans[0].style.fg, Some(Color::Yellow));
    }

    #[test]
    fn test_tail_keeps_newest_rows() {
        let entries = vec![
            TranscriptEntry::decoded(EntryKind::Output, "old"),
            TranscriptEntry::decoded(EntryKind::Output, "abcdefgh"),
            TranscriptEntry::decoded(EntryKind::Output, "new"),
        ];
        assert_eq!(texts(&transcript_tail(&entries, 4, 2)), vec!["efgh", "new"]);
        assert_eq!(
            texts(&transcript_tail(&entries, 4, 10)),
            vec!["old", "abcd", "efgh", "new"]
        );
        assert!(transcript_tail(&entries, 4, 0).is_empty());
    }
}
