// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Transcript entries as styled terminal text.

use colored::{Color, ColoredString, Colorize};

use crate::console::ansi::AnsiColor;
use crate::console::transcript::{EntryKind, TranscriptEntry};

const COMMAND_MARKER: &str = "› ";

fn color(color: AnsiColor) -> Color {
    match color {
        AnsiColor::Black => Color::Black,
        AnsiColor::Red => Color::Red,
        AnsiColor::Green => Color::Green,
        AnsiColor::Yellow => Color::Yellow,
        AnsiColor::Blue => Color::Blue,
        AnsiColor::Magenta => Color::Magenta,
        AnsiColor::Cyan => Color::Cyan,
        AnsiColor::White => Color::White,
        AnsiColor::BrightBlack => Color::BrightBlack,
        AnsiColor::BrightRed => Color::BrightRed,
        AnsiColor::BrightGreen => Color::BrightGreen,
        AnsiColor::BrightYellow => Color::BrightYellow,
        AnsiColor::BrightBlue => Color::BrightBlue,
        AnsiColor::BrightMagenta => Color::BrightMagenta,
        AnsiColor::BrightCyan => Color::BrightCyan,
        AnsiColor::BrightWhite => Color::BrightWhite,
    }
}

fn spans(entry: &TranscriptEntry) -> String {
    entry
        .spans
        .iter()
        .map(|span| match span.color {
            Some(c) => span.text.as_str().color(color(c)).to_string(),
            None => span.text.clone(),
        })
        .collect()
}

/// Render one entry. Lines are separated with `\r\n` since the terminal is
/// in raw mode; there is no trailing line break.
pub(crate) fn render_entry(entry: &TranscriptEntry) -> String {
    let styled: ColoredString = match entry.kind {
        EntryKind::Command => {
            return format!("{}{}", COMMAND_MARKER.green().bold(), entry.text)
                .replace('\n', "\r\n");
        }
        EntryKind::Output | EntryKind::Success if entry.colorized => {
            return spans(entry).replace('\n', "\r\n");
        }
        EntryKind::Output | EntryKind::Success => entry.text.normal(),
        EntryKind::Error if entry.colorized => {
            return spans(entry).replace('\n', "\r\n");
        }
        EntryKind::Error => entry.text.red(),
        EntryKind::Loading => entry.text.bright_black(),
    };
    styled.to_string().replace('\n', "\r\n")
}
