// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Repaint of the wrapped input line using relative cursor movement only.
//!
//! Every repaint redraws the whole input block: resizing changes the wrap
//! points of text that is already on screen, so incremental updates are not
//! safe.

use std::io;

use super::ansi;
use crate::surface::Surface;

/// What the previous repaint left on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RedrawState {
    /// Rows the input block occupies
    pub row_count: usize,
    pub wrapped: bool,
    /// Row of the block the cursor was left on
    pub cursor_row: usize,
}

impl Default for RedrawState {
    fn default() -> Self {
        Self {
            row_count: 1,
            wrapped: false,
            cursor_row: 0,
        }
    }
}

/// Geometry of prompt + buffer at a given width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Layout {
    pub columns: usize,
    pub prompt_len: usize,
    pub total_rows: usize,
    pub target_row: usize,
    pub target_col: usize,
}

impl Layout {
    pub(crate) fn new(prompt: &str, buffer: &str, cursor: usize, columns: usize) -> Self {
        let columns = columns.max(1);
        let prompt_len = ansi::visible_width(prompt);
        let buffer_len = buffer.chars().count();
        let cursor = cursor.min(buffer_len);

        let total_rows = (prompt_len + buffer_len).div_ceil(columns).max(1);
        let offset = prompt_len + cursor;

        Self {
            columns,
            prompt_len,
            total_rows,
            target_row: offset / columns,
            target_col: offset % columns,
        }
    }

    /// Rows to reserve. A cursor sitting just past a full last row needs a
    /// row of its own.
    pub(crate) fn rows(&self) -> usize {
        self.total_rows.max(self.target_row + 1)
    }

    /// Text of each row: the prompt followed by the head of the buffer, then
    /// `columns`-wide slices of the rest.
    pub(crate) fn row_texts(&self, prompt: &str, buffer: &str) -> Vec<String> {
        let chars: Vec<char> = buffer.chars().collect();
        let mut rows = Vec::with_capacity(self.total_rows);

        if self.prompt_len < self.columns {
            let head = (self.columns - self.prompt_len).min(chars.len());
            let mut first = String::from(prompt);
            first.extend(&chars[..head]);
            rows.push(first);
            rows.extend(
                chars[head..]
                    .chunks(self.columns)
                    .map(|chunk| chunk.iter().collect::<String>()),
            );
        } else {
            // The prompt alone overflows the row; lay it out as plain text.
            let visible: Vec<char> = ansi::strip(prompt).chars().chain(chars).collect();
            rows.extend(
                visible
                    .chunks(self.columns)
                    .map(|chunk| chunk.iter().collect::<String>()),
            );
        }

        rows
    }
}

fn clamp_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Clear `rows` rows starting at the cursor's row, then return to the first.
fn clear_rows<S: Surface>(surface: &mut S, rows: usize) -> io::Result<()> {
    for row in 0..rows {
        surface.clear_row()?;
        if row + 1 < rows {
            surface.move_down(1)?;
        }
    }
    surface.move_up(clamp_u16(rows.saturating_sub(1)))?;
    surface.carriage_return()
}

/// Repaint the input block and leave the cursor at `cursor`.
pub(crate) fn repaint<S: Surface>(
    surface: &mut S,
    state: &mut RedrawState,
    prompt: &str,
    buffer: &str,
    cursor: usize,
) -> io::Result<Layout> {
    let layout = Layout::new(prompt, buffer, cursor, surface.columns() as usize);
    let rows = layout.rows();
    let previous_rows = state.row_count.max(1);
    let cursor_row = state.cursor_row.min(previous_rows - 1);

    if rows > previous_rows {
        // Only newlines scroll, so allocate from the bottom of the old block.
        surface.move_down(clamp_u16(previous_rows - 1 - cursor_row))?;
        for _ in previous_rows..rows {
            surface.newline()?;
        }
        surface.move_up(clamp_u16(rows - 1))?;
    } else {
        surface.move_up(clamp_u16(cursor_row))?;
    }
    surface.carriage_return()?;

    clear_rows(surface, previous_rows.max(rows))?;

    let texts = layout.row_texts(prompt, buffer);
    for (i, text) in texts.iter().enumerate() {
        if i > 0 {
            surface.move_down(1)?;
            surface.carriage_return()?;
        }
        surface.write(text)?;
    }

    let last_row = texts.len().saturating_sub(1);
    if layout.target_row >= last_row {
        surface.move_down(clamp_u16(layout.target_row - last_row))?;
    } else {
        surface.move_up(clamp_u16(last_row - layout.target_row))?;
    }
    surface.carriage_return()?;
    surface.move_right(clamp_u16(layout.target_col))?;
    surface.flush()?;

    *state = RedrawState {
        row_count: rows,
        wrapped: rows > 1,
        cursor_row: layout.target_row,
    };
    Ok(layout)
}

/// Blank the input block and leave the cursor at the start of its first row,
/// ready for output to be printed in its place.
pub(crate) fn erase<S: Surface>(surface: &mut S, state: &mut RedrawState) -> io::Result<()> {
    let rows = state.row_count.max(1);
    surface.move_up(clamp_u16(state.cursor_row.min(rows - 1)))?;
    surface.carriage_return()?;
    clear_rows(surface, rows)?;
    *state = RedrawState::default();
    Ok(())
}
