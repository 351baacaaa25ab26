// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

use std::io;

use super::Surface;
use crate::console::ansi;

/// An in-memory character grid with terminal-like cursor rules.
///
/// Used by the full-screen view, which renders the grid as plain text, and
/// as a deterministic surface in tests. Rows only come into existence through
/// `newline` or by writing past the last column.
#[derive(Debug, Clone)]
pub(crate) struct GridSurface {
    rows: Vec<Vec<char>>,
    row: usize,
    col: usize,
    columns: u16,
}

impl GridSurface {
    pub(crate) fn new(columns: u16) -> Self {
        Self {
            rows: vec![Vec::new()],
            row: 0,
            col: 0,
            columns: columns.max(1),
        }
    }

    /// Drop all content and adopt a new width.
    pub(crate) fn reset(&mut self, columns: u16) {
        *self = Self::new(columns);
    }

    /// Cursor as (row, column). The column is clamped to the last cell.
    pub(crate) fn cursor(&self) -> (usize, usize) {
        (self.row, self.col.min(self.width() - 1))
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect()
    }

    fn width(&self) -> usize {
        self.columns as usize
    }

    fn put(&mut self, ch: char) {
        if self.col >= self.width() {
            // pending wrap
            self.advance_row();
        }
        let width = self.width();
        let line = &mut self.rows[self.row];
        if line.len() <= self.col {
            line.resize(self.col + 1, ' ');
        }
        line[self.col] = ch;
        line.truncate(width);
        self.col += 1;
    }

    fn advance_row(&mut self) {
        self.row += 1;
        self.col = 0;
        if self.row == self.rows.len() {
            self.rows.push(Vec::new());
        }
    }
}

impl Surface for GridSurface {
    fn columns(&self) -> u16 {
        self.columns
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        for ch in ansi::strip(text).chars() {
            if ch == '\n' {
                self.advance_row();
            } else if ch == '\r' {
                self.col = 0;
            } else {
                self.put(ch);
            }
        }
        Ok(())
    }

    fn move_up(&mut self, rows: u16) -> io::Result<()> {
        self.row = self.row.saturating_sub(rows as usize);
        self.col = self.col.min(self.width() - 1);
        Ok(())
    }

    fn move_down(&mut self, rows: u16) -> io::Result<()> {
        self.row = (self.row + rows as usize).min(self.rows.len() - 1);
        self.col = self.col.min(self.width() - 1);
        Ok(())
    }

    fn move_right(&mut self, cols: u16) -> io::Result<()> {
        self.col = (self.col + cols as usize).min(self.width() - 1);
        Ok(())
    }

    fn carriage_return(&mut self) -> io::Result<()> {
        self.col = 0;
        Ok(())
    }

    fn newline(&mut self) -> io::Result<()> {
        self.advance_row();
        Ok(())
    }

    fn clear_row(&mut self) -> io::Result<()> {
        self.rows[self.row].clear();
        Ok(())
    }
}
