// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Render surfaces the console draws its input line onto.
//!
//! A surface only offers relative cursor movement. Moving down never scrolls;
//! `newline` is the only operation that may allocate a row below the last one.

mod grid;
mod terminal;

use std::io;

pub(crate) use grid::GridSurface;
pub(crate) use terminal::TerminalSurface;

pub(crate) trait Surface {
    /// Current viewport width in cells.
    fn columns(&self) -> u16;

    /// Write text at the cursor. Escape sequences are allowed.
    fn write(&mut self, text: &str) -> io::Result<()>;

    fn move_up(&mut self, rows: u16) -> io::Result<()>;

    fn move_down(&mut self, rows: u16) -> io::Result<()>;

    fn move_right(&mut self, cols: u16) -> io::Result<()>;

    /// Return to column 0 of the current row.
    fn carriage_return(&mut self) -> io::Result<()>;

    /// Move to column 0 of the next row, scrolling when on the last row.
    fn newline(&mut self) -> io::Result<()>;

    /// Blank the whole current row without moving the cursor.
    fn clear_row(&mut self) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
