// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

use std::io::{self, Write};

use crossterm::cursor::{MoveDown, MoveRight, MoveToColumn, MoveUp};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};

use super::Surface;

/// A raw-mode terminal driven with crossterm commands.
///
/// Commands are queued and only reach the terminal on `flush`.
pub(crate) struct TerminalSurface<W: Write> {
    out: W,
    columns: u16,
}

impl TerminalSurface<io::Stdout> {
    pub(crate) fn stdout() -> io::Result<Self> {
        let (columns, _) = terminal::size()?;
        Ok(Self::new(io::stdout(), columns))
    }
}

impl<W: Write> TerminalSurface<W> {
    pub(crate) fn new(out: W, columns: u16) -> Self {
        Self {
            out,
            columns: columns.max(1),
        }
    }

    pub(crate) fn set_columns(&mut self, columns: u16) {
        self.columns = columns.max(1);
    }

    /// Clear everything from the cursor to the end of the screen.
    pub(crate) fn clear_below(&mut self) -> io::Result<()> {
        crossterm::queue!(self.out, Clear(ClearType::FromCursorDown))
    }

    pub(crate) fn clear_screen(&mut self) -> io::Result<()> {
        crossterm::queue!(
            self.out,
            Clear(ClearType::All),
            Clear(ClearType::Purge),
            crossterm::cursor::MoveTo(0, 0)
        )
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn columns(&self) -> u16 {
        self.columns
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        crossterm::queue!(self.out, Print(text))
    }

    fn move_up(&mut self, rows: u16) -> io::Result<()> {
        // MoveUp(0) still moves one row on most terminals
        if rows > 0 {
            crossterm::queue!(self.out, MoveUp(rows))?;
        }
        Ok(())
    }

    fn move_down(&mut self, rows: u16) -> io::Result<()> {
        if rows > 0 {
            crossterm::queue!(self.out, MoveDown(rows))?;
        }
        Ok(())
    }

    fn move_right(&mut self, cols: u16) -> io::Result<()> {
        if cols > 0 {
            crossterm::queue!(self.out, MoveRight(cols))?;
        }
        Ok(())
    }

    fn carriage_return(&mut self) -> io::Result<()> {
        crossterm::queue!(self.out, MoveToColumn(0))
    }

    fn newline(&mut self) -> io::Result<()> {
        crossterm::queue!(self.out, Print("\r\n"))
    }

    fn clear_row(&mut self) -> io::Result<()> {
        crossterm::queue!(self.out, Clear(ClearType::CurrentLine))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_moves_emit_nothing() {
        let mut surface = TerminalSurface::new(Vec::new(), 80);
        surface.move_up(0).unwrap();
        surface.move_down(0).unwrap();
        surface.move_right(0).unwrap();
        assert!(surface.into_inner().is_empty());
    }

    #[test]
    fn test_relative_moves_emit_csi() {
        let mut surface = TerminalSurface::new(Vec::new(), 80);
        surface.move_up(2).unwrap();
        surface.carriage_return().unwrap();
        surface.move_right(6).unwrap();
        let out = String::from_utf8(surface.into_inner()).unwrap();
        assert_eq!(out, "\x1b[2A\x1b[1G\x1b[6C");
    }
}
