// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Line mode: the console runs inline on the terminal, printing transcript
//! entries above a wrapped input line.

mod render;

use std::io::{self, Stdout};

use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use futures::StreamExt;
use tracing::{debug, info};

use crate::console::{Console, ConsoleEvent, KeyOutcome};
use crate::editor;
use crate::error::Result;
use crate::remote::Remote;
use crate::surface::{Surface, TerminalSurface};

use render::render_entry;

struct RawModeGuard {
    keyboard_flags_enabled: bool,
}

impl RawModeGuard {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        crossterm::execute!(io::stdout(), EnableBracketedPaste).ok();

        let flags = KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
            | KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
        let keyboard_flags_enabled =
            crossterm::execute!(io::stdout(), PushKeyboardEnhancementFlags(flags)).is_ok();

        Ok(Self {
            keyboard_flags_enabled,
        })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.keyboard_flags_enabled {
            let _ = crossterm::execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = crossterm::execute!(io::stdout(), DisableBracketedPaste);
        disable_raw_mode().ok();
        let _ = crossterm::execute!(io::stdout(), crossterm::cursor::Show);
    }
}

enum Step {
    Terminal(Option<io::Result<Event>>),
    Console(ConsoleEvent),
}

struct LineView {
    surface: TerminalSurface<Stdout>,
    /// Transcript entries already printed
    printed: usize,
}

impl LineView {
    /// Print entries the terminal has not shown yet above the input line,
    /// then repaint the input line below them.
    fn sync<R: Remote>(&mut self, console: &mut Console<R>) -> io::Result<()> {
        let pending = console.transcript().since(self.printed).len();
        if pending > 0 {
            console.erase(&mut self.surface)?;
            for entry in console.transcript().since(self.printed) {
                self.surface.write(&render_entry(entry))?;
                self.surface.newline()?;
            }
            self.printed += pending;
        }
        console.repaint(&mut self.surface)
    }

    fn resize<R: Remote>(&mut self, console: &mut Console<R>, columns: u16) -> io::Result<()> {
        debug!(columns, "Terminal resized");
        // The terminal may have reflowed the old block; start over from
        // where its first row most likely is.
        self.surface.carriage_return()?;
        self.surface
            .move_up(u16::try_from(console.redraw_state().cursor_row).unwrap_or(u16::MAX))?;
        self.surface.clear_below()?;
        self.surface.set_columns(columns);
        console.reattach();
        console.repaint(&mut self.surface)
    }

    fn clear<R: Remote>(&mut self, console: &mut Console<R>) -> io::Result<()> {
        self.surface.clear_screen()?;
        console.reattach();
        console.repaint(&mut self.surface)
    }

    /// Hand the terminal to the external editor and submit what it returns.
    fn edit<R: Remote>(&mut self, console: &mut Console<R>) -> io::Result<()> {
        console.erase(&mut self.surface)?;
        self.surface.flush()?;
        disable_raw_mode()?;
        let edited = editor::edit(console.buffer().text());
        enable_raw_mode()?;
        console.reattach();

        match edited {
            Ok(Some(code)) => {
                console.submit_code(code);
            }
            Ok(None) => {}
            Err(e) => console.report_error(e.to_string()),
        }
        Ok(())
    }

    /// Leave the cursor on a fresh line below the input block.
    fn finish<R: Remote>(&mut self, console: &mut Console<R>) -> io::Result<()> {
        let state = console.redraw_state();
        let below = state.row_count.saturating_sub(state.cursor_row + 1);
        self.surface
            .move_down(u16::try_from(below).unwrap_or(u16::MAX))?;
        self.surface.newline()?;
        self.surface.flush()
    }
}

/// Run the console on the terminal until the user quits. Entries from
/// `printed` onward are printed first; pass 0 to replay the whole transcript.
pub(crate) async fn run<R: Remote>(console: &mut Console<R>, printed: usize) -> Result<()> {
    info!(process = %console.target(), "Starting line mode");
    let _raw = RawModeGuard::new()?;
    let mut view = LineView {
        surface: TerminalSurface::stdout()?,
        printed,
    };
    let mut events = EventStream::new();

    console.reattach();
    view.sync(console)?;

    loop {
        let step = tokio::select! {
            event = events.next() => Step::Terminal(event),
            event = console.next_event() => Step::Console(event),
        };

        match step {
            Step::Console(event) => console.apply_event(event),
            Step::Terminal(None) => break,
            Step::Terminal(Some(Err(e))) => return Err(e.into()),
            Step::Terminal(Some(Ok(event))) => match event {
                Event::Key(key) => match console.handle_key(key) {
                    KeyOutcome::Quit => break,
                    KeyOutcome::ClearView => view.clear(console)?,
                    KeyOutcome::OpenEditor => view.edit(console)?,
                    KeyOutcome::Redraw
                    | KeyOutcome::Dropped
                    | KeyOutcome::Nothing
                    | KeyOutcome::ExitFullscreen => {}
                },
                Event::Paste(text) => {
                    console.paste(&text);
                }
                Event::Resize(columns, _) => view.resize(console, columns)?,
                _ => {}
            },
        }

        view.sync(console)?;
    }

    view.finish(console)?;
    console.stop_poller();
    Ok(())
}
