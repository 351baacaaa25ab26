// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Full-screen mode. The same [`Console`] drives a ratatui view; the input
//! line is painted onto a grid that the view renders.

mod draw;

use std::io;

use crossterm::{
    event::{
        DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::prelude::*;
use tracing::info;

use crate::console::{Console, ConsoleEvent, KeyOutcome};
use crate::editor;
use crate::error::Result;
use crate::remote::Remote;

use draw::{View, draw};

/// How the full-screen view ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TuiExit {
    Quit,
    /// Continue the session in line mode
    LeaveFullscreen,
}

enum Step {
    Terminal(Option<io::Result<Event>>),
    Console(ConsoleEvent),
}

fn setup_terminal() -> io::Result<()> {
    enable_raw_mode()?;
    execute!(
        io::stdout(),
        EnterAlternateScreen,
        PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
        )
    )?;
    execute!(io::stdout(), EnableBracketedPaste)?;
    Ok(())
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        io::stdout(),
        crossterm::cursor::Show,
        PopKeyboardEnhancementFlags,
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    Ok(())
}

pub(crate) async fn run<R: Remote>(console: &mut Console<R>) -> Result<TuiExit> {
    info!(process = %console.target(), "Starting full-screen mode");
    setup_terminal()?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let res = match Terminal::new(CrosstermBackend::new(io::stdout())) {
        Ok(mut terminal) => run_view(&mut terminal, console).await,
        Err(e) => Err(e.into()),
    };

    restore_terminal()?;
    res
}

async fn run_view<R: Remote>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    console: &mut Console<R>,
) -> Result<TuiExit> {
    let mut view = View::new();
    let mut events = EventStream::new();
    console.reattach();

    loop {
        let size = terminal.size()?;
        view.prepare(console, size.width)?;
        terminal.draw(|frame| draw(frame, console, &view))?;

        let step = tokio::select! {
            event = events.next() => Step::Terminal(event),
            event = console.next_event() => Step::Console(event),
        };

        match step {
            Step::Console(event) => console.apply_event(event),
            Step::Terminal(None) => return Ok(TuiExit::Quit),
            Step::Terminal(Some(Err(e))) => return Err(e.into()),
            Step::Terminal(Some(Ok(Event::Key(key)))) => match console.handle_key(key) {
                KeyOutcome::Quit => return Ok(TuiExit::Quit),
                KeyOutcome::ExitFullscreen => return Ok(TuiExit::LeaveFullscreen),
                KeyOutcome::ClearView => view.hidden = console.transcript().len(),
                KeyOutcome::OpenEditor => {
                    restore_terminal()?;
                    let edited = editor::edit(console.buffer().text());
                    setup_terminal()?;
                    terminal.clear()?;
                    match edited {
                        Ok(Some(code)) => {
                            console.submit_code(code);
                        }
                        Ok(None) => {}
                        Err(e) => console.report_error(e.to_string()),
                    }
                }
                KeyOutcome::Redraw | KeyOutcome::Dropped | KeyOutcome::Nothing => {}
            },
            Step::Terminal(Some(Ok(Event::Paste(text)))) => {
                console.paste(&text);
            }
            Step::Terminal(Some(Ok(_))) => {}
        }
    }
}
