// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! The interactive console engine shared by the CLI and TUI front ends.
//!
//! A [`Console`] is owned by exactly one UI loop. Round trips and the result
//! poller run as tasks and report back over channels, so every mutation of
//! the buffer, redraw state and transcript happens on the UI loop between
//! suspension points.

pub(crate) mod ansi;
pub(crate) mod buffer;
pub(crate) mod connection;
pub(crate) mod keys;
pub(crate) mod redraw;
pub(crate) mod transcript;

use std::io;
use std::sync::Arc;

use crossterm::event::KeyEvent;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::commands::{self, Command};
use crate::error::Result;
use crate::poller::{
    self, PollBatch, PollSeed, PollerConfig, PollerHandle, ResultStreamPoller, SeenSet,
};
use crate::remote::{EvalResult, Remote};
use crate::surface::Surface;

use buffer::InputBuffer;
use connection::{ConnectionState, SubmitDecision, Transition};
use keys::KeyAction;
use redraw::RedrawState;
use transcript::{EntryKind, TranscriptEntry, TranscriptLog};

pub(crate) const DEFAULT_PLACEHOLDER_PROMPT: &str = "connect> ";

#[derive(Debug, Clone)]
pub(crate) struct ConsoleOptions {
    /// Shown until the handshake reports the remote prompt
    pub placeholder_prompt: String,
    /// Code evaluated for the handshake
    pub handshake_code: String,
    pub poller: PollerConfig,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            placeholder_prompt: DEFAULT_PLACEHOLDER_PROMPT.to_string(),
            handshake_code: String::new(),
            poller: PollerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EvalKind {
    Handshake,
    Command,
}

#[derive(Debug)]
pub(crate) struct EvalOutcome {
    target: String,
    kind: EvalKind,
    message_id: Option<String>,
    /// Where the log stood once the handshake succeeded
    seed: Option<PollSeed>,
    result: Result<EvalResult>,
}

#[derive(Debug)]
pub(crate) enum ConsoleEvent {
    Eval(EvalOutcome),
    Poll(PollBatch),
}

/// What the front end should do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyOutcome {
    Redraw,
    /// Input arrived while a round trip was in flight
    Dropped,
    Nothing,
    OpenEditor,
    ExitFullscreen,
    ClearView,
    Quit,
}

pub(crate) struct Console<R: Remote> {
    remote: Arc<R>,
    target: String,
    options: ConsoleOptions,
    buffer: InputBuffer,
    redraw: RedrawState,
    prompt: String,
    state: ConnectionState,
    transcript: TranscriptLog,
    seen: SeenSet,
    eval_tx: mpsc::UnboundedSender<EvalOutcome>,
    eval_rx: mpsc::UnboundedReceiver<EvalOutcome>,
    poll_tx: mpsc::UnboundedSender<PollBatch>,
    poll_rx: mpsc::UnboundedReceiver<PollBatch>,
    poller: Option<PollerHandle>,
}

impl<R: Remote> Console<R> {
    pub(crate) fn new(remote: Arc<R>, target: String, options: ConsoleOptions) -> Self {
        let (eval_tx, eval_rx) = mpsc::unbounded_channel();
        let (poll_tx, poll_rx) = mpsc::unbounded_channel();
        let mut transcript = TranscriptLog::new();
        transcript.push(TranscriptEntry::loading(format!(
            "Target {target}. Press Enter to connect, /help for commands."
        )));
        Self {
            remote,
            prompt: options.placeholder_prompt.clone(),
            target,
            options,
            buffer: InputBuffer::new(),
            redraw: RedrawState::default(),
            state: ConnectionState::default(),
            transcript,
            seen: SeenSet::default(),
            eval_tx,
            eval_rx,
            poll_tx,
            poll_rx,
            poller: None,
        }
    }

    pub(crate) fn target(&self) -> &str {
        &self.target
    }

    pub(crate) fn prompt(&self) -> &str {
        &self.prompt
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.state
    }

    pub(crate) fn transcript(&self) -> &TranscriptLog {
        &self.transcript
    }

    pub(crate) fn buffer(&self) -> &InputBuffer {
        &self.buffer
    }

    pub(crate) fn redraw_state(&self) -> RedrawState {
        self.redraw
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        self.apply_action(keys::dispatch(key))
    }

    pub(crate) fn apply_action(&mut self, action: KeyAction) -> KeyOutcome {
        if !self.state.accepts_input() && !action.bypasses_gate() {
            return KeyOutcome::Dropped;
        }

        match action {
            KeyAction::Insert(ch) => {
                let mut tmp = [0u8; 4];
                self.buffer.insert(ch.encode_utf8(&mut tmp));
                KeyOutcome::Redraw
            }
            KeyAction::DeleteBack => {
                self.buffer.delete_back();
                KeyOutcome::Redraw
            }
            KeyAction::DeleteForward => {
                self.buffer.delete_forward();
                KeyOutcome::Redraw
            }
            KeyAction::MoveLeft => {
                self.buffer.move_cursor(-1);
                KeyOutcome::Redraw
            }
            KeyAction::MoveRight => {
                self.buffer.move_cursor(1);
                KeyOutcome::Redraw
            }
            KeyAction::HistoryUp => {
                self.buffer.history_up();
                KeyOutcome::Redraw
            }
            KeyAction::HistoryDown => {
                self.buffer.history_down();
                KeyOutcome::Redraw
            }
            KeyAction::Submit => self.submit(),
            KeyAction::OpenEditor => KeyOutcome::OpenEditor,
            KeyAction::ExitFullscreen => KeyOutcome::ExitFullscreen,
            KeyAction::ClearView => KeyOutcome::ClearView,
            KeyAction::Quit => KeyOutcome::Quit,
            KeyAction::Ignore => KeyOutcome::Nothing,
        }
    }

    /// Insert pasted text as a single line.
    pub(crate) fn paste(&mut self, text: &str) -> KeyOutcome {
        if !self.state.accepts_input() {
            return KeyOutcome::Dropped;
        }
        self.buffer.insert(&keys::normalize_paste_text(text));
        KeyOutcome::Redraw
    }

    fn submit(&mut self) -> KeyOutcome {
        if let Some(command) = commands::parse(self.buffer.text()) {
            self.buffer.take();
            return self.run_command(command);
        }

        match self.state.decide(self.buffer.is_empty()) {
            SubmitDecision::Handshake => {
                self.start_handshake();
                KeyOutcome::Redraw
            }
            SubmitDecision::Send => {
                let code = self.buffer.take();
                self.send(code);
                KeyOutcome::Redraw
            }
            SubmitDecision::NotConnected => {
                self.report_not_connected();
                KeyOutcome::Redraw
            }
            SubmitDecision::Skip => KeyOutcome::Nothing,
            SubmitDecision::Drop => KeyOutcome::Dropped,
        }
    }

    /// Submit text produced outside the line editor, e.g. by the external
    /// editor. The current line is discarded when the text is sent.
    pub(crate) fn submit_code(&mut self, code: String) -> KeyOutcome {
        if code.trim().is_empty() {
            return KeyOutcome::Nothing;
        }
        match self.state.decide(false) {
            SubmitDecision::Send => {
                self.buffer.clear();
                self.buffer.remember(&code);
                self.send(code);
                KeyOutcome::Redraw
            }
            SubmitDecision::NotConnected => {
                self.report_not_connected();
                KeyOutcome::Redraw
            }
            SubmitDecision::Drop => KeyOutcome::Dropped,
            SubmitDecision::Handshake | SubmitDecision::Skip => KeyOutcome::Nothing,
        }
    }

    pub(crate) fn report_error(&mut self, message: impl Into<String>) {
        self.transcript.push(TranscriptEntry::error(message));
    }

    fn report_not_connected(&mut self) {
        self.report_error(format!(
            "Not connected to {}. Press Enter on an empty line to connect.",
            self.target
        ));
    }

    fn run_command(&mut self, command: Command) -> KeyOutcome {
        match command {
            Command::Clear => KeyOutcome::ClearView,
            Command::Quit => KeyOutcome::Quit,
            Command::Help => {
                self.transcript
                    .push(TranscriptEntry::loading(commands::help_text()));
                KeyOutcome::Redraw
            }
            Command::Status => {
                self.transcript.push(TranscriptEntry::loading(format!(
                    "Target {} ({}), {} remote entries seen, {} lines in history",
                    self.target,
                    self.state.label(),
                    self.seen.len(),
                    self.buffer.history().len()
                )));
                KeyOutcome::Redraw
            }
            Command::Target(target) => {
                self.set_target(target);
                KeyOutcome::Redraw
            }
        }
    }

    /// Point the console at another remote process. Connection, dedup and
    /// pagination state start over; the transcript and history are kept.
    pub(crate) fn set_target(&mut self, target: String) {
        info!(from = %self.target, to = %target, "Switching target");
        self.poller = None;
        self.seen.clear();
        self.state.apply(Transition::Reset);
        self.prompt = self.options.placeholder_prompt.clone();
        self.target = target;
        self.transcript.push(TranscriptEntry::loading(format!(
            "Target {}. Press Enter to connect.",
            self.target
        )));
    }

    fn start_handshake(&mut self) {
        self.state.apply(Transition::HandshakeStarted);
        self.transcript.push(TranscriptEntry::loading(format!(
            "Connecting to {}...",
            self.target
        )));
        self.spawn_eval(EvalKind::Handshake, self.options.handshake_code.clone());
    }

    fn send(&mut self, code: String) {
        self.transcript.push(TranscriptEntry::command(code.clone()));
        self.state.apply(Transition::SendStarted);
        self.spawn_eval(EvalKind::Command, code);
    }

    fn spawn_eval(&self, kind: EvalKind, code: String) {
        let remote = Arc::clone(&self.remote);
        let target = self.target.clone();
        let config = self.options.poller;
        let tx = self.eval_tx.clone();
        tokio::spawn(async move {
            debug!(process = %target, ?kind, "Sending eval");
            let (message_id, result) = match remote.send_eval(&target, &code).await {
                Ok(id) => {
                    let result = remote.fetch_result(&target, &id).await;
                    (Some(id), result)
                }
                Err(e) => (None, Err(e)),
            };

            let mut seed = None;
            if kind == EvalKind::Handshake
                && let Ok(result) = &result
                && result.error.is_none()
            {
                match poller::seed(remote.as_ref(), &target, config).await {
                    Ok(page) => seed = Some(page),
                    Err(e) => warn!(
                        process = %target,
                        error = %e,
                        "Could not read the result log; polling from the newest page"
                    ),
                }
            }

            let _ = tx.send(EvalOutcome {
                target,
                kind,
                message_id,
                seed,
                result,
            });
        });
    }

    fn start_poller(&mut self, seed: PollSeed) {
        for edge in &seed.entries {
            self.seen.insert(edge.id());
        }
        let poller = ResultStreamPoller::new(
            Arc::clone(&self.remote),
            self.target.clone(),
            self.options.poller,
            seed.cursor,
            self.poll_tx.clone(),
        );
        self.poller = Some(poller.spawn());
    }

    /// Stop background polling, e.g. when the view is torn down.
    pub(crate) fn stop_poller(&mut self) {
        self.poller = None;
    }

    /// Wait for the next round trip result or poll batch.
    pub(crate) async fn next_event(&mut self) -> ConsoleEvent {
        tokio::select! {
            Some(outcome) = self.eval_rx.recv() => ConsoleEvent::Eval(outcome),
            Some(batch) = self.poll_rx.recv() => ConsoleEvent::Poll(batch),
            else => std::future::pending().await,
        }
    }

    pub(crate) fn apply_event(&mut self, event: ConsoleEvent) {
        match event {
            ConsoleEvent::Eval(outcome) => self.apply_eval(outcome),
            ConsoleEvent::Poll(batch) => self.apply_batch(batch),
        }
    }

    fn apply_eval(&mut self, outcome: EvalOutcome) {
        if outcome.target != self.target {
            debug!(process = %outcome.target, "Dropping result for previous target");
            return;
        }
        // The poller may have shown this message already.
        let fresh = match &outcome.message_id {
            Some(id) => self.seen.insert(id),
            None => true,
        };

        match (outcome.kind, outcome.result) {
            (EvalKind::Handshake, Ok(result)) if result.error.is_none() => {
                if let Some(prompt) = result.output_prompt {
                    self.prompt = prompt;
                }
                self.state.apply(Transition::HandshakeSucceeded);
                self.transcript.push(TranscriptEntry::decoded(
                    EntryKind::Success,
                    &format!("Connected to {}", self.target),
                ));
                self.start_poller(outcome.seed.unwrap_or_default());
            }
            (EvalKind::Handshake, Ok(result)) => {
                let message = result.error.unwrap_or_default();
                self.transcript
                    .push(TranscriptEntry::decoded(EntryKind::Error, &message));
                self.state.apply(Transition::HandshakeFailed);
            }
            (EvalKind::Handshake, Err(e)) => {
                warn!(process = %self.target, error = %e, "Handshake failed");
                self.report_error(format!("Connection failed: {}", e.tui_message()));
                self.state.apply(Transition::HandshakeFailed);
            }
            (EvalKind::Command, Ok(result)) => {
                if let Some(data) = result.output_data.filter(|d| fresh && !d.is_empty()) {
                    self.transcript
                        .push(TranscriptEntry::decoded(EntryKind::Success, &data));
                }
                if let Some(error) = result.error.filter(|_| fresh) {
                    self.transcript
                        .push(TranscriptEntry::decoded(EntryKind::Error, &error));
                }
                if let Some(prompt) = result.output_prompt {
                    self.prompt = prompt;
                }
                self.state.apply(Transition::SendFinished);
            }
            (EvalKind::Command, Err(e)) => {
                warn!(process = %self.target, error = %e, "Eval failed");
                self.report_error(e.tui_message());
                self.state.apply(Transition::SendFinished);
            }
        }
    }

    /// Render what the poller found and has not been shown yet.
    fn apply_batch(&mut self, batch: PollBatch) {
        if batch.target != self.target {
            return;
        }
        for edge in batch.entries {
            if !self.seen.insert(edge.id()) {
                continue;
            }
            if let Some(data) = &edge.output_data {
                self.transcript
                    .push(TranscriptEntry::decoded(EntryKind::Output, data));
            }
            if let Some(prompt) = edge.output_prompt {
                self.prompt = prompt;
            }
        }
    }

    /// Repaint the input line onto `surface`.
    pub(crate) fn repaint<S: Surface>(&mut self, surface: &mut S) -> io::Result<()> {
        redraw::repaint(
            surface,
            &mut self.redraw,
            &self.prompt,
            self.buffer.text(),
            self.buffer.cursor(),
        )?;
        Ok(())
    }

    /// Blank the input line so output can be printed where it was.
    pub(crate) fn erase<S: Surface>(&mut self, surface: &mut S) -> io::Result<()> {
        redraw::erase(surface, &mut self.redraw)
    }

    /// Forget what is on screen; the next repaint starts on a fresh row.
    /// Used after a resize or when moving to another surface.
    pub(crate) fn reattach(&mut self) {
        self.redraw = RedrawState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::remote::Variant;
    use crate::remote::fake::{FakeRemote, edge};
    use crate::surface::GridSurface;
    use std::time::Duration;

    fn options() -> ConsoleOptions {
        ConsoleOptions {
            placeholder_prompt: "connect> ".into(),
            handshake_code: String::new(),
            poller: PollerConfig {
                interval: Duration::from_millis(50),
                limit: 100,
                variant: Variant::Numeric,
            },
        }
    }

    fn console(remote: &Arc<FakeRemote>) -> Console<FakeRemote> {
        Console::new(Arc::clone(remote), "proc-1".into(), options())
    }

    fn type_text(console: &mut Console<FakeRemote>, text: &str) {
        for ch in text.chars() {
            console.apply_action(KeyAction::Insert(ch));
        }
    }

    fn last(console: &Console<FakeRemote>) -> &TranscriptEntry {
        console.transcript().since(0).last().unwrap()
    }

    fn outputs(console: &Console<FakeRemote>) -> Vec<String> {
        console
            .transcript()
            .since(0)
            .iter()
            .filter(|e| e.kind == EntryKind::Output)
            .map(|e| e.text.clone())
            .collect()
    }

    /// Apply events until no round trip is pending.
    async fn settle(console: &mut Console<FakeRemote>) {
        while !console.state().accepts_input() {
            let event = console.next_event().await;
            console.apply_event(event);
        }
    }

    async fn connect(console: &mut Console<FakeRemote>, remote: &FakeRemote) {
        remote.push_result(Ok(EvalResult {
            output_prompt: Some("aos> ".into()),
            ..Default::default()
        }));
        assert_eq!(console.apply_action(KeyAction::Submit), KeyOutcome::Redraw);
        assert_eq!(console.state(), ConnectionState::AwaitingFirstAck);
        settle(console).await;
        assert_eq!(console.state(), ConnectionState::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_eval() {
        let remote = Arc::new(FakeRemote::new());
        let mut console = console(&remote);
        assert_eq!(console.prompt(), "connect> ");

        connect(&mut console, &remote).await;
        assert_eq!(console.prompt(), "aos> ");
        assert_eq!(last(&console).kind, EntryKind::Success);

        remote.push_result(Ok(EvalResult {
            output_data: Some("2".into()),
            output_prompt: Some("aos[2]> ".into()),
            error: None,
        }));
        type_text(&mut console, "1+1");
        console.apply_action(KeyAction::Submit);

        assert_eq!(last(&console).kind, EntryKind::Command);
        assert_eq!(last(&console).text, "1+1");
        assert_eq!(console.state(), ConnectionState::Busy);
        assert_eq!(console.buffer().text(), "");

        assert_eq!(
            console.apply_action(KeyAction::Insert('x')),
            KeyOutcome::Dropped
        );
        assert_eq!(console.buffer().text(), "");

        settle(&mut console).await;
        assert_eq!(console.state(), ConnectionState::Connected);
        assert_eq!(last(&console).kind, EntryKind::Success);
        assert_eq!(last(&console).text, "2");
        assert_eq!(console.prompt(), "aos[2]> ");
        assert_eq!(remote.sent(), vec!["".to_string(), "1+1".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_refused_before_handshake() {
        let remote = Arc::new(FakeRemote::new());
        let mut console = console(&remote);
        type_text(&mut console, "print(1)");
        console.apply_action(KeyAction::Submit);

        assert_eq!(console.state(), ConnectionState::Disconnected);
        assert_eq!(last(&console).kind, EntryKind::Error);
        assert_eq!(console.buffer().text(), "print(1)");
        assert!(remote.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_handshake_can_be_retried() {
        let remote = Arc::new(FakeRemote::new());
        let mut console = console(&remote);
        remote.push_result(Err(Error::Other("refused".into())));
        console.apply_action(KeyAction::Submit);
        settle(&mut console).await;

        assert_eq!(console.state(), ConnectionState::Disconnected);
        assert_eq!(last(&console).kind, EntryKind::Error);
        assert!(last(&console).text.contains("refused"));

        connect(&mut console, &remote).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_eval_errors_render_inline() {
        let remote = Arc::new(FakeRemote::new());
        let mut console = console(&remote);
        connect(&mut console, &remote).await;

        remote.push_result(Ok(EvalResult {
            error: Some("\x1b[31msyntax error\x1b[0m".into()),
            ..Default::default()
        }));
        type_text(&mut console, "1+");
        console.apply_action(KeyAction::Submit);
        settle(&mut console).await;
        assert_eq!(last(&console).kind, EntryKind::Error);
        assert_eq!(last(&console).text, "syntax error");
        assert!(last(&console).colorized);

        remote.push_result(Err(Error::Api {
            status: 500,
            message: "down".into(),
        }));
        type_text(&mut console, "2");
        console.apply_action(KeyAction::Submit);
        settle(&mut console).await;
        assert_eq!(last(&console).text, "down");
        assert_eq!(console.state(), ConnectionState::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_output_is_deduplicated_and_ordered() {
        let remote = Arc::new(FakeRemote::new());
        remote.push_page(Ok(Vec::new()));
        remote.push_page(Ok(vec![edge("3", "3"), edge("1", "1"), edge("2", "2")]));
        remote.push_page(Ok(vec![edge("2", "2"), edge("3", "3"), edge("4", "4")]));

        let mut console = console(&remote);
        connect(&mut console, &remote).await;

        while outputs(&console).len() < 4 {
            let event = console.next_event().await;
            console.apply_event(event);
        }
        assert_eq!(outputs(&console), vec!["1", "2", "3", "4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_before_connect_is_not_replayed() {
        let remote = Arc::new(FakeRemote::new());
        remote.push_page(Ok(vec![edge("1", "before connect")]));
        let mut fresh = edge("2", "after");
        fresh.output_prompt = Some("aos[1]> ".into());
        remote.push_page(Ok(vec![edge("1", "before connect"), fresh]));

        let mut console = console(&remote);
        connect(&mut console, &remote).await;
        while outputs(&console).is_empty() {
            let event = console.next_event().await;
            console.apply_event(event);
        }
        assert_eq!(outputs(&console), vec!["after"]);
        assert_eq!(console.prompt(), "aos[1]> ");
    }

    #[tokio::test(start_paused = true)]
    async fn test_own_results_are_not_shown_twice() {
        let remote = Arc::new(FakeRemote::new());
        remote.push_page(Ok(Vec::new()));
        remote.push_page(Ok(Vec::new()));
        let mut echoed = edge("5", "2");
        // handshake is msg-1, the command is msg-2
        echoed.message_id = Some("msg-2".into());
        remote.push_page(Ok(vec![echoed, edge("6", "tick")]));

        let mut console = console(&remote);
        connect(&mut console, &remote).await;
        remote.push_result(Ok(EvalResult {
            output_data: Some("2".into()),
            ..Default::default()
        }));
        type_text(&mut console, "1+1");
        console.apply_action(KeyAction::Submit);
        settle(&mut console).await;

        while outputs(&console).is_empty() {
            let event = console.next_event().await;
            console.apply_event(event);
        }
        assert_eq!(outputs(&console), vec!["tick"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polled_result_is_not_shown_again_by_eval() {
        let remote = Arc::new(FakeRemote::new());
        let mut console = console(&remote);
        connect(&mut console, &remote).await;

        remote.push_result(Ok(EvalResult {
            output_data: Some("2".into()),
            output_prompt: Some("aos[2]> ".into()),
            error: None,
        }));
        type_text(&mut console, "1+1");
        console.apply_action(KeyAction::Submit);

        let mut polled = edge("9", "2");
        polled.message_id = Some("msg-2".into());
        console.apply_event(ConsoleEvent::Poll(PollBatch {
            target: "proc-1".into(),
            entries: vec![polled],
        }));
        settle(&mut console).await;

        let shown: Vec<_> = console
            .transcript()
            .since(0)
            .iter()
            .filter(|e| e.text == "2")
            .map(|e| e.kind)
            .collect();
        assert_eq!(shown, vec![EntryKind::Output]);
        assert_eq!(console.state(), ConnectionState::Connected);
        assert_eq!(console.prompt(), "aos[2]> ");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_first_poll_loses_nothing() {
        let remote = Arc::new(FakeRemote::new());
        remote.push_page(Ok(vec![edge("1", "old")]));
        remote.push_page(Err(Error::Other("network down".into())));
        remote.push_page(Ok(vec![edge("1", "old"), edge("2", "printed after connect")]));
        remote.push_page(Ok(vec![edge("3", "later")]));

        let mut console = console(&remote);
        connect(&mut console, &remote).await;
        while outputs(&console).len() < 2 {
            let event = console.next_event().await;
            console.apply_event(event);
        }
        assert_eq!(outputs(&console), vec!["printed after connect", "later"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreadable_log_at_connect_still_delivers() {
        let remote = Arc::new(FakeRemote::new());
        remote.push_page(Err(Error::Other("network down".into())));
        remote.push_page(Ok(vec![edge("1", "printed after connect")]));
        remote.push_page(Ok(vec![edge("2", "later")]));

        let mut console = console(&remote);
        connect(&mut console, &remote).await;
        while outputs(&console).len() < 2 {
            let event = console.next_event().await;
            console.apply_event(event);
        }
        assert_eq!(outputs(&console), vec!["printed after connect", "later"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_target_resets_connection() {
        let remote = Arc::new(FakeRemote::new());
        let mut console = console(&remote);
        connect(&mut console, &remote).await;

        type_text(&mut console, "/target proc-2");
        console.apply_action(KeyAction::Submit);
        assert_eq!(console.target(), "proc-2");
        assert_eq!(console.state(), ConnectionState::Disconnected);
        assert_eq!(console.prompt(), "connect> ");
        assert!(console.poller.is_none());
    }

    #[tokio::test]
    async fn test_history_through_keys() {
        let remote = Arc::new(FakeRemote::new());
        let mut console = console(&remote);
        for line in ["/status", "/help", "/clear"] {
            type_text(&mut console, line);
            console.apply_action(KeyAction::Submit);
        }
        console.apply_action(KeyAction::HistoryUp);
        console.apply_action(KeyAction::HistoryUp);
        console.apply_action(KeyAction::HistoryUp);
        assert_eq!(console.buffer().text(), "/status");
        console.apply_action(KeyAction::HistoryUp);
        assert_eq!(console.buffer().text(), "/status");
    }

    #[tokio::test]
    async fn test_repaint_tracks_prompt_and_buffer() {
        let remote = Arc::new(FakeRemote::new());
        let mut console = console(&remote);
        let mut grid = GridSurface::new(12);
        type_text(&mut console, "abcdef");
        console.repaint(&mut grid).unwrap();
        assert_eq!(grid.lines(), vec!["connect> abc", "def"]);
        assert_eq!(grid.cursor(), (1, 3));
        assert!(console.redraw_state().wrapped);

        console.apply_action(KeyAction::MoveLeft);
        console.apply_action(KeyAction::MoveLeft);
        console.apply_action(KeyAction::MoveLeft);
        console.apply_action(KeyAction::MoveLeft);
        console.repaint(&mut grid).unwrap();
        assert_eq!(grid.cursor(), (0, 11));
    }
}
