// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Handshake and busy gating for a single remote target.

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ConnectionState {
    #[default]
    Disconnected,
    AwaitingFirstAck,
    Connected,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    HandshakeStarted,
    HandshakeSucceeded,
    HandshakeFailed,
    SendStarted,
    SendFinished,
    /// A new remote target was selected.
    Reset,
}

/// What pressing Enter should do in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubmitDecision {
    Handshake,
    Send,
    /// Nothing to send.
    Skip,
    /// Real input before the handshake has completed.
    NotConnected,
    /// A round trip is in flight.
    Drop,
}

impl ConnectionState {
    /// Whether key input is applied or dropped.
    pub(crate) fn accepts_input(self) -> bool {
        matches!(self, Self::Disconnected | Self::Connected)
    }

    pub(crate) fn decide(self, buffer_empty: bool) -> SubmitDecision {
        match (self, buffer_empty) {
            (Self::Disconnected, true) => SubmitDecision::Handshake,
            (Self::Disconnected, false) => SubmitDecision::NotConnected,
            (Self::Connected, true) => SubmitDecision::Skip,
            (Self::Connected, false) => SubmitDecision::Send,
            (Self::AwaitingFirstAck | Self::Busy, _) => SubmitDecision::Drop,
        }
    }

    /// Apply `transition`. Returns false, leaving the state untouched, when
    /// the transition is not valid from the current state.
    pub(crate) fn apply(&mut self, transition: Transition) -> bool {
        let next = match (*self, transition) {
            (_, Transition::Reset) => Self::Disconnected,
            (Self::Disconnected, Transition::HandshakeStarted) => Self::AwaitingFirstAck,
            (Self::AwaitingFirstAck, Transition::HandshakeSucceeded) => Self::Connected,
            (Self::AwaitingFirstAck, Transition::HandshakeFailed) => Self::Disconnected,
            (Self::Connected, Transition::SendStarted) => Self::Busy,
            (Self::Busy, Transition::SendFinished) => Self::Connected,
            (state, transition) => {
                debug!(?state, ?transition, "Ignoring invalid connection transition");
                return false;
            }
        };
        debug!(from = ?*self, to = ?next, ?transition, "Connection state change");
        *self = next;
        true
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::AwaitingFirstAck => "connecting",
            Self::Connected => "connected",
            Self::Busy => "busy",
        }
    }
}
