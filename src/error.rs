// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Editor error: {0}")]
    Editor(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns a concise message suitable for an inline transcript entry.
    /// For API errors, returns just the response body without the status prefix.
    /// If the message is JSON, it will be pretty-printed.
    pub(crate) fn tui_message(&self) -> String {
        match self {
            Error::Api { message, .. } => {
                if let Ok(json) = serde_json::from_str::<serde_json::Value>(message) {
                    serde_json::to_string_pretty(&json).unwrap_or_else(|_| message.clone())
                } else {
                    message.clone()
                }
            }
            other => other.to_string(),
        }
    }

    /// Transport-level failures worth retrying on the next poll.
    pub(crate) fn is_transient(&self) -> bool {
        match self {
            Error::Http(_) => true,
            Error::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

pub(crate) type Result<T> = std::result::Result<T, Error>;
