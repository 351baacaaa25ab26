// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Calls the console makes against a remote compute process.

pub(crate) mod cursor;
mod http;

#[cfg(test)]
pub(crate) mod fake;

use std::future::Future;

use crate::error::Result;

pub(crate) use cursor::{Variant, compare_cursors};
pub(crate) use http::HttpRemote;

/// Result of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct EvalResult {
    pub output_data: Option<String>,
    pub output_prompt: Option<String>,
    pub error: Option<String>,
}

/// One entry of the remote result log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LogEdge {
    pub cursor: String,
    /// Id of the message that produced this entry, when the network reports it
    pub message_id: Option<String>,
    pub output_print: bool,
    pub output_data: Option<String>,
    pub output_prompt: Option<String>,
}

impl LogEdge {
    /// Id used for deduplication.
    pub(crate) fn id(&self) -> &str {
        self.message_id.as_deref().unwrap_or(&self.cursor)
    }

    pub(crate) fn is_printable(&self) -> bool {
        self.output_print && self.output_data.as_deref().is_some_and(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListQuery {
    pub sort: SortOrder,
    pub limit: usize,
    pub from: Option<String>,
}

/// The two-step eval RPC and the result log feed.
pub(crate) trait Remote: Send + Sync + 'static {
    /// Submit `code` for evaluation; returns the id of the sent message.
    fn send_eval(&self, target: &str, code: &str) -> impl Future<Output = Result<String>> + Send;

    fn fetch_result(
        &self,
        target: &str,
        message_id: &str,
    ) -> impl Future<Output = Result<EvalResult>> + Send;

    fn list_results(
        &self,
        target: &str,
        query: &ListQuery,
    ) -> impl Future<Output = Result<Vec<LogEdge>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(cursor: &str) -> LogEdge {
        LogEdge {
            cursor: cursor.to_string(),
            message_id: None,
            output_print: true,
            output_data: Some("x".to_string()),
            output_prompt: None,
        }
    }

    #[test]
    fn test_edge_id_prefers_message_id() {
        let mut e = edge("c1");
        assert_eq!(e.id(), "c1");
        e.message_id = Some("m1".to_string());
        assert_eq!(e.id(), "m1");
    }

    #[test]
    fn test_printable_requires_print_and_data() {
        let mut e = edge("c1");
        assert!(e.is_printable());
        e.output_data = Some(String::new());
        assert!(!e.is_printable());
        e.output_data = Some("x".to_string());
        e.output_print = false;
        assert!(!e.is_printable());
    }
}
