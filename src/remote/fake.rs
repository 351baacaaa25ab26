// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Scripted remote for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::{EvalResult, ListQuery, LogEdge, Remote};
use crate::error::{Error, Result};

#[derive(Default)]
pub(crate) struct FakeRemote {
    results: Mutex<VecDeque<Result<EvalResult>>>,
    pages: Mutex<VecDeque<Result<Vec<LogEdge>>>>,
    sent: Mutex<Vec<String>>,
    queries: Mutex<Vec<ListQuery>>,
}

impl FakeRemote {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_result(&self, result: Result<EvalResult>) {
        self.results.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_page(&self, page: Result<Vec<LogEdge>>) {
        self.pages.lock().unwrap().push_back(page);
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn queries(&self) -> Vec<ListQuery> {
        self.queries.lock().unwrap().clone()
    }
}

pub(crate) fn edge(cursor: &str, data: &str) -> LogEdge {
    LogEdge {
        cursor: cursor.to_string(),
        message_id: None,
        output_print: true,
        output_data: Some(data.to_string()),
        output_prompt: None,
    }
}

impl Remote for FakeRemote {
    async fn send_eval(&self, _target: &str, code: &str) -> Result<String> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(code.to_string());
        Ok(format!("msg-{}", sent.len()))
    }

    async fn fetch_result(&self, _target: &str, _message_id: &str) -> Result<EvalResult> {
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other("no scripted result".into())))
    }

    async fn list_results(&self, _target: &str, query: &ListQuery) -> Result<Vec<LogEdge>> {
        self.queries.lock().unwrap().push(query.clone());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
