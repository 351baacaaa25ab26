// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Background discovery of output the remote process produces on its own.
//!
//! The poller owns the pagination cursor and does the network work. It hands
//! ordered batches to the console, which owns the [`SeenSet`] and decides what
//! is rendered. That keeps the transcript single-owner: the poller never
//! touches it.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::Result;
use crate::remote::{ListQuery, LogEdge, Remote, SortOrder, Variant, compare_cursors};

pub(crate) const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);
pub(crate) const DEFAULT_LIMIT: usize = 1000;

#[derive(Debug, Clone, Copy)]
pub(crate) struct PollerConfig {
    pub interval: Duration,
    pub limit: usize,
    pub variant: Variant,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            limit: DEFAULT_LIMIT,
            variant: Variant::default(),
        }
    }
}

/// Printable entries from one poll, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PollBatch {
    pub target: String,
    pub entries: Vec<LogEdge>,
}

/// The newest page of the log at connect time. Its entries are marked seen
/// and polling resumes after its cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PollSeed {
    pub cursor: Option<String>,
    pub entries: Vec<LogEdge>,
}

/// Read where the log stands, so output written before the session opened
/// is not replayed.
pub(crate) async fn seed<R: Remote>(
    remote: &R,
    target: &str,
    config: PollerConfig,
) -> Result<PollSeed> {
    let query = ListQuery {
        sort: SortOrder::Descending,
        limit: config.limit,
        from: None,
    };
    let mut entries = remote.list_results(target, &query).await?;
    sort_edges(&mut entries, config.variant);
    let cursor = entries.last().map(|edge| edge.cursor.clone());
    entries.retain(LogEdge::is_printable);
    Ok(PollSeed { cursor, entries })
}

/// Ids already shown in the transcript. Never used for ordering.
#[derive(Debug, Default)]
pub(crate) struct SeenSet {
    ids: HashSet<String>,
}

impl SeenSet {
    /// Returns true if `id` was not seen before.
    pub(crate) fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    pub(crate) fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Sort edges oldest first.
pub(crate) fn sort_edges(edges: &mut [LogEdge], variant: Variant) {
    edges.sort_by(|a, b| compare_cursors(variant, &a.cursor, &b.cursor));
}

/// Stops the poller when dropped.
pub(crate) struct PollerHandle {
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.task.abort();
    }
}

pub(crate) struct ResultStreamPoller<R: Remote> {
    remote: Arc<R>,
    target: String,
    config: PollerConfig,
    cursor: Option<String>,
    cancelled: Arc<AtomicBool>,
    tx: mpsc::UnboundedSender<PollBatch>,
}

impl<R: Remote> ResultStreamPoller<R> {
    /// Without a `cursor` the first request reads the newest page.
    pub(crate) fn new(
        remote: Arc<R>,
        target: String,
        config: PollerConfig,
        cursor: Option<String>,
        tx: mpsc::UnboundedSender<PollBatch>,
    ) -> Self {
        Self {
            remote,
            target,
            config,
            cursor,
            cancelled: Arc::new(AtomicBool::new(false)),
            tx,
        }
    }

    pub(crate) fn spawn(self) -> PollerHandle {
        let cancelled = Arc::clone(&self.cancelled);
        let task = tokio::spawn(self.run());
        PollerHandle { cancelled, task }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst) || self.tx.is_closed()
    }

    async fn run(mut self) {
        debug!(process = %self.target, "Result poller started");
        loop {
            if self.is_cancelled() {
                break;
            }
            match self.poll_once().await {
                Ok(entries) if entries.is_empty() => {}
                Ok(entries) => {
                    let batch = PollBatch {
                        target: self.target.clone(),
                        entries,
                    };
                    if self.tx.send(batch).is_err() {
                        break;
                    }
                }
                Err(e) if e.is_transient() => {
                    warn!(process = %self.target, error = %e, "Result poll failed; retrying")
                }
                Err(e) => error!(process = %self.target, error = %e, "Result poll failed"),
            }
            if self.is_cancelled() {
                break;
            }
            tokio::time::sleep(self.config.interval).await;
        }
        debug!(process = %self.target, "Result poller stopped");
    }

    /// One request: fetch, order, advance the cursor and keep what can be
    /// printed. On error the cursor is left where it was.
    pub(crate) async fn poll_once(&mut self) -> Result<Vec<LogEdge>> {
        let query = match &self.cursor {
            None => ListQuery {
                sort: SortOrder::Descending,
                limit: self.config.limit,
                from: None,
            },
            Some(cursor) => ListQuery {
                sort: SortOrder::Ascending,
                limit: self.config.limit,
                from: Some(cursor.clone()),
            },
        };

        let mut edges = self.remote.list_results(&self.target, &query).await?;
        sort_edges(&mut edges, self.config.variant);

        if let Some(newest) = edges.last() {
            let newer = match &self.cursor {
                Some(current) => {
                    compare_cursors(self.config.variant, &newest.cursor, current).is_gt()
                }
                None => true,
            };
            if newer {
                self.cursor = Some(newest.cursor.clone());
            }
        }

        edges.retain(LogEdge::is_printable);
        Ok(edges)
    }

    #[cfg(test)]
    pub(crate) fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }
}
