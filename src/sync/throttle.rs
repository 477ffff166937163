//! Bounded-concurrency task runner
//!
//! [`RequestController`] starts queued async operations in order, keeping at
//! most `limit` of them in flight. Whenever one settles the next queued task is
//! started, until the queue is empty or [`RequestController::stop`] is called.
//! Task failures are contained: they are logged and counted, never propagated.

use crate::error::{DeckError, DeckResult};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Outcome counts of one [`RequestController::run_tasks`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub started: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Tasks never started because the controller was stopped
    pub skipped: usize,
}

/// Shared throttler with a one-way stop flag
///
/// Clones share the flag, so one clone can stop batches driven by another.
#[derive(Debug, Clone, Default)]
pub struct RequestController {
    stopped: Arc<AtomicBool>,
}

impl RequestController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prevent any further task starts. Idempotent.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            tracing::debug!("Request controller stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Run `tasks` with at most `limit` in flight
    ///
    /// Resolves once every started task has settled. Returns `InvalidArgument`
    /// when `limit` is zero; a limit above the task count runs everything at once.
    pub async fn run_tasks<F, Fut, T, E>(
        &self,
        tasks: Vec<F>,
        limit: usize,
    ) -> DeckResult<BatchReport>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        if limit == 0 {
            return Err(DeckError::invalid("concurrency limit must be at least 1"));
        }

        let total = tasks.len();
        let mut report = BatchReport::default();
        if total == 0 {
            return Ok(report);
        }

        let mut queue = tasks.into_iter();
        let mut in_flight = FuturesUnordered::new();

        self.fill(&mut queue, &mut in_flight, limit, &mut report);

        while let Some(result) = in_flight.next().await {
            match result {
                Ok(_) => report.succeeded += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::debug!("Throttled task failed: {}", e);
                }
            }
            self.fill(&mut queue, &mut in_flight, limit, &mut report);
        }

        report.skipped = total - report.started;
        if report.skipped > 0 {
            tracing::debug!(
                "Request batch ended early: {} of {} tasks skipped",
                report.skipped,
                total
            );
        }
        Ok(report)
    }

    fn fill<F, Fut>(
        &self,
        queue: &mut impl Iterator<Item = F>,
        in_flight: &mut FuturesUnordered<Fut>,
        limit: usize,
        report: &mut BatchReport,
    ) where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        while in_flight.len() < limit && !self.is_stopped() {
            match queue.next() {
                Some(task) => {
                    in_flight.push(task());
                    report.started += 1;
                }
                None => break,
            }
        }
    }
}
