//! Paced batch submission.
//!
//! A run walks the window `[start, limit)` in batches of `batch_size`, one batch
//! per pacing tick. Every request in a batch is submitted concurrently; the
//! next batch is only built after the previous one has been handed to the
//! ledger. Confirmation is not awaited here, see [`crate::settle`].

use std::future::Future;
use std::ops::Range;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::{interval, MissedTickBehavior};

use crate::keys::AccountIndex;
use crate::logging::{log_json, LogEntry};
use crate::nonce::NonceAllocator;
use crate::shutdown::Shutdown;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Dispatching { batch: usize },
    Done,
}

/// Submission results grouped by batch, in dispatch order.
#[derive(Debug)]
pub struct Dispatched<P> {
    pub batches: Vec<Vec<Result<P>>>,
    /// Set when shutdown stopped the run before the last window.
    pub cancelled: bool,
}

impl<P> Dispatched<P> {
    pub fn submitted(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    batch_size: u32,
    pacing: Duration,
}

impl Dispatcher {
    pub fn new(batch_size: u32, pacing: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            pacing,
        }
    }

    /// Batch windows over `[start, limit)`. The last one may be short.
    pub fn windows(&self, start: AccountIndex, limit: AccountIndex) -> Vec<Range<AccountIndex>> {
        let mut windows = Vec::new();
        let mut batch_start = start;
        while batch_start < limit {
            let batch_end = limit.min(batch_start.saturating_add(self.batch_size));
            windows.push(batch_start..batch_end);
            batch_start = batch_end;
        }
        windows
    }

    /// Runs to completion unless `shutdown` fires. Submissions already made
    /// are returned either way so they can still be settled.
    pub async fn run<P, F, Fut>(
        &self,
        operation: &str,
        start: AccountIndex,
        limit: AccountIndex,
        nonces: NonceAllocator,
        shutdown: &Shutdown,
        submit: F,
    ) -> Dispatched<P>
    where
        F: Fn(AccountIndex, u64) -> Fut,
        Fut: Future<Output = Result<P>>,
    {
        let windows = self.windows(start, limit);
        let mut batches = Vec::with_capacity(windows.len());
        let mut cancelled = false;

        let mut ticker = interval(self.pacing);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut state = DispatchState::Idle;
        loop {
            state = match state {
                DispatchState::Idle if windows.is_empty() => DispatchState::Done,
                DispatchState::Idle => DispatchState::Dispatching { batch: 0 },
                DispatchState::Dispatching { batch } => {
                    let stop = tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => true,
                        _ = ticker.tick() => false,
                    };

                    if stop {
                        cancelled = true;
                        log_json(LogEntry::info("Dispatch cancelled, settling what was sent"));
                        DispatchState::Done
                    } else {
                        log_json(LogEntry::batch(operation, batch));
                        let requests = windows[batch]
                            .clone()
                            .enumerate()
                            .map(|(position, index)| submit(index, nonces.nonce(batch, position)));
                        batches.push(join_all(requests).await);

                        if batch + 1 == windows.len() {
                            DispatchState::Done
                        } else {
                            DispatchState::Dispatching { batch: batch + 1 }
                        }
                    }
                }
                DispatchState::Done => break,
            };
        }

        Dispatched { batches, cancelled }
    }
}
