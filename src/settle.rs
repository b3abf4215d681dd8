//! Turns pending handles into a success/fail tally.
//!
//! Every handle is awaited on its own; a revert, rejection or timeout is
//! counted as a failure and never stops its siblings.

use std::ops::AddAssign;
use std::time::Duration;

use alloy::primitives::TxHash;
use futures::future::join_all;
use serde::Serialize;

use crate::errors::Error;
use crate::gateway::PendingTransaction;
use crate::logging::{log_json, LogEntry};
use crate::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub success: usize,
    pub fail: usize,
}

impl Settlement {
    pub fn total(&self) -> usize {
        self.success + self.fail
    }

    fn record(&mut self, outcome: &Result<TxHash>) {
        match outcome {
            Ok(_) => self.success += 1,
            Err(e) => {
                self.fail += 1;
                log_json(LogEntry::warn("Transaction failed", e));
            }
        }
    }
}

impl AddAssign for Settlement {
    fn add_assign(&mut self, rhs: Self) {
        self.success += rhs.success;
        self.fail += rhs.fail;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    timeout: Option<Duration>,
}

impl Resolver {
    /// `timeout` bounds each receipt wait; `None` waits as long as the gateway does.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Settles batch by batch. Handles within a batch are awaited concurrently.
    pub async fn resolve_batches<P: PendingTransaction>(&self, batches: Vec<Vec<Result<P>>>) -> Settlement {
        log_json(LogEntry::info("Resolving requests"));
        let mut settlement = Settlement::default();
        for batch in batches {
            settlement += self.settle(batch).await;
        }
        settlement
    }

    /// Settles an unbatched list in one concurrent wait.
    pub async fn resolve_all<P: PendingTransaction>(&self, pending: Vec<Result<P>>) -> Settlement {
        log_json(LogEntry::info("Resolving requests"));
        self.settle(pending).await
    }

    async fn settle<P: PendingTransaction>(&self, pending: Vec<Result<P>>) -> Settlement {
        let outcomes = join_all(pending.into_iter().map(|p| self.confirm(p))).await;
        let mut settlement = Settlement::default();
        for outcome in &outcomes {
            settlement.record(outcome);
        }
        settlement
    }

    /// Waits for one handle, honouring the timeout.
    pub async fn confirm<P: PendingTransaction>(&self, pending: Result<P>) -> Result<TxHash> {
        let pending = pending?;
        let Some(timeout) = self.timeout else {
            return pending.confirm().await;
        };
        let hash = pending.tx_hash();
        tokio::time::timeout(timeout, pending.confirm())
            .await
            .map_err(|_| Error::ConfirmationTimeout { hash, timeout })?
    }
}
