#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::TransportErrorKind;
use faucet_army::errors::Error;
use faucet_army::{Config, LedgerGateway, MasterSecret, PendingTransaction, Result, TxParams};
use tokio::time::Instant;

pub const MNEMONIC: &str = "test test test test test test test test test test test junk";

pub const ETHER: u128 = 1_000_000_000_000_000_000;

pub fn ether(n: u128) -> U256 {
    U256::from(n * ETHER)
}

pub fn config() -> Result<Config> {
    Ok(Config::new(MasterSecret::new(MNEMONIC)?)?
        .with_pacing(Duration::from_secs(1))
        .with_batch_size(5))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub from: Address,
    pub to: Address,
    pub calldata: Option<Bytes>,
    pub params: TxParams,
    pub at: Instant,
}

type Predicate = Box<dyn Fn(&Submission) -> bool + Send + Sync>;

/// In-memory ledger that records every submission.
#[derive(Default)]
pub struct StubGateway {
    pub balances: Mutex<HashMap<Address, U256>>,
    pub token_balances: Mutex<HashMap<(Address, Address), U256>>,
    pub subscribed: Mutex<HashSet<Address>>,
    pub tx_counts: Mutex<HashMap<Address, u64>>,
    pub subscription_cost: U256,
    pub submissions: Mutex<Vec<Submission>>,
    tx_count_failures: AtomicU32,
    reverts: Option<Predicate>,
    rejects: Option<Predicate>,
}

impl StubGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscription_cost(mut self, cost: U256) -> Self {
        self.subscription_cost = cost;
        self
    }

    /// The next `n` nonce lookups fail as if the node were unreachable.
    pub fn failing_tx_counts(self, n: u32) -> Self {
        self.tx_count_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Submissions matching `predicate` are accepted but revert on confirmation.
    pub fn reverting(mut self, predicate: impl Fn(&Submission) -> bool + Send + Sync + 'static) -> Self {
        self.reverts = Some(Box::new(predicate));
        self
    }

    /// Submissions matching `predicate` are refused outright.
    pub fn rejecting(mut self, predicate: impl Fn(&Submission) -> bool + Send + Sync + 'static) -> Self {
        self.rejects = Some(Box::new(predicate));
        self
    }

    pub fn set_balance(&self, address: Address, amount: U256) {
        self.balances.lock().unwrap().insert(address, amount);
    }

    pub fn set_token_balance(&self, token: Address, holder: Address, amount: U256) {
        self.token_balances.lock().unwrap().insert((token, holder), amount);
    }

    pub fn set_tx_count(&self, address: Address, count: u64) {
        self.tx_counts.lock().unwrap().insert(address, count);
    }

    pub fn subscribe_all(&self, addresses: impl IntoIterator<Item = Address>) {
        self.subscribed.lock().unwrap().extend(addresses);
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    fn record(&self, submission: Submission) -> Result<StubPending> {
        if self.rejects.as_ref().is_some_and(|p| p(&submission)) {
            return Err(Error::Rejected("replacement transaction underpriced".to_string()));
        }
        let reverts = self.reverts.as_ref().is_some_and(|p| p(&submission));

        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(submission);
        let seq = submissions.len() as u64;
        Ok(StubPending {
            hash: B256::left_padding_from(&seq.to_be_bytes()),
            reverts,
            hangs: false,
        })
    }
}

#[derive(Debug)]
pub struct StubPending {
    pub hash: TxHash,
    pub reverts: bool,
    pub hangs: bool,
}

impl StubPending {
    pub fn confirmed(seq: u64) -> Self {
        Self {
            hash: B256::left_padding_from(&seq.to_be_bytes()),
            reverts: false,
            hangs: false,
        }
    }

    pub fn reverted(seq: u64) -> Self {
        Self {
            reverts: true,
            ..Self::confirmed(seq)
        }
    }

    pub fn hanging(seq: u64) -> Self {
        Self {
            hangs: true,
            ..Self::confirmed(seq)
        }
    }
}

impl PendingTransaction for StubPending {
    fn tx_hash(&self) -> TxHash {
        self.hash
    }

    async fn confirm(self) -> Result<TxHash> {
        if self.hangs {
            std::future::pending::<()>().await;
        }
        if self.reverts {
            Err(Error::Reverted(self.hash))
        } else {
            Ok(self.hash)
        }
    }
}

impl LedgerGateway for StubGateway {
    type Pending = StubPending;

    async fn get_balance(&self, address: Address) -> Result<U256> {
        Ok(self.balances.lock().unwrap().get(&address).copied().unwrap_or_default())
    }

    async fn get_transaction_count(&self, address: Address) -> Result<u64> {
        let failing = self
            .tx_count_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::Rpc(TransportErrorKind::custom_str("connection reset")));
        }
        Ok(self.tx_counts.lock().unwrap().get(&address).copied().unwrap_or_default())
    }

    async fn submit_native_transfer(
        &self,
        from: &PrivateKeySigner,
        to: Address,
        params: TxParams,
    ) -> Result<StubPending> {
        self.record(Submission {
            from: from.address(),
            to,
            calldata: None,
            params,
            at: Instant::now(),
        })
    }

    async fn submit_contract_call(
        &self,
        from: &PrivateKeySigner,
        contract: Address,
        calldata: Bytes,
        params: TxParams,
    ) -> Result<StubPending> {
        self.record(Submission {
            from: from.address(),
            to: contract,
            calldata: Some(calldata),
            params,
            at: Instant::now(),
        })
    }

    async fn is_subscribed(&self, _faucet: Address, account: Address) -> Result<bool> {
        Ok(self.subscribed.lock().unwrap().contains(&account))
    }

    async fn subscription_cost(&self, _faucet: Address) -> Result<U256> {
        Ok(self.subscription_cost)
    }

    async fn token_balance(&self, token: Address, holder: Address) -> Result<U256> {
        Ok(self
            .token_balances
            .lock()
            .unwrap()
            .get(&(token, holder))
            .copied()
            .unwrap_or_default())
    }
}
