//! Automation for a fleet of faucet bots derived from one seed phrase.
//!
//! Accounts are derived deterministically ([`keys`]), subscribed to and claimed
//! from the faucet in paced batches ([`dispatch`]) with precomputed nonces
//! ([`nonce`]), and rebalanced against the treasury at index 0 ([`rebalance`]).
//! Every run ends with a success/fail tally ([`settle`]).

pub mod army;
pub mod census;
pub mod config;
pub mod contracts;
pub mod dispatch;
pub mod errors;
pub mod gateway;
pub mod keys;
pub mod logging;
pub mod nonce;
pub mod notify;
pub mod rebalance;
pub mod settle;
pub mod shutdown;
pub mod token;
pub mod units;

pub use army::{AccountBalances, Army, GatherReport, RunReport};
pub use config::{Config, Network};
pub use errors::{Error, ErrorKind};
pub use gateway::{AlloyGateway, LedgerGateway, PendingTransaction, TxParams};
pub use keys::{Account, AccountIndex, Fleet, MasterSecret};
pub use settle::Settlement;
pub use shutdown::{Shutdown, ShutdownHandle};
pub use token::Token;

pub type Result<T> = std::result::Result<T, Error>;
