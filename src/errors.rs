use std::time::Duration;

use alloy::contract::Error as ContractError;
use alloy::network::{Ethereum, TransactionBuilderError};
use alloy::primitives::utils::UnitsError;
use alloy::primitives::{TxHash, U256};
use alloy::providers::PendingTransactionError;
use alloy::signers::local::LocalSignerError;
use alloy::transports::{RpcError, TransportErrorKind};
use thiserror::Error;

/// Coarse classification used to decide whether a failure aborts a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input or environment. Nothing was sent.
    Configuration,
    /// Ledger state rules out the whole operation. Nothing was sent.
    Precondition,
    /// A single transaction failed. Counted, never escalated.
    Transaction,
    /// The RPC endpoint could not be reached or answered with garbage.
    Connectivity,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("MNEMONIC is not set")]
    MissingSecret,
    #[error(transparent)]
    LocalSigner(#[from] LocalSignerError),
    #[error("invalid argument {name}: \"{value}\" must be a non-negative number")]
    InvalidArgument { name: &'static str, value: String },
    #[error("token must be \"FSN\", \"FREE\", or \"FMN\", got \"{0}\"")]
    UnknownToken(String),
    #[error("network must be \"mainnet\" or \"testnet\", got \"{0}\"")]
    UnknownNetwork(String),
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
    #[error(transparent)]
    Units(#[from] UnitsError),

    #[error("insufficient balance on account {index}: need {required} wei, have {available} wei")]
    InsufficientBalance {
        index: u32,
        required: U256,
        available: U256,
    },
    #[error("insufficient FSN gas on account {index}: need {required} wei, have {available} wei")]
    InsufficientGas {
        index: u32,
        required: U256,
        available: U256,
    },
    #[error("only {subscribed} bots are subscribed, {required} required")]
    NotEnoughSubscribed { subscribed: u32, required: u32 },
    #[error("this army has {subscribed} bots already subscribed, cannot subscribe up to {limit}")]
    AlreadySubscribed { subscribed: u32, limit: u32 },
    #[error("operation needs at least {0} accounts")]
    EmptyFleet(u32),

    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    #[error("transaction rejected: {0}")]
    Rejected(String),
    #[error("no receipt for {hash} after {timeout:?}")]
    ConfirmationTimeout { hash: TxHash, timeout: Duration },
    #[error(transparent)]
    PendingTransaction(#[from] PendingTransactionError),
    #[error(transparent)]
    TransactionBuilder(#[from] TransactionBuilderError<Ethereum>),

    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError<TransportErrorKind>),
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingSecret
            | Error::LocalSigner(_)
            | Error::InvalidArgument { .. }
            | Error::UnknownToken(_)
            | Error::UnknownNetwork(_)
            | Error::UrlParse(_)
            | Error::Units(_) => ErrorKind::Configuration,
            Error::InsufficientBalance { .. }
            | Error::InsufficientGas { .. }
            | Error::NotEnoughSubscribed { .. }
            | Error::AlreadySubscribed { .. }
            | Error::EmptyFleet(_) => ErrorKind::Precondition,
            Error::Reverted(_)
            | Error::Rejected(_)
            | Error::ConfirmationTimeout { .. }
            | Error::PendingTransaction(_)
            | Error::TransactionBuilder(_) => ErrorKind::Transaction,
            Error::Rpc(_) | Error::Contract(_) => ErrorKind::Connectivity,
        }
    }

    /// True for errors that must stop an operation before anything is dispatched.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Configuration | ErrorKind::Precondition
        )
    }
}
