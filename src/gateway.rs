//! The seam between fleet orchestration and the chain.
//!
//! [`LedgerGateway`] is what the rest of the crate talks to; [`AlloyGateway`] is
//! the JSON-RPC implementation. Signing happens locally with the derived key of
//! the sending account, so any fleet member can submit.

use std::future::Future;

use alloy::network::{Ethereum, EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::RpcError;
use url::Url;

use crate::contracts::{Erc20, Faucet};
use crate::errors::Error;
use crate::Result;

/// Fee and sequencing fields shared by every submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxParams {
    pub value: U256,
    pub gas_price: u128,
    pub gas_limit: u64,
    /// `None` lets the gateway use the sender's pending count.
    pub nonce: Option<u64>,
}

impl TxParams {
    pub fn new(gas_price: u128, gas_limit: u64) -> Self {
        Self {
            value: U256::ZERO,
            gas_price,
            gas_limit,
            nonce: None,
        }
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }
}

/// A submitted transaction that has not been confirmed yet.
pub trait PendingTransaction: Send {
    fn tx_hash(&self) -> TxHash;

    /// Resolves once the transaction is mined. A revert is an error.
    fn confirm(self) -> impl Future<Output = Result<TxHash>> + Send;
}

pub trait LedgerGateway: Send + Sync {
    type Pending: PendingTransaction;

    fn get_balance(&self, address: Address) -> impl Future<Output = Result<U256>> + Send;

    fn get_transaction_count(&self, address: Address) -> impl Future<Output = Result<u64>> + Send;

    fn submit_native_transfer(
        &self,
        from: &PrivateKeySigner,
        to: Address,
        params: TxParams,
    ) -> impl Future<Output = Result<Self::Pending>> + Send;

    fn submit_contract_call(
        &self,
        from: &PrivateKeySigner,
        contract: Address,
        calldata: Bytes,
        params: TxParams,
    ) -> impl Future<Output = Result<Self::Pending>> + Send;

    fn is_subscribed(
        &self,
        faucet: Address,
        account: Address,
    ) -> impl Future<Output = Result<bool>> + Send;

    fn subscription_cost(&self, faucet: Address) -> impl Future<Output = Result<U256>> + Send;

    fn token_balance(
        &self,
        token: Address,
        holder: Address,
    ) -> impl Future<Output = Result<U256>> + Send;
}

/// JSON-RPC gateway backed by an alloy HTTP provider.
#[derive(Clone)]
pub struct AlloyGateway {
    provider: DynProvider,
    chain_id: u64,
}

impl AlloyGateway {
    pub async fn connect(rpc_url: Url) -> Result<Self> {
        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
        let chain_id = provider.get_chain_id().await?;
        Ok(Self { provider, chain_id })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn sign_and_send(
        &self,
        from: &PrivateKeySigner,
        tx: TransactionRequest,
        params: TxParams,
    ) -> Result<AlloyPending> {
        let nonce = match params.nonce {
            Some(nonce) => nonce,
            None => self.get_transaction_count(from.address()).await?,
        };
        let tx = tx
            .with_from(from.address())
            .with_chain_id(self.chain_id)
            .with_value(params.value)
            .with_gas_price(params.gas_price)
            .with_gas_limit(params.gas_limit)
            .with_nonce(nonce);

        let wallet = EthereumWallet::from(from.clone());
        let envelope = tx.build(&wallet).await?;
        let pending = self
            .provider
            .send_tx_envelope(envelope)
            .await
            .map_err(|e| match e {
                // The node answered and refused this transaction.
                RpcError::ErrorResp(payload) => Error::Rejected(payload.message.to_string()),
                e => Error::Rpc(e),
            })?;
        Ok(AlloyPending { inner: pending })
    }
}

impl LedgerGateway for AlloyGateway {
    type Pending = AlloyPending;

    async fn get_balance(&self, address: Address) -> Result<U256> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn get_transaction_count(&self, address: Address) -> Result<u64> {
        Ok(self.provider.get_transaction_count(address).pending().await?)
    }

    async fn submit_native_transfer(
        &self,
        from: &PrivateKeySigner,
        to: Address,
        params: TxParams,
    ) -> Result<AlloyPending> {
        let tx = TransactionRequest::default().with_to(to);
        self.sign_and_send(from, tx, params).await
    }

    async fn submit_contract_call(
        &self,
        from: &PrivateKeySigner,
        contract: Address,
        calldata: Bytes,
        params: TxParams,
    ) -> Result<AlloyPending> {
        let tx = TransactionRequest::default()
            .with_to(contract)
            .with_input(calldata);
        self.sign_and_send(from, tx, params).await
    }

    async fn is_subscribed(&self, faucet: Address, account: Address) -> Result<bool> {
        let faucet = Faucet::new(faucet, self.provider.clone());
        Ok(faucet.isSubscribed(account).call().await?)
    }

    async fn subscription_cost(&self, faucet: Address) -> Result<U256> {
        let faucet = Faucet::new(faucet, self.provider.clone());
        Ok(faucet.subscriptionCost().call().await?)
    }

    async fn token_balance(&self, token: Address, holder: Address) -> Result<U256> {
        let token = Erc20::new(token, self.provider.clone());
        Ok(token.balanceOf(holder).call().await?)
    }
}

pub struct AlloyPending {
    inner: PendingTransactionBuilder<Ethereum>,
}

impl PendingTransaction for AlloyPending {
    fn tx_hash(&self) -> TxHash {
        *self.inner.tx_hash()
    }

    async fn confirm(self) -> Result<TxHash> {
        let receipt = self.inner.get_receipt().await?;
        let hash = ReceiptResponse::transaction_hash(&receipt);
        if ReceiptResponse::status(&receipt) {
            Ok(hash)
        } else {
            Err(Error::Reverted(hash))
        }
    }
}
