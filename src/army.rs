//! Fleet-wide operations built from derivation, census, dispatch, settlement
//! and rebalancing.

use alloy::primitives::{Address, TxHash, U256};
use futures::future::{join_all, try_join_all};

use crate::census;
use crate::config::{Config, GAS_LIMIT, GAS_RESERVE};
use crate::contracts::{claim_calldata, subscribe_calldata, transfer_calldata};
use crate::dispatch::Dispatcher;
use crate::errors::Error;
use crate::gateway::{LedgerGateway, TxParams};
use crate::keys::{Account, AccountIndex, Fleet, TREASURY};
use crate::logging::{log_json, log_json_with_file, LogEntry};
use crate::nonce::NonceAllocator;
use crate::notify::{format_summary_alert, Notifier};
use crate::rebalance::{Holding, Rebalancer};
use crate::settle::{Resolver, Settlement};
use crate::shutdown::Shutdown;
use crate::token::Token;
use crate::units::{format_ether, gas_cost};
use crate::Result;

/// Outcome of a paced subscribe or claim run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub settlement: Settlement,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatherReport {
    pub settlement: Settlement,
    pub no_surplus: usize,
    pub insufficient_gas: usize,
}

impl GatherReport {
    pub fn ignored(&self) -> usize {
        self.no_surplus + self.insufficient_gas
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountBalances {
    pub index: AccountIndex,
    pub address: Address,
    pub fsn: U256,
    pub free: U256,
    pub fmn: U256,
}

pub struct Army<G> {
    config: Config,
    fleet: Fleet,
    gateway: G,
    notifier: Option<Notifier>,
}

impl<G: LedgerGateway> Army<G> {
    pub fn new(config: Config, gateway: G) -> Self {
        let fleet = Fleet::new(config.secret.clone());
        let notifier = config.webhook.clone().map(Notifier::new);
        Self {
            config,
            fleet,
            gateway,
            notifier,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.config.batch_size, self.config.pacing)
    }

    fn rebalancer(&self, target: U256) -> Rebalancer {
        Rebalancer::new(target).with_tolerance(self.config.tolerance)
    }

    fn resolver(&self) -> Resolver {
        Resolver::new(self.config.confirmation_timeout)
    }

    /// Length of the subscribed prefix, scanning at most `pages` pages of ten.
    pub async fn count_subscribed(&self, pages: u32) -> Result<u32> {
        let faucet = self.config.network.faucet;
        census::count_subscribed(
            pages,
            |index| self.fleet.address(index),
            |address| self.gateway.is_subscribed(faucet, address),
        )
        .await
    }

    /// Subscribes accounts `[subscribed, limit)`, paying from the treasury.
    pub async fn subscribe(&self, limit: u32, shutdown: &Shutdown) -> Result<RunReport> {
        let faucet = self.config.network.faucet;
        let treasury = self.fleet.treasury()?;
        let addresses = self.fleet.derive_public_batch(limit)?;

        let subscribed = self.count_subscribed(limit).await?;
        if limit < subscribed {
            return Err(Error::AlreadySubscribed { subscribed, limit });
        }

        let base = self.gateway.get_transaction_count(treasury.address()).await?;
        let cost = self.gateway.subscription_cost(faucet).await?;
        let balance = self.gateway.get_balance(treasury.address()).await?;
        let required = cost * U256::from(limit - subscribed) + GAS_RESERVE;
        if required >= balance {
            return Err(Error::InsufficientBalance {
                index: TREASURY,
                required,
                available: balance,
            });
        }

        let params = TxParams::new(self.config.gas_price, GAS_LIMIT).value(cost);
        let nonces = NonceAllocator::new(base, self.config.batch_size);
        let (gateway, treasury, addresses) = (&self.gateway, &treasury, &addresses);

        let dispatched = self
            .dispatcher()
            .run("subscribe", subscribed, limit, nonces, shutdown, move |index, nonce| {
                let account = addresses[index as usize];
                log_json(
                    LogEntry::tx("subscribe", index, account, Some(nonce)).with_value(format_ether(cost)),
                );
                gateway.submit_contract_call(
                    &treasury.signer,
                    faucet,
                    subscribe_calldata(account),
                    params.nonce(nonce),
                )
            })
            .await;

        let settlement = self.resolver().resolve_batches(dispatched.batches).await;
        self.report("subscribe", settlement, None);
        Ok(RunReport {
            settlement,
            cancelled: dispatched.cancelled,
        })
    }

    /// Claims for accounts `[0, limit)`, gas paid by the treasury.
    pub async fn claim(&self, limit: u32, shutdown: &Shutdown) -> Result<RunReport> {
        let faucet = self.config.network.faucet;
        let treasury = self.fleet.treasury()?;
        let addresses = self.fleet.derive_public_batch(limit)?;

        let subscribed = self.count_subscribed(limit).await?;
        if subscribed < limit {
            return Err(Error::NotEnoughSubscribed {
                subscribed,
                required: limit,
            });
        }

        let base = self.gateway.get_transaction_count(treasury.address()).await?;
        let balance = self.gateway.get_balance(treasury.address()).await?;
        if balance < GAS_RESERVE {
            return Err(Error::InsufficientGas {
                index: TREASURY,
                required: GAS_RESERVE,
                available: balance,
            });
        }

        let params = TxParams::new(self.config.gas_price, GAS_LIMIT);
        let nonces = NonceAllocator::new(base, self.config.batch_size);
        let (gateway, treasury, addresses) = (&self.gateway, &treasury, &addresses);

        let dispatched = self
            .dispatcher()
            .run("claim", 0, limit, nonces, shutdown, move |index, nonce| {
                let account = addresses[index as usize];
                log_json(LogEntry::tx("claim", index, account, Some(nonce)));
                gateway.submit_contract_call(
                    &treasury.signer,
                    faucet,
                    claim_calldata(account),
                    params.nonce(nonce),
                )
            })
            .await;

        let settlement = self.resolver().resolve_batches(dispatched.batches).await;
        self.report("claim", settlement, None);
        Ok(RunReport {
            settlement,
            cancelled: dispatched.cancelled,
        })
    }

    /// Claims now and again every claim interval until `shutdown` fires.
    ///
    /// A precondition failure ends the loop. Connectivity and transaction
    /// errors only skip the round.
    pub async fn claim_forever(&self, limit: u32, shutdown: &Shutdown) -> Result<()> {
        loop {
            match self.claim(limit, shutdown).await {
                Ok(report) if report.cancelled => return Ok(()),
                Ok(_) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => log_json(LogEntry::error("Claim round failed, retrying next interval", &e)),
            }
            if shutdown.is_cancelled() {
                return Ok(());
            }

            let interval = self.config.claim_interval;
            let next = chrono::Local::now() + chrono::TimeDelta::from_std(interval).unwrap_or(chrono::TimeDelta::zero());
            log_json(LogEntry::info(&format!(
                "Waiting until {} for next claim",
                next.format("%Y-%m-%d, %H:%M:%S")
            )));

            tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    /// FSN, FREE and FMN holdings of accounts `[0, limit)`.
    pub async fn balances(&self, limit: u32) -> Result<Vec<AccountBalances>> {
        let network = self.config.network;
        let addresses = self.fleet.derive_public_batch(limit)?;

        try_join_all(addresses.into_iter().zip(0..).map(|(address, index)| async move {
            let (fsn, free, fmn) = tokio::try_join!(
                self.gateway.get_balance(address),
                self.gateway.token_balance(network.free, address),
                self.gateway.token_balance(network.fmn, address),
            )?;
            Ok::<_, Error>(AccountBalances {
                index,
                address,
                fsn,
                free,
                fmn,
            })
        }))
        .await
    }

    /// Moves `amount` of `token` between two fleet accounts and waits for it.
    pub async fn transfer(&self, token: Token, amount: U256, to: AccountIndex, from: AccountIndex) -> Result<TxHash> {
        let sender = self.fleet.derive(from)?;
        let recipient = self.fleet.address(to)?;
        let gas = gas_cost(self.config.gas_price, token.transfer_gas_limit());
        let native = self.gateway.get_balance(sender.address()).await?;

        let held = match token.contract(&self.config.network) {
            None => native,
            Some(contract) => self.gateway.token_balance(contract, sender.address()).await?,
        };
        if held < amount {
            return Err(Error::InsufficientBalance {
                index: from,
                required: amount,
                available: held,
            });
        }
        let spendable = if token.is_native() { native - amount } else { native };
        if spendable < gas {
            return Err(Error::InsufficientGas {
                index: from,
                required: gas,
                available: spendable,
            });
        }

        log_json(LogEntry::tx("transfer", from, recipient, None).with_value(format_ether(amount)));
        let pending = self.submit_transfer(token, &sender, recipient, amount, None).await?;
        self.resolver().confirm(Ok(pending)).await
    }

    /// Tops up accounts `[1, limit)` to `target` from the treasury.
    pub async fn distribute(&self, token: Token, target: U256, limit: u32) -> Result<Settlement> {
        ensure_recipients(limit)?;
        let subscribed = self.count_subscribed(limit).await?;
        if subscribed < limit {
            return Err(Error::NotEnoughSubscribed {
                subscribed,
                required: limit,
            });
        }

        let treasury = self.fleet.treasury()?;
        let accounts = self.fleet.accounts(1..limit)?;
        let base = self.gateway.get_transaction_count(treasury.address()).await?;

        let holdings = self.holdings(token, &accounts).await?;
        let plans = self.rebalancer(target).plan_distribute(&holdings);

        let gas_total = gas_cost(self.config.gas_price, token.transfer_gas_limit()) * U256::from(plans.len());
        let moved = plans.iter().fold(U256::ZERO, |sum, p| sum + p.amount);
        let native = self.gateway.get_balance(treasury.address()).await?;
        match token.contract(&self.config.network) {
            None if native < moved + gas_total => {
                return Err(Error::InsufficientBalance {
                    index: TREASURY,
                    required: moved + gas_total,
                    available: native,
                });
            }
            Some(contract) => {
                let held = self.gateway.token_balance(contract, treasury.address()).await?;
                if held < moved {
                    return Err(Error::InsufficientBalance {
                        index: TREASURY,
                        required: moved,
                        available: held,
                    });
                }
                if native < gas_total {
                    return Err(Error::InsufficientGas {
                        index: TREASURY,
                        required: gas_total,
                        available: native,
                    });
                }
            }
            None => {}
        }

        let nonces = NonceAllocator::new(base, self.config.batch_size);
        let pending = join_all(plans.iter().enumerate().map(|(offset, plan)| {
            let to = accounts[(plan.index - 1) as usize].address();
            let nonce = nonces.sequential(offset);
            log_json(LogEntry::tx("distribute", plan.index, to, Some(nonce)).with_value(format_ether(plan.amount)));
            self.submit_transfer(token, &treasury, to, plan.amount, Some(nonce))
        }))
        .await;

        let settlement = self.resolver().resolve_all(pending).await;
        self.report("distribute", settlement, None);
        Ok(settlement)
    }

    /// Sends everything above `target` on accounts `[1, limit)` back to the
    /// treasury, each account signing its own transfer.
    pub async fn gather(&self, token: Token, target: U256, limit: u32) -> Result<GatherReport> {
        ensure_recipients(limit)?;
        let treasury = self.fleet.address(TREASURY)?;
        let accounts = self.fleet.accounts(1..limit)?;

        let holdings = self.holdings(token, &accounts).await?;
        let gas = gas_cost(self.config.gas_price, token.transfer_gas_limit());
        let plan = self.rebalancer(target).plan_gather(token.is_native(), gas, &holdings);

        let pending = join_all(plan.transfers.iter().map(|t| {
            let account = &accounts[(t.index - 1) as usize];
            log_json(LogEntry::tx("gather", t.index, account.address(), None).with_value(format_ether(t.amount)));
            self.submit_transfer(token, account, treasury, t.amount, None)
        }))
        .await;

        let settlement = self.resolver().resolve_all(pending).await;
        let report = GatherReport {
            settlement,
            no_surplus: plan.no_surplus,
            insufficient_gas: plan.insufficient_gas,
        };
        self.report("gather", settlement, Some(report.ignored()));
        Ok(report)
    }

    async fn holdings(&self, token: Token, accounts: &[Account]) -> Result<Vec<Holding>> {
        let contract = token.contract(&self.config.network);
        try_join_all(accounts.iter().map(|account| async move {
            let address = account.address();
            let native = self.gateway.get_balance(address).await?;
            let held = match contract {
                None => native,
                Some(contract) => self.gateway.token_balance(contract, address).await?,
            };
            Ok::<_, Error>(Holding {
                index: account.index,
                token: held,
                native,
            })
        }))
        .await
    }

    async fn submit_transfer(
        &self,
        token: Token,
        from: &Account,
        to: Address,
        amount: U256,
        nonce: Option<u64>,
    ) -> Result<G::Pending> {
        let mut params = TxParams::new(self.config.gas_price, token.transfer_gas_limit());
        params.nonce = nonce;
        match token.contract(&self.config.network) {
            None => {
                self.gateway
                    .submit_native_transfer(&from.signer, to, params.value(amount))
                    .await
            }
            Some(contract) => {
                self.gateway
                    .submit_contract_call(&from.signer, contract, transfer_calldata(to, amount), params)
                    .await
            }
        }
    }

    fn report(&self, operation: &str, settlement: Settlement, ignored: Option<usize>) {
        let mut entry = LogEntry::summary(operation, settlement.success, settlement.fail);
        if let Some(ignored) = ignored {
            entry = entry.with_ignored(ignored);
        }
        log_json_with_file(&entry, self.config.journal.as_deref());

        if let Some(notifier) = &self.notifier {
            notifier.send_alert(format_summary_alert(operation, &settlement, ignored));
        }
    }
}

/// Rebalancing needs the treasury plus at least one other account.
fn ensure_recipients(limit: u32) -> Result<()> {
    if limit < 2 {
        return Err(Error::EmptyFleet(2));
    }
    Ok(())
}
