//! Decides which fleet accounts need a transfer to reach a target holding.
//!
//! Planning is pure: callers read balances first and hand them in as
//! [`Holding`]s. Index 0 is the treasury and never appears in a plan.

use alloy::primitives::U256;

use crate::keys::{AccountIndex, TREASURY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Treasury -> account.
    In,
    /// Account -> treasury, signed by the account.
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPlan {
    pub index: AccountIndex,
    pub direction: Direction,
    pub amount: U256,
}

/// Balances observed for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holding {
    pub index: AccountIndex,
    /// Balance of the token being rebalanced.
    pub token: U256,
    /// FSN balance, which pays the account's own gas.
    pub native: U256,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatherPlan {
    pub transfers: Vec<TransferPlan>,
    /// At or below target.
    pub no_surplus: usize,
    /// Above target but unable to pay for the outgoing transfer.
    pub insufficient_gas: usize,
}

impl GatherPlan {
    pub fn ignored(&self) -> usize {
        self.no_surplus + self.insufficient_gas
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rebalancer {
    target: U256,
    tolerance: U256,
}

impl Rebalancer {
    pub fn new(target: U256) -> Self {
        Self {
            target,
            tolerance: U256::ZERO,
        }
    }

    /// Differences up to `tolerance` are left alone.
    pub fn with_tolerance(mut self, tolerance: U256) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Tops every account below target back up to it.
    pub fn plan_distribute(&self, holdings: &[Holding]) -> Vec<TransferPlan> {
        holdings
            .iter()
            .filter(|h| h.index != TREASURY)
            .filter_map(|h| {
                let deficit = self.target.checked_sub(h.token)?;
                (deficit > self.tolerance).then_some(TransferPlan {
                    index: h.index,
                    direction: Direction::In,
                    amount: deficit,
                })
            })
            .collect()
    }

    /// Pulls everything above target back to the treasury.
    ///
    /// `gas_cost` is what one outgoing transfer costs the account. For FSN it is
    /// also kept back on top of the target so the account can pay for the
    /// transfer itself.
    pub fn plan_gather(&self, native_token: bool, gas_cost: U256, holdings: &[Holding]) -> GatherPlan {
        let mut plan = GatherPlan::default();

        for h in holdings.iter().filter(|h| h.index != TREASURY) {
            let surplus = h.token.saturating_sub(self.target);
            if surplus <= self.tolerance {
                plan.no_surplus += 1;
                continue;
            }

            let amount = if native_token {
                surplus.checked_sub(gas_cost).filter(|a| *a > self.tolerance)
            } else {
                (h.native >= gas_cost).then_some(surplus)
            };

            match amount {
                Some(amount) => plan.transfers.push(TransferPlan {
                    index: h.index,
                    direction: Direction::Out,
                    amount,
                }),
                None => plan.insufficient_gas += 1,
            }
        }

        plan
    }
}
