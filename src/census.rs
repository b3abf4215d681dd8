//! Counts how many fleet accounts the faucet already knows about.
//!
//! Subscriptions are handed out from index 0 upwards, so the scan walks pages of
//! [`PAGE_SIZE`] addresses and stops at the first page that is not fully
//! subscribed. The result is the length of that contiguous prefix plus the hits
//! on the first short page; subscriptions further out are not seen.

use std::future::Future;

use alloy::primitives::Address;
use futures::future::try_join_all;

use crate::keys::AccountIndex;
use crate::Result;

pub const PAGE_SIZE: u32 = 10;

/// Scans at most `pages` pages. Each page's lookups run concurrently.
pub async fn count_subscribed<A, F, Fut>(pages: u32, address_at: A, is_subscribed: F) -> Result<u32>
where
    A: Fn(AccountIndex) -> Result<Address>,
    F: Fn(Address) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let mut total = 0;

    for page in 0..pages {
        let start = page * PAGE_SIZE;
        let addresses = (start..start + PAGE_SIZE)
            .map(&address_at)
            .collect::<Result<Vec<_>>>()?;

        let results = try_join_all(addresses.into_iter().map(&is_subscribed)).await?;
        let subscribed = results.iter().filter(|s| **s).count() as u32;
        total += subscribed;

        if subscribed < PAGE_SIZE {
            break;
        }
    }

    Ok(total)
}
