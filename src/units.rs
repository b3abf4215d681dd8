//! Decimal argument parsing and conversion into on-chain units.

use std::str::FromStr;

use alloy::primitives::utils::{format_units, parse_units};
use alloy::primitives::U256;
use rust_decimal::Decimal;

use crate::errors::Error;
use crate::Result;

/// Parses a user supplied number, rejecting negatives and garbage.
pub fn parse_non_negative(name: &'static str, value: &str) -> Result<Decimal> {
    let invalid = || Error::InvalidArgument {
        name,
        value: value.to_string(),
    };
    let parsed = Decimal::from_str(value.trim()).map_err(|_| invalid())?;
    if parsed.is_sign_negative() && !parsed.is_zero() {
        return Err(invalid());
    }
    Ok(parsed)
}

/// Whole-number variant used for limits, indices and batch sizes.
pub fn parse_count(name: &'static str, value: &str) -> Result<u32> {
    value.trim().parse::<u32>().map_err(|_| Error::InvalidArgument {
        name,
        value: value.to_string(),
    })
}

/// 18-decimal token amount to wei.
pub fn ether_to_wei(amount: Decimal) -> Result<U256> {
    Ok(parse_units(&amount.normalize().to_string(), "ether")?.get_absolute())
}

/// Gas price given in gwei to wei per gas unit.
pub fn gwei_to_wei(gas_price: Decimal) -> Result<u128> {
    let wei = parse_units(&gas_price.normalize().to_string(), "gwei")?.get_absolute();
    u128::try_from(wei).map_err(|_| Error::InvalidArgument {
        name: "gasPrice",
        value: gas_price.to_string(),
    })
}

pub fn format_ether(amount: U256) -> String {
    format_units(amount, "ether").unwrap_or_else(|_| amount.to_string())
}

/// Fee for `gas_limit` units at `gas_price` wei each.
pub fn gas_cost(gas_price: u128, gas_limit: u64) -> U256 {
    U256::from(gas_price) * U256::from(gas_limit)
}
