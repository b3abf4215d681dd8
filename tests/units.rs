use std::str::FromStr as _;

use alloy::primitives::U256;
use faucet_army::config::{Network, GAS_LIMIT, GAS_LIMIT_TX};
use faucet_army::errors::Error;
use faucet_army::units::{ether_to_wei, format_ether, gas_cost, gwei_to_wei, parse_count, parse_non_negative};
use faucet_army::{ErrorKind, Result, Token};
use rust_decimal_macros::dec;

#[test]
fn parse_non_negative_should_accept_decimals_and_zero() -> Result<()> {
    assert_eq!(parse_non_negative("amount", "1.5")?, dec!(1.5));
    assert_eq!(parse_non_negative("amount", " 0 ")?, dec!(0));

    Ok(())
}

#[test]
fn parse_non_negative_should_reject_negative_and_garbage() {
    for value in ["-1", "abc", "", "1.2.3"] {
        let err = parse_non_negative("amount", value).unwrap_err();
        assert!(
            matches!(&err, Error::InvalidArgument { name: "amount", value: v } if v == value),
            "{value}: {err}"
        );
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}

#[test]
fn parse_count_should_reject_fractions() -> Result<()> {
    assert_eq!(parse_count("limit", "42")?, 42);
    assert!(parse_count("limit", "4.2").is_err());
    assert!(parse_count("limit", "-3").is_err());

    Ok(())
}

#[test]
fn ether_to_wei_should_scale_by_eighteen_decimals() -> Result<()> {
    assert_eq!(ether_to_wei(dec!(1.5))?, U256::from(1_500_000_000_000_000_000u64));
    assert_eq!(ether_to_wei(dec!(0))?, U256::ZERO);
    assert_eq!(ether_to_wei(dec!(2.000))?, U256::from(2_000_000_000_000_000_000u64));

    Ok(())
}

#[test]
fn gwei_to_wei_should_scale_gas_price() -> Result<()> {
    assert_eq!(gwei_to_wei(dec!(2))?, 2_000_000_000);
    assert_eq!(gwei_to_wei(dec!(0.5))?, 500_000_000);

    Ok(())
}

#[test]
fn format_ether_should_render_whole_units() {
    assert!(format_ether(U256::from(1_500_000_000_000_000_000u64)).starts_with("1.5"));
}

#[test]
fn gas_cost_should_multiply_price_and_limit() {
    assert_eq!(gas_cost(2_000_000_000, GAS_LIMIT_TX), U256::from(60_000_000_000_000u64));
    assert_eq!(gas_cost(2_000_000_000, GAS_LIMIT), U256::from(2_000_000_000_000_000u64));
}

#[test]
fn token_should_parse_case_insensitively() -> Result<()> {
    assert_eq!(Token::from_str("fsn")?, Token::Fsn);
    assert_eq!(Token::from_str("Free")?, Token::Free);
    assert_eq!(Token::from_str("FMN")?, Token::Fmn);
    assert!(matches!(Token::from_str("eth"), Err(Error::UnknownToken(_))));

    Ok(())
}

#[test]
fn token_should_map_to_network_contracts() {
    let network = Network::TESTNET;

    assert_eq!(Token::Fsn.contract(&network), None);
    assert_eq!(Token::Free.contract(&network), Some(network.free));
    assert_eq!(Token::Fmn.contract(&network), Some(network.fmn));
    assert_eq!(Token::Fsn.transfer_gas_limit(), GAS_LIMIT_TX);
    assert_eq!(Token::Free.transfer_gas_limit(), GAS_LIMIT);
    assert_eq!(Token::Fmn.to_string(), "FMN");
}

#[test]
fn network_should_parse_known_deployments() -> Result<()> {
    assert_eq!(Network::from_str("mainnet")?, Network::MAINNET);
    assert_eq!(Network::from_str(" TESTNET ")?, Network::TESTNET);
    assert_ne!(Network::MAINNET.faucet, Network::TESTNET.faucet);
    assert!(matches!(Network::from_str("devnet"), Err(Error::UnknownNetwork(_))));

    Ok(())
}
