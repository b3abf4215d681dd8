use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::{address, Address, U256};
use url::Url;

use crate::errors::Error;
use crate::keys::MasterSecret;
use crate::Result;

pub const DEFAULT_PROVIDER: &str = "https://mainway.freemoon.xyz/gate";
pub const MNEMONIC_VAR: &str = "MNEMONIC";

/// Gas limit for faucet and ERC20 calls.
pub const GAS_LIMIT: u64 = 1_000_000;
/// Gas limit for plain FSN transfers.
pub const GAS_LIMIT_TX: u64 = 30_000;
/// 0.5 FSN kept back on the funding account for gas.
pub const GAS_RESERVE: U256 = U256::from_limbs([500_000_000_000_000_000, 0, 0, 0]);

pub const DEFAULT_GAS_PRICE_WEI: u128 = 2_000_000_000;
pub const DEFAULT_BATCH_SIZE: u32 = 5;
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);
/// Claims re-arm every 62 minutes.
pub const DEFAULT_CLAIM_INTERVAL: Duration = Duration::from_secs(3_720);
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Contract addresses for one deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Network {
    pub free: Address,
    pub fmn: Address,
    pub faucet: Address,
}

impl Network {
    pub const MAINNET: Network = Network {
        free: address!("6403ede3b7604ea4883670c670bea288618bd5f2"),
        fmn: address!("b80a6c4f2a279ec91921ca30da726c534462125c"),
        faucet: address!("1b1459d4b9ed19050ecb1e9959e0d94c0fbe0603"),
    };

    pub const TESTNET: Network = Network {
        free: address!("984e4b2be971747a1a545cfe58f564f224148dc5"),
        fmn: address!("c2b3a8d52cc25cef410a2f06a73427cd2af18423"),
        faucet: address!("8f72b524431b359ca491981cb9fa8eda2d8483bf"),
    };
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::MAINNET),
            "testnet" => Ok(Network::TESTNET),
            _ => Err(Error::UnknownNetwork(s.to_string())),
        }
    }
}

/// Everything a run needs, fixed at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub secret: MasterSecret,
    pub rpc_url: Url,
    pub network: Network,
    /// Wei per gas unit.
    pub gas_price: u128,
    /// Transactions submitted per pacing tick.
    pub batch_size: u32,
    pub pacing: Duration,
    pub claim_interval: Duration,
    /// Balance differences up to this many wei are left alone when rebalancing.
    pub tolerance: U256,
    /// `None` waits on receipts forever.
    pub confirmation_timeout: Option<Duration>,
    pub journal: Option<PathBuf>,
    pub webhook: Option<Url>,
}

impl Config {
    pub fn new(secret: MasterSecret) -> Result<Self> {
        Ok(Self {
            secret,
            rpc_url: Url::parse(DEFAULT_PROVIDER)?,
            network: Network::MAINNET,
            gas_price: DEFAULT_GAS_PRICE_WEI,
            batch_size: DEFAULT_BATCH_SIZE,
            pacing: DEFAULT_PACING,
            claim_interval: DEFAULT_CLAIM_INTERVAL,
            tolerance: U256::ZERO,
            confirmation_timeout: Some(DEFAULT_CONFIRMATION_TIMEOUT),
            journal: None,
            webhook: None,
        })
    }

    /// Reads `.env` and the process environment once.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let phrase = env::var(MNEMONIC_VAR).map_err(|_| Error::MissingSecret)?;
        let mut config = Config::new(MasterSecret::new(phrase)?)?;

        if let Some(provider) = non_empty_var("PROVIDER") {
            config.rpc_url = Url::parse(&provider)?;
        }
        if let Some(network) = non_empty_var("NETWORK") {
            config.network = network.parse()?;
        }
        if let Some(secs) = non_empty_var("CONFIRMATION_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| Error::InvalidArgument {
                name: "CONFIRMATION_TIMEOUT_SECS",
                value: secs.clone(),
            })?;
            config.confirmation_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        config.journal = non_empty_var("JOURNAL_FILE").map(PathBuf::from);
        if let Some(webhook) = non_empty_var("DISCORD_WEBHOOK_URL") {
            config.webhook = Some(Url::parse(&webhook)?);
        }

        Ok(config)
    }

    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_tolerance(mut self, tolerance: U256) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|v| !v.is_empty())
}
