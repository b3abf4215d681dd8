use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use faucet_army::units::{self, format_ether};
use faucet_army::{AlloyGateway, Army, Config, Fleet, Network, Shutdown, ShutdownHandle, Token};

const DEFAULT_GAS_PRICE: Decimal = dec!(2);

#[derive(Parser)]
#[command(version, about = "The FREEMOON Faucet Bot Army Command Line Interface")]
struct Cli {
    /// Overrides NETWORK from the environment
    #[arg(long, global = true, value_parser = network)]
    network: Option<Network>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Subscribe bots up to the given index, skipping those already subscribed
    Subscribe {
        #[arg(value_parser = count)]
        limit: u32,
        /// Gas price in gwei
        #[arg(value_parser = non_negative, default_value_t = DEFAULT_GAS_PRICE)]
        gas_price: Decimal,
        /// Max transactions submitted per second
        #[arg(value_parser = count, default_value_t = 5)]
        batch_size: u32,
    },
    /// Claim for the given number of bots now and then every 62 minutes
    Claim {
        #[arg(value_parser = count)]
        limit: u32,
        #[arg(value_parser = non_negative, default_value_t = DEFAULT_GAS_PRICE)]
        gas_price: Decimal,
        #[arg(value_parser = count, default_value_t = 5)]
        batch_size: u32,
    },
    /// Display public keys of the bot army
    #[command(name = "pubKeys", alias = "pub-keys")]
    PubKeys {
        #[arg(value_parser = count, default_value_t = 10)]
        limit: u32,
    },
    /// Display private keys of the bot army
    #[command(name = "privKeys", alias = "priv-keys")]
    PrivKeys {
        #[arg(value_parser = count, default_value_t = 10)]
        limit: u32,
    },
    /// Display FSN, FREE and FMN balances of the bot army
    Balances {
        #[arg(value_parser = count, default_value_t = 10)]
        limit: u32,
    },
    /// Count subscribed bots, scanning up to ten times the given limit
    #[command(name = "subCount", alias = "sub-count")]
    SubCount {
        #[arg(value_parser = count, default_value_t = 10)]
        limit: u32,
    },
    /// Transfer FSN, FREE or FMN between two bot indices
    Transfer {
        #[arg(value_parser = token)]
        token: Token,
        #[arg(value_parser = non_negative)]
        amount: Decimal,
        #[arg(value_parser = count)]
        to: u32,
        #[arg(value_parser = count, default_value_t = 0)]
        from: u32,
        #[arg(value_parser = non_negative, default_value_t = DEFAULT_GAS_PRICE)]
        gas_price: Decimal,
    },
    /// Top up bots to the given amount from the treasury
    Distribute {
        #[arg(value_parser = token)]
        token: Token,
        /// Amount each bot should hold
        #[arg(value_parser = non_negative)]
        amount: Decimal,
        #[arg(value_parser = count)]
        limit: u32,
        #[arg(value_parser = non_negative, default_value_t = DEFAULT_GAS_PRICE)]
        gas_price: Decimal,
        /// Differences up to this amount are left alone
        #[arg(long, value_parser = non_negative, default_value_t = Decimal::ZERO)]
        tolerance: Decimal,
    },
    /// Send everything above the given amount back to the treasury
    Gather {
        #[arg(value_parser = token)]
        token: Token,
        /// Amount to leave in each bot
        #[arg(value_parser = non_negative)]
        amount: Decimal,
        #[arg(value_parser = count)]
        limit: u32,
        #[arg(value_parser = non_negative, default_value_t = DEFAULT_GAS_PRICE)]
        gas_price: Decimal,
        /// Differences up to this amount are left alone
        #[arg(long, value_parser = non_negative, default_value_t = Decimal::ZERO)]
        tolerance: Decimal,
    },
}

fn non_negative(value: &str) -> Result<Decimal, String> {
    units::parse_non_negative("number", value).map_err(|e| e.to_string())
}

fn count(value: &str) -> Result<u32, String> {
    units::parse_count("count", value).map_err(|e| e.to_string())
}

fn network(value: &str) -> Result<Network, String> {
    value.parse::<Network>().map_err(|e| e.to_string())
}

fn token(value: &str) -> Result<Token, String> {
    value.parse::<Token>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(network) = cli.network {
        config = config.with_network(network);
    }

    match cli.command {
        Commands::PubKeys { limit } => {
            let fleet = Fleet::new(config.secret.clone());
            for (i, address) in fleet.derive_public_batch(limit)?.iter().enumerate() {
                println!("{}: {}", i, address);
            }
        }
        Commands::PrivKeys { limit } => {
            let fleet = Fleet::new(config.secret.clone());
            for (i, key) in fleet.derive_private_batch(limit)?.iter().enumerate() {
                println!("{}: {}", i, key);
            }
        }
        Commands::Subscribe {
            limit,
            gas_price,
            batch_size,
        } => {
            println!(
                "Subscribing up to the {}{} bot, gas price is {} gwei, {} requests per second.",
                limit,
                ordinal_suffix(limit),
                gas_price,
                batch_size
            );
            let config = config
                .with_gas_price(units::gwei_to_wei(gas_price)?)
                .with_batch_size(batch_size);
            let report = connect(config).await?.subscribe(limit, &shutdown_on_ctrl_c()).await?;
            println!(
                "\n>>> Subscribing complete, {} successful, {} unsuccessful.",
                report.settlement.success, report.settlement.fail
            );
        }
        Commands::Claim {
            limit,
            gas_price,
            batch_size,
        } => {
            println!(
                "Claiming for {} bots per hour, gas price is {} gwei, {} requests per second.",
                limit, gas_price, batch_size
            );
            let config = config
                .with_gas_price(units::gwei_to_wei(gas_price)?)
                .with_batch_size(batch_size);
            connect(config).await?.claim_forever(limit, &shutdown_on_ctrl_c()).await?;
        }
        Commands::Balances { limit } => {
            for row in connect(config).await?.balances(limit).await? {
                println!(
                    "{}: {}: FSN: {}, FREE: {}, FMN: {}",
                    row.index,
                    row.address,
                    format_ether(row.fsn),
                    format_ether(row.free),
                    format_ether(row.fmn)
                );
            }
        }
        Commands::SubCount { limit } => {
            println!("Counting subscribed addresses up to upper limit of {} ...", u64::from(limit) * 10);
            let total = connect(config).await?.count_subscribed(limit).await?;
            println!("Total subscribed addresses: {}", total);
        }
        Commands::Transfer {
            token,
            amount,
            to,
            from,
            gas_price,
        } => {
            println!(
                "Transferring {} {} from address {} to address {}, gas price is {} gwei.",
                amount, token, from, to, gas_price
            );
            let config = config.with_gas_price(units::gwei_to_wei(gas_price)?);
            let hash = connect(config).await?
                .transfer(token, units::ether_to_wei(amount)?, to, from)
                .await?;
            println!("\n>>> Success ({}). Run \"balances\" command to verify.", hash);
        }
        Commands::Distribute {
            token,
            amount,
            limit,
            gas_price,
            tolerance,
        } => {
            println!(
                "Distributing max {} {} to max {} addresses, gas price is {} gwei.",
                amount, token, limit, gas_price
            );
            let config = config
                .with_gas_price(units::gwei_to_wei(gas_price)?)
                .with_tolerance(units::ether_to_wei(tolerance)?);
            let settlement = connect(config).await?
                .distribute(token, units::ether_to_wei(amount)?, limit)
                .await?;
            println!(
                ">>> Transfer complete, {} successful, {} unsuccessful.",
                settlement.success, settlement.fail
            );
        }
        Commands::Gather {
            token,
            amount,
            limit,
            gas_price,
            tolerance,
        } => {
            println!(
                "Gathering max {} {} from max {} addresses, gas price is {} gwei.",
                amount, token, limit, gas_price
            );
            let config = config
                .with_gas_price(units::gwei_to_wei(gas_price)?)
                .with_tolerance(units::ether_to_wei(tolerance)?);
            let report = connect(config).await?
                .gather(token, units::ether_to_wei(amount)?, limit)
                .await?;
            println!(
                ">>> Gather complete, {} successful, {} unsuccessful, {} ignored.",
                report.settlement.success,
                report.settlement.fail,
                report.ignored()
            );
        }
    }

    Ok(())
}

async fn connect(config: Config) -> anyhow::Result<Army<AlloyGateway>> {
    let gateway = AlloyGateway::connect(config.rpc_url.clone())
        .await
        .context("failed to connect to provider")?;
    Ok(Army::new(config, gateway))
}

fn shutdown_on_ctrl_c() -> Shutdown {
    let (handle, shutdown) = ShutdownHandle::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, finishing submitted transactions ...");
            handle.cancel();
        }
    });
    shutdown
}

fn ordinal_suffix(n: u32) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
