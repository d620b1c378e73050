//! Bridge Swap Check CLI
//!
//! Answers whether a wallet has swapped through the bridge from a source
//! chain to the destination chain.
//!
//! ```text
//! bridge-swap-check 0x9a4407Bf1Dc791383923cc0EA2706607c8E43eb1 arbitrum
//! ```
//!
//! Provider settings come from the environment (see `Config`). The legacy
//! answer is printed as `true`, `false` or `undefined`, followed by the
//! detailed verdict.

use std::str::FromStr;

use alloy::primitives::Address;
use clap::Parser;
use eyre::{eyre, Result, WrapErr};
use swap_check::config::Config;
use swap_check::{Network, ScanPolicy, SwapVerdict};
use tracing::info;

#[derive(Parser)]
#[command(name = "bridge-swap-check")]
#[command(about = "Check whether a wallet completed a bridge swap", long_about = None)]
struct Cli {
    /// Wallet address (0x-prefixed hex)
    wallet: String,

    /// Source network: arbitrum or bsc
    #[arg(value_parser = parse_source_network)]
    network: Network,

    /// Override SCAN_POLICY (first or any)
    #[arg(long, value_parser = parse_policy)]
    policy: Option<ScanPolicy>,

    /// Print the verdict as JSON
    #[arg(long)]
    json: bool,
}

fn parse_source_network(raw: &str) -> Result<Network, String> {
    let network = Network::from_str(raw).map_err(|e| e.to_string())?;
    if !network.is_source() {
        return Err(format!("{} is not a source network", network));
    }
    Ok(network)
}

fn parse_policy(raw: &str) -> Result<ScanPolicy, String> {
    ScanPolicy::from_str(raw).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let wallet = Address::from_str(cli.wallet.trim()).wrap_err("Invalid wallet address")?;

    let mut config = Config::load()?;
    if let Some(policy) = cli.policy {
        config.scan_policy = policy;
    }
    info!(
        bridge = %config.bridge_address,
        from_block = config.from_block,
        policy = ?config.scan_policy,
        "Configuration loaded"
    );

    if config.rpc_url(cli.network).is_none() {
        return Err(eyre!("No provider configured for {}", cli.network));
    }

    let checker = config.build_checker()?;
    let verdict = checker.check(wallet, cli.network).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        print_verdict(&verdict);
    }

    Ok(())
}

fn print_verdict(verdict: &SwapVerdict) {
    let legacy = match verdict.legacy() {
        Some(answer) => answer.to_string(),
        None => "undefined".to_string(),
    };
    println!("has swapped: {}", legacy);

    match verdict {
        SwapVerdict::Valid { tx_hash } => println!("  valid swap in {}", tx_hash),
        SwapVerdict::Invalid { tx_hash, reason } => {
            println!("  rejected {}: {}", tx_hash, reason)
        }
        SwapVerdict::NoTransactions => println!("  no bridge transactions for wallet"),
        SwapVerdict::ProviderFailure { error } => println!("  provider failure: {}", error),
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,swap_check=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
