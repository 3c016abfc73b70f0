//! Tron Auto-Compounder CLI
//!
//! Command-line interface for running and inspecting the compounding agent.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tron_autocompounder::balance::BalanceSource;
use tron_autocompounder::contracts::{
    ContractCaller, GaugeClient, LiquidityRouter, RewardGauge, RouterClient,
};
use tron_autocompounder::tron::TronGridClient;
use tron_autocompounder::wallet::SecureWallet;
use tron_autocompounder::{
    AutoCompounder, CompoundingConfig, Result, TronGridConfig, TronGridIndexer,
};

#[derive(Parser)]
#[command(name = "autocompounder")]
#[command(about = "Auto-compounding agent for a Tron liquidity position")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the compounding loop until interrupted
    Run,

    /// Show claimable rewards, balances and pool price
    Status,

    /// Print the account address derived from the configured key
    Address,

    /// Show current configuration
    Config,
}

/// Clients wired for one account
struct Agent {
    gauge: Arc<GaugeClient>,
    router: Arc<RouterClient>,
    balances: Arc<TronGridIndexer>,
}

impl Agent {
    fn build(config: &CompoundingConfig) -> Result<Self> {
        let endpoint = TronGridConfig::from_env()?;
        let wallet = Arc::new(SecureWallet::from_env()?);
        tracing::info!(address = %wallet.address(), "Loaded wallet");

        let chain = Arc::new(TronGridClient::new(&endpoint)?);
        let caller = ContractCaller::new(chain, wallet.clone());

        Ok(Self {
            gauge: Arc::new(GaugeClient::new(caller.clone(), config)),
            router: Arc::new(RouterClient::new(caller, config)),
            balances: Arc::new(TronGridIndexer::new(&endpoint, wallet.address(), config)?),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over the flag
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if cli.log_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Load config
    let config = match &cli.config {
        Some(path) => CompoundingConfig::from_file(path)?,
        None => CompoundingConfig::default(),
    };

    match cli.command {
        Commands::Run => run_compounder(config).await?,
        Commands::Status => show_status(config).await?,
        Commands::Address => {
            let wallet = SecureWallet::from_env()?;
            println!("{}", wallet.address());
            println!("  hex: {}", wallet.address().to_hex());
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

async fn run_compounder(config: CompoundingConfig) -> Result<()> {
    let agent = Agent::build(&config)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping after the current step");
            on_signal.cancel();
        }
    });

    let compounder = AutoCompounder::new(
        agent.gauge,
        agent.router,
        agent.balances,
        &config,
        cancel,
    );
    compounder.run().await
}

async fn show_status(config: CompoundingConfig) -> Result<()> {
    let agent = Agent::build(&config)?;
    let pool = &config.pool;

    let claimable = agent.gauge.claimable_rewards().await?;
    let balance = agent.balances.snapshot().await?;
    let reserves = agent.router.reserves().await?;

    println!("Claimable rewards: {} {}", claimable, pool.base_token.symbol);
    println!("Balances:");
    println!("  {}: {}", pool.base_token.symbol, balance.base);
    println!("  {}: {}", pool.quote_token.symbol, balance.quote);
    println!("  {}: {}", pool.lp_token.symbol, balance.lp);
    println!("  TRX: {}", balance.native);
    println!("Pool reserves:");
    println!("  {}: {}", pool.base_token.symbol, reserves.base_display()?);
    println!("  {}: {}", pool.quote_token.symbol, reserves.quote_display()?);
    match reserves.price() {
        Ok(price) => println!(
            "  Price: {:.6} {} per {}",
            price, pool.quote_token.symbol, pool.base_token.symbol
        ),
        Err(e) => println!("  Price: unavailable ({})", e),
    }

    Ok(())
}
