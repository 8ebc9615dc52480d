use merak_bot::task::build_operations;
use merak_bot::{MerakConfig, SuiKeypair, SuiSessionProvider};

use anyhow::{Context, Result};
use clap::Parser;
use core_logic::{
    setup_logger, OperationSummary, ProxyManager, TracingReporter, TransactionExecutor,
    TransactionRecorder, WalletCredential, WalletManager, WorkerRunner,
};
use dotenv::dotenv;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Merak Bot - Dubhe DEX automation on Sui", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "chains/merak/config.toml")]
    config: String,
    /// One BIP-39 phrase per line
    #[arg(long, default_value = WalletManager::MNEMONIC_FILE)]
    mnemonics: String,
    #[arg(long, default_value = ProxyManager::PROXY_FILE)]
    proxies: String,
    #[arg(long, default_value = TransactionRecorder::DEFAULT_DIR)]
    transactions_dir: String,
    /// Load everything and print the plan without submitting
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    // Dropped on return, which flushes the file log
    let _log_guard = setup_logger();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("FATAL ERROR {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    info!("Merak Bot v{}", env!("CARGO_PKG_VERSION"));

    let config = Arc::new(MerakConfig::load(&args.config)?);
    config.validate().context("Invalid configuration")?;
    info!("Network: {} ({})", config.network, config.rpc_endpoint());

    let proxies = ProxyManager::load_proxies(&args.proxies)?;
    if !proxies.is_empty() {
        info!(
            "Proxy mode: {}",
            if config.run.rotate_proxies { "rotating" } else { "random" }
        );
    }

    let wallets = WalletManager::load_required(&args.mnemonics, |phrase| {
        SuiKeypair::from_mnemonic(phrase).map_err(Into::into)
    })?;

    let specs = build_operations(&config)?;
    info!("Configuration: {}", OperationSummary::from_specs(&specs));

    if args.dry_run {
        for (i, wallet) in wallets.iter().enumerate() {
            info!("Wallet {:03}: {}", i + 1, wallet.address());
        }
        for spec in &specs {
            info!(
                "  {} [{}]{}",
                spec.label,
                if spec.enabled { "on" } else { "off" },
                if spec.critical { " critical" } else { "" }
            );
        }
        info!("Dry run: nothing submitted.");
        return Ok(());
    }

    let recorder = config
        .run
        .track_transactions
        .then(|| TransactionRecorder::new(&args.transactions_dir));
    let executor = TransactionExecutor::new(config.run.retry_config(), Arc::new(TracingReporter))
        .with_recorder(recorder);
    let runner = WorkerRunner::new(
        &executor,
        config.run.sequence_settings(),
        config.run.run_settings(),
    );
    let provider = SuiSessionProvider::new(Arc::clone(&config));

    runner.run_all(&wallets, &proxies, &provider, &specs).await?;
    Ok(())
}
