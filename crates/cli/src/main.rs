//! arb-distribute
//!
//! Main entry point: builds a distribute-and-arbitrage bundle, simulates it
//! on the relay and broadcasts it once the profit check and operator agree.

mod cli;
mod settings;

use std::process::ExitCode;
use std::sync::Arc;

use alloy::providers::ProviderBuilder;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{bail, Context};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use arb_core::ExecutorConfig;
use arb_executor::{
    AlloyChainClient, ChainClient, CommandBundleBuilder, ConfigVerifier, ConfirmationGate,
    ConsoleReporter, ExecutionPipeline, FlashbotsRelay, Reporter, TracingReporter,
};

use cli::{Cli, LogFormat, ReportStyle};

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    // stdout carries the operator report
    match cli.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn auth_signer(cli: &Cli, config: &ExecutorConfig) -> anyhow::Result<PrivateKeySigner> {
    if config.random_private_key {
        let signer = PrivateKeySigner::random();
        info!(address = %signer.address(), "using random relay auth key");
        return Ok(signer);
    }

    match &cli.auth_key {
        Some(key) => key
            .trim()
            .parse::<PrivateKeySigner>()
            .context("invalid relay auth key"),
        None => bail!("no relay auth key: pass --auth-key, set ARB_AUTH_KEY or use --random-private-key"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli);

    info!("Starting arb-distribute v{}", env!("CARGO_PKG_VERSION"));

    let config = settings::load(&cli).context("failed to load configuration")?;
    let signer = auth_signer(&cli, &config)?;

    let rpc_url: Url = config.rpc_url.parse().context("invalid rpc url")?;
    let relay_url: Url = config.relay_url.parse().context("invalid relay url")?;

    let provider = ProviderBuilder::new().connect_http(rpc_url);
    let chain: Arc<dyn ChainClient> = Arc::new(AlloyChainClient::new(provider));

    let relay = FlashbotsRelay::new(
        relay_url,
        signer,
        Arc::clone(&chain),
        config.broadcast.poll_interval(),
    )
    .context("failed to create relay client")?;
    info!(auth = %relay.auth_address(), "relay client ready");

    let reporter: Arc<dyn Reporter> = match cli.report {
        ReportStyle::Console => Arc::new(ConsoleReporter::new(!cli.no_color)),
        ReportStyle::Tracing => Arc::new(TracingReporter),
    };

    let mut pipeline = ExecutionPipeline::new(
        config,
        Arc::new(ConfigVerifier::new()),
        Arc::new(CommandBundleBuilder::new()),
        Arc::new(relay),
        chain,
        Box::new(ConfirmationGate::stdio()),
        reporter,
    );

    match pipeline.run().await {
        Ok(outcome) if outcome.is_success() => {
            info!(%outcome, "done");
            Ok(ExitCode::SUCCESS)
        }
        Ok(outcome) => {
            warn!(%outcome, "stopped");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            error!(stage = %e.stage(), "{}", e);
            Err(e.into())
        }
    }
}
