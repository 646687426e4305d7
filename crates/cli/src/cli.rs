//! Command-line flags

use std::path::PathBuf;

use alloy_primitives::Address;
use clap::{Parser, ValueEnum};

use arb_core::{ExecutorConfig, ProfitCheckMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfitCheck {
    Disabled,
    StrictCost,
    IgnoreDistributeCost,
}

impl From<ProfitCheck> for ProfitCheckMode {
    fn from(check: ProfitCheck) -> Self {
        match check {
            ProfitCheck::Disabled => ProfitCheckMode::Disabled,
            ProfitCheck::StrictCost => ProfitCheckMode::StrictCost,
            ProfitCheck::IgnoreDistributeCost => ProfitCheckMode::IgnoreDistributeCost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportStyle {
    /// Coloured status lines on stdout
    #[default]
    Console,
    /// One structured log record per event
    Tracing,
}

/// Build, simulate and broadcast a distribute-and-arbitrage bundle
#[derive(Debug, Parser)]
#[command(name = "arb-distribute", author, version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file; skipped if missing
    #[arg(long, default_value = "arb.toml")]
    pub config: PathBuf,

    #[arg(long)]
    pub rpc_url: Option<String>,

    #[arg(long)]
    pub relay_url: Option<String>,

    /// Node account the bundle transactions are sent from
    #[arg(long)]
    pub node_address: Option<Address>,

    /// Fee-refund recipient registered with the relay
    #[arg(long)]
    pub refund_address: Option<Address>,

    /// Relay authentication key (hex)
    #[arg(long, env = "ARB_AUTH_KEY", hide_env_values = true)]
    pub auth_key: Option<String>,

    /// Sign relay requests with a throwaway key
    #[arg(long)]
    pub random_private_key: bool,

    /// Simulate and print the bundle without sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    #[arg(long, value_enum)]
    pub profit_check: Option<ProfitCheck>,

    /// Shell command printing the bundle as JSON
    #[arg(long)]
    pub builder_command: Option<String>,

    #[arg(long)]
    pub explorer_tx_url: Option<String>,

    /// Blocks past the next one to simulate against
    #[arg(long)]
    pub simulation_block_offset: Option<u64>,

    /// Consecutive blocks to target
    #[arg(long)]
    pub retry_rounds: Option<u32>,

    /// Seconds to wait for inclusion
    #[arg(long)]
    pub inclusion_timeout: Option<u64>,

    /// Used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[arg(long, value_enum, default_value_t = ReportStyle::Console)]
    pub report: ReportStyle,

    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Overlay flags given on the command line onto `config`
    pub fn apply(&self, config: &mut ExecutorConfig) {
        if let Some(url) = &self.rpc_url {
            config.rpc_url = url.clone();
        }
        if let Some(url) = &self.relay_url {
            config.relay_url = url.clone();
        }
        if let Some(address) = self.node_address {
            config.node_address = address;
        }
        if self.refund_address.is_some() {
            config.refund_address = self.refund_address;
        }
        if let Some(command) = &self.builder_command {
            config.builder_command = command.clone();
        }
        if let Some(url) = &self.explorer_tx_url {
            config.explorer_tx_url = Some(url.clone());
        }
        if let Some(check) = self.profit_check {
            config.profit_check = check.into();
        }
        if let Some(offset) = self.simulation_block_offset {
            config.simulation_block_offset = offset;
        }
        if let Some(rounds) = self.retry_rounds {
            config.broadcast.retry_rounds = rounds;
        }
        if let Some(secs) = self.inclusion_timeout {
            config.broadcast.inclusion_timeout_secs = secs;
        }

        // switches only ever turn a setting on
        config.random_private_key |= self.random_private_key;
        config.dry_run |= self.dry_run;
        config.skip_confirmation |= self.yes;
    }
}
