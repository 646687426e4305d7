//! Configuration types

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How expected profit is compared against bundle fees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfitCheckMode {
    /// Never reject on profit
    Disabled,
    /// Profit must cover the fee of every transaction in the bundle
    #[default]
    StrictCost,
    /// Profit must cover only the settlement transaction; the distribute
    /// transactions are paid regardless
    IgnoreDistributeCost,
}

impl fmt::Display for ProfitCheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProfitCheckMode::Disabled => "disabled",
            ProfitCheckMode::StrictCost => "strict-cost",
            ProfitCheckMode::IgnoreDistributeCost => "ignore-distribute-cost",
        };
        write!(f, "{}", name)
    }
}

/// Relay submission and inclusion wait settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Consecutive target blocks the bundle is submitted for
    pub retry_rounds: u32,
    pub inclusion_timeout_secs: u64,
    pub poll_interval_ms: u64,
}

impl BroadcastConfig {
    pub fn inclusion_timeout(&self) -> Duration {
        Duration::from_secs(self.inclusion_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            retry_rounds: 3,
            inclusion_timeout_secs: 60,
            poll_interval_ms: 1_000,
        }
    }
}

/// Complete executor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub rpc_url: String,
    pub relay_url: String,
    /// Node account that signs the bundle transactions
    pub node_address: Address,
    /// Fee-refund recipient; takes precedence over random-key mode
    pub refund_address: Option<Address>,
    /// The relay auth key is throwaway, so refunds go to the node address
    pub random_private_key: bool,
    pub dry_run: bool,
    pub skip_confirmation: bool,
    pub profit_check: ProfitCheckMode,
    /// Shell command printing the bundle to stdout
    pub builder_command: String,
    /// Overrides the explorer derived from the network
    pub explorer_tx_url: Option<String>,
    pub simulation_block_offset: u64,
    pub broadcast: BroadcastConfig,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            relay_url: "https://relay.flashbots.net".to_string(),
            node_address: Address::ZERO,
            refund_address: None,
            random_private_key: false,
            dry_run: false,
            skip_confirmation: false,
            profit_check: ProfitCheckMode::default(),
            builder_command: String::new(),
            explorer_tx_url: None,
            simulation_block_offset: 0,
            broadcast: BroadcastConfig::default(),
        }
    }
}

/// Who receives relay fee refunds after pre-flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundTarget {
    Supplied(Address),
    NodeAddress(Address),
}

impl RefundTarget {
    pub fn address(&self) -> Address {
        match self {
            RefundTarget::Supplied(a) | RefundTarget::NodeAddress(a) => *a,
        }
    }
}

impl ExecutorConfig {
    /// Refund recipient to install before building, if any
    pub fn refund_target(&self) -> Option<RefundTarget> {
        match self.refund_address {
            Some(addr) => Some(RefundTarget::Supplied(addr)),
            None if self.random_private_key => Some(RefundTarget::NodeAddress(self.node_address)),
            None => None,
        }
    }
}
