//! Relay simulation results

use alloy_primitives::{hex, Bytes, B256};
use serde::{Deserialize, Serialize};

/// Outcome of one simulated transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutcome {
    pub tx_hash: B256,
    pub gas_used: u64,
    pub error: Option<String>,
    pub revert: Bytes,
}

impl TxOutcome {
    pub fn ok(tx_hash: B256, gas_used: u64) -> Self {
        Self {
            tx_hash,
            gas_used,
            error: None,
            revert: Bytes::new(),
        }
    }

    pub fn failed(tx_hash: B256, error: impl Into<String>, revert: impl Into<Bytes>) -> Self {
        Self {
            tx_hash,
            gas_used: 0,
            error: Some(error.into()),
            revert: revert.into(),
        }
    }

    /// An empty error string counts as success
    pub fn is_ok(&self) -> bool {
        self.error.as_deref().map_or(true, str::is_empty)
    }

    pub fn revert_hex(&self) -> String {
        hex::encode(&self.revert)
    }
}

/// Result of simulating a bundle once, positionally aligned with its transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub bundle_hash: B256,
    pub results: Vec<TxOutcome>,
}

impl SimulationResult {
    pub fn all_ok(&self) -> bool {
        self.results.iter().all(TxOutcome::is_ok)
    }

    /// Hash of the final (arbitrage settlement) transaction
    pub fn settlement_tx_hash(&self) -> Option<B256> {
        self.results.last().map(|r| r.tx_hash)
    }
}
