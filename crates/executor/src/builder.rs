//! Bundle construction from an external command
//!
//! The command receives `NODE_ADDRESS` and `RPC_URL` in its environment and
//! prints `{"transactions": ["0x..."], "expectedProfit": "..."}` to stdout.
//! Transactions are EIP-2718 encoded and already signed by the node account.

use std::io;
use std::process::Stdio;
use std::str::FromStr;

use alloy::consensus::{Transaction as _, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use arb_core::{Bundle, BundleError, ExecutorConfig, Transaction};

use crate::collaborators::BundleBuilder;

/// Bundle construction failures
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to run builder command: {0}")]
    Spawn(#[source] io::Error),

    #[error("builder command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("builder output is not valid JSON: {0}")]
    Output(#[source] serde_json::Error),

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error("invalid expected profit {0:?}")]
    Profit(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuilderOutput {
    transactions: Vec<Bytes>,
    expected_profit: String,
}

/// Decode one signed transaction sent from `from`
pub fn decode_transaction(index: usize, raw: Bytes, from: Address) -> Result<Transaction, BundleError> {
    let envelope = TxEnvelope::decode_2718(&mut raw.as_ref()).map_err(|e| BundleError::Decode {
        index,
        reason: e.to_string(),
    })?;

    let max_fee_per_gas = envelope.max_fee_per_gas();

    Ok(Transaction {
        hash: *envelope.tx_hash(),
        from,
        to: envelope.to(),
        value: envelope.value(),
        gas_limit: envelope.gas_limit(),
        max_fee_per_gas,
        // legacy transactions pay their gas price as tip
        max_priority_fee_per_gas: envelope.max_priority_fee_per_gas().unwrap_or(max_fee_per_gas),
        nonce: envelope.nonce(),
        input: envelope.input().clone(),
        raw,
    })
}

/// Parse builder stdout into a bundle and its expected profit
pub fn parse_output(stdout: &[u8], from: Address) -> Result<(Bundle, U256), BuildError> {
    let output: BuilderOutput = serde_json::from_slice(stdout).map_err(BuildError::Output)?;

    let profit = output.expected_profit.trim();
    let expected_profit =
        U256::from_str(profit).map_err(|_| BuildError::Profit(profit.to_string()))?;

    let transactions = output
        .transactions
        .into_iter()
        .enumerate()
        .map(|(index, raw)| decode_transaction(index, raw, from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((Bundle::new(transactions)?, expected_profit))
}

/// Runs a shell command to produce the bundle
#[derive(Debug, Default, Clone)]
pub struct CommandBundleBuilder;

impl CommandBundleBuilder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BundleBuilder for CommandBundleBuilder {
    async fn build(&self, config: &ExecutorConfig) -> Result<(Bundle, U256), BuildError> {
        debug!(command = %config.builder_command, "running bundle builder");

        let output = Command::new("sh")
            .arg("-c")
            .arg(&config.builder_command)
            .env("NODE_ADDRESS", config.node_address.to_string())
            .env("RPC_URL", &config.rpc_url)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(BuildError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = %output.status, "bundle builder failed");
            return Err(BuildError::CommandFailed {
                status: output.status.to_string(),
                stderr,
            });
        }

        parse_output(&output.stdout, config.node_address)
    }
}
