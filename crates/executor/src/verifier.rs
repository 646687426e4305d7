//! Input verification

use alloy_primitives::Address;
use async_trait::async_trait;
use url::Url;

use arb_core::{ExecutorConfig, ValidationError};

use crate::collaborators::InputVerifier;

fn check_url(field: &'static str, value: &str) -> Result<Url, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidUrl {
        field,
        value: value.to_string(),
        reason,
    };

    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {:?}", other))),
    }
}

fn check_address(field: &'static str, address: Address) -> Result<(), ValidationError> {
    if address.is_zero() {
        return Err(ValidationError::ZeroAddress(field));
    }
    Ok(())
}

fn check_nonzero(field: &'static str, value: u64) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::ZeroValue(field));
    }
    Ok(())
}

/// Static checks over the executor configuration
#[derive(Debug, Default, Clone)]
pub struct ConfigVerifier;

impl ConfigVerifier {
    pub fn new() -> Self {
        Self
    }

    pub fn check(config: &ExecutorConfig) -> Result<(), ValidationError> {
        check_url("rpc", &config.rpc_url)?;
        check_url("relay", &config.relay_url)?;
        if let Some(explorer) = &config.explorer_tx_url {
            check_url("explorer", explorer)?;
        }

        check_address("node address", config.node_address)?;
        if let Some(refund) = config.refund_address {
            check_address("refund address", refund)?;
        }

        if config.builder_command.trim().is_empty() {
            return Err(ValidationError::MissingBuilderCommand);
        }

        let broadcast = &config.broadcast;
        check_nonzero("retry rounds", u64::from(broadcast.retry_rounds))?;
        check_nonzero("inclusion timeout", broadcast.inclusion_timeout_secs)?;
        check_nonzero("poll interval", broadcast.poll_interval_ms)?;

        Ok(())
    }
}

#[async_trait]
impl InputVerifier for ConfigVerifier {
    async fn verify(&self, config: &ExecutorConfig) -> Result<(), ValidationError> {
        Self::check(config)
    }
}
