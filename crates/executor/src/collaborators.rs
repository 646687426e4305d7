//! Interfaces of the services the pipeline drives

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use tokio::time::Instant;

use arb_core::{Bundle, ExecutorConfig, SimulationResult, TransportResult, ValidationError};

use crate::builder::BuildError;

/// Checks configuration before anything touches the network
#[async_trait]
pub trait InputVerifier: Send + Sync {
    async fn verify(&self, config: &ExecutorConfig) -> Result<(), ValidationError>;
}

/// Produces the bundle and its construction-time profit estimate (wei)
#[async_trait]
pub trait BundleBuilder: Send + Sync {
    async fn build(&self, config: &ExecutorConfig) -> Result<(Bundle, U256), BuildError>;
}

/// Private relay accepting bundles
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn update_fee_refund_recipient(&self, recipient: Address) -> TransportResult<()>;

    /// Simulate against the block `block_offset` past the next one.
    /// Returns the per-transaction results and the relay's own verdict.
    async fn simulate_bundle(
        &self,
        bundle: &Bundle,
        block_offset: u64,
    ) -> TransportResult<(SimulationResult, bool)>;

    /// Submit for `rounds` consecutive blocks starting at the bundle's target
    /// block and wait for inclusion. Must not run past `deadline`.
    async fn send_and_wait_for_inclusion(
        &self,
        bundle: &Bundle,
        rounds: u32,
        deadline: Instant,
    ) -> TransportResult<bool>;
}

/// Read access to the chain
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn network_id(&self) -> TransportResult<u64>;

    async fn block_number(&self) -> TransportResult<u64>;

    /// Block the transaction was mined in, if it has been
    async fn inclusion_block(&self, tx_hash: B256) -> TransportResult<Option<u64>>;
}
