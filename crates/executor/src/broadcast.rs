//! Bundle broadcast to the relay

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::B256;
use thiserror::Error;
use tracing::{debug, info};

use arb_core::{BroadcastConfig, Bundle, TransportError};

use crate::collaborators::{ChainClient, RelayClient};
use crate::monitor::{InclusionMonitor, InclusionState};
use crate::report::{ReportEvent, Reporter};

/// Where a broadcast attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastStep {
    NetworkId,
    BlockNumber,
    Inclusion,
}

/// Transport failure tagged with the broadcast step
#[derive(Debug, Clone, Error)]
#[error("{step:?}: {source}")]
pub struct BroadcastError {
    pub step: BroadcastStep,
    #[source]
    pub source: TransportError,
}

/// What a completed broadcast observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub network_id: u64,
    pub target_block: u64,
    pub state: InclusionState,
}

/// Widens routing, pins the target block and submits under a deadline
pub struct BroadcastOrchestrator {
    relay: Arc<dyn RelayClient>,
    chain: Arc<dyn ChainClient>,
    config: BroadcastConfig,
}

impl BroadcastOrchestrator {
    pub fn new(
        relay: Arc<dyn RelayClient>,
        chain: Arc<dyn ChainClient>,
        config: BroadcastConfig,
    ) -> Self {
        Self {
            relay,
            chain,
            config,
        }
    }

    pub fn window(&self) -> Duration {
        self.config.inclusion_timeout()
    }

    /// Broadcast `bundle` and wait for inclusion
    ///
    /// The bundle's routing metadata is set here, once, before the first
    /// send. The reported state is `Included` or `TimedOut`.
    pub async fn broadcast(
        &self,
        bundle: &mut Bundle,
        bundle_hash: B256,
        reporter: &dyn Reporter,
    ) -> Result<BroadcastReport, BroadcastError> {
        let network_id = self.chain.network_id().await.map_err(|source| BroadcastError {
            step: BroadcastStep::NetworkId,
            source,
        })?;
        bundle.use_all_builders(network_id);

        let head = self.chain.block_number().await.map_err(|source| BroadcastError {
            step: BroadcastStep::BlockNumber,
            source,
        })?;
        let target_block = head + 1;
        bundle.set_target_block(target_block);

        debug!(
            network_id,
            target_block,
            builders = bundle.builders().len(),
            "bundle routed"
        );

        let mut monitor = InclusionMonitor::new(self.window());
        reporter.report(&ReportEvent::BundleSent {
            bundle_hash,
            target_block,
            builders: bundle.builders().len(),
            window: monitor.window(),
        });

        info!(
            %bundle_hash,
            target_block,
            rounds = self.config.retry_rounds,
            "submitting bundle"
        );

        let deadline = monitor.deadline();
        let sent: &Bundle = bundle;
        let state = monitor
            .watch(
                deadline,
                self.relay
                    .send_and_wait_for_inclusion(sent, self.config.retry_rounds, deadline),
            )
            .await
            .map_err(|source| BroadcastError {
                step: BroadcastStep::Inclusion,
                source,
            })?;

        Ok(BroadcastReport {
            network_id,
            target_block,
            state,
        })
    }
}
