//! Chain access over an alloy provider

use alloy::providers::Provider;
use alloy_primitives::B256;
use async_trait::async_trait;

use arb_core::{TransportError, TransportResult};

use crate::collaborators::ChainClient;

/// `ChainClient` backed by any alloy provider
pub struct AlloyChainClient<P> {
    provider: P,
}

impl<P> AlloyChainClient<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

fn rpc_error(e: impl std::fmt::Display) -> TransportError {
    TransportError::Rpc(e.to_string())
}

#[async_trait]
impl<P> ChainClient for AlloyChainClient<P>
where
    P: Provider + Send + Sync,
{
    async fn network_id(&self) -> TransportResult<u64> {
        self.provider.get_chain_id().await.map_err(rpc_error)
    }

    async fn block_number(&self) -> TransportResult<u64> {
        self.provider.get_block_number().await.map_err(rpc_error)
    }

    async fn inclusion_block(&self, tx_hash: B256) -> TransportResult<Option<u64>> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(rpc_error)?;

        Ok(receipt.and_then(|r| r.block_number))
    }
}
