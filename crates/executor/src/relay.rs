//! Flashbots-compatible relay client
//!
//! Speaks signed JSON-RPC to a bundle relay:
//! - `flashbots_setFeeRefundRecipient` for refund routing
//! - `eth_callBundle` for simulation
//! - `eth_sendBundle` once per target block, followed by a receipt watch

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::signers::{local::PrivateKeySigner, Signer};
use alloy_primitives::{hex, keccak256, Address, Bytes, B256};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use arb_core::{Bundle, SimulationResult, TransportError, TransportResult, TxOutcome};

use crate::collaborators::{ChainClient, RelayClient};

const SIGNATURE_HEADER: &str = "X-Flashbots-Signature";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CallBundleParams {
    txs: Vec<Bytes>,
    block_number: String,
    state_block_number: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendBundleParams<'a> {
    txs: Vec<Bytes>,
    block_number: String,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    builders: &'a [String],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CallBundleResponse {
    bundle_hash: B256,
    results: Vec<CallBundleTx>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CallBundleTx {
    tx_hash: B256,
    #[serde(default)]
    gas_used: u64,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    revert: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendBundleResponse {
    bundle_hash: B256,
}

fn hex_block(block: u64) -> String {
    format!("{:#x}", block)
}

impl CallBundleResponse {
    fn into_simulation(self) -> (SimulationResult, bool) {
        let results: Vec<TxOutcome> = self
            .results
            .into_iter()
            .map(|tx| TxOutcome {
                tx_hash: tx.tx_hash,
                gas_used: tx.gas_used,
                error: tx.error,
                revert: tx.revert.map(|r| Bytes::from(r.into_bytes())).unwrap_or_default(),
            })
            .collect();
        let success = results.iter().all(TxOutcome::is_ok);

        (
            SimulationResult {
                bundle_hash: self.bundle_hash,
                results,
            },
            success,
        )
    }
}

/// Relay client signing every request with an auth key
pub struct FlashbotsRelay {
    http: reqwest::Client,
    url: Url,
    signer: PrivateKeySigner,
    chain: Arc<dyn ChainClient>,
    poll_interval: Duration,
    next_id: AtomicU64,
}

impl FlashbotsRelay {
    pub fn new(
        url: Url,
        signer: PrivateKeySigner,
        chain: Arc<dyn ChainClient>,
        poll_interval: Duration,
    ) -> TransportResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self {
            http,
            url,
            signer,
            chain,
            poll_interval,
            next_id: AtomicU64::new(1),
        })
    }

    /// Address relay reputation and default refunds are tied to
    pub fn auth_address(&self) -> Address {
        self.signer.address()
    }

    /// `<address>:<signature over hex(keccak256(body))>`
    async fn auth_header(&self, body: &str) -> TransportResult<String> {
        let digest = hex::encode_prefixed(keccak256(body.as_bytes()));
        let signature = self
            .signer
            .sign_message(digest.as_bytes())
            .await
            .map_err(|e| TransportError::Signing(e.to_string()))?;

        Ok(format!(
            "{}:{}",
            self.signer.address(),
            hex::encode_prefixed(signature.as_bytes())
        ))
    }

    async fn call<P, R>(&self, method: &str, params: P) -> TransportResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let signature = self.auth_header(&body).await?;

        debug!(method, "relay request");

        let response = self
            .http
            .post(self.url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let parsed: JsonRpcResponse<R> = serde_json::from_str(&text).map_err(|e| {
            TransportError::MalformedResponse(format!("{} (HTTP {}): {}", method, status, e))
        })?;

        if let Some(error) = parsed.error {
            return Err(TransportError::Relay {
                code: error.code,
                message: error.message,
            });
        }

        parsed
            .result
            .ok_or_else(|| TransportError::MalformedResponse(format!("{}: missing result", method)))
    }

    async fn send_bundle(&self, bundle: &Bundle, block: u64) -> TransportResult<B256> {
        let params = SendBundleParams {
            txs: bundle.raw_transactions(),
            block_number: hex_block(block),
            builders: bundle.builders(),
        };
        let response: SendBundleResponse = self.call("eth_sendBundle", [params]).await?;
        Ok(response.bundle_hash)
    }

    /// Poll until `tx_hash` is mined or `target` has passed.
    /// Returns whether the transaction was seen on chain.
    async fn wait_for_block(
        &self,
        target: u64,
        tx_hash: B256,
        deadline: Instant,
    ) -> TransportResult<bool> {
        loop {
            if let Some(block) = self.chain.inclusion_block(tx_hash).await? {
                info!(block, %tx_hash, "settlement transaction mined");
                return Ok(true);
            }

            if self.chain.block_number().await? >= target {
                return Ok(false);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}

#[async_trait]
impl RelayClient for FlashbotsRelay {
    async fn update_fee_refund_recipient(&self, recipient: Address) -> TransportResult<()> {
        let _: serde_json::Value = self
            .call(
                "flashbots_setFeeRefundRecipient",
                (self.signer.address(), recipient),
            )
            .await?;
        Ok(())
    }

    async fn simulate_bundle(
        &self,
        bundle: &Bundle,
        block_offset: u64,
    ) -> TransportResult<(SimulationResult, bool)> {
        let head = self.chain.block_number().await?;
        let params = CallBundleParams {
            txs: bundle.raw_transactions(),
            block_number: hex_block(head + 1 + block_offset),
            state_block_number: "latest",
        };

        let response: CallBundleResponse = self.call("eth_callBundle", [params]).await?;
        if response.results.len() != bundle.len() {
            return Err(TransportError::MalformedResponse(format!(
                "eth_callBundle returned {} results for {} transactions",
                response.results.len(),
                bundle.len()
            )));
        }

        Ok(response.into_simulation())
    }

    async fn send_and_wait_for_inclusion(
        &self,
        bundle: &Bundle,
        rounds: u32,
        deadline: Instant,
    ) -> TransportResult<bool> {
        let first = bundle.target_block().ok_or_else(|| {
            TransportError::InvalidRequest("bundle has no target block".to_string())
        })?;
        let watched = bundle.last().hash;

        for round in 0..rounds {
            if Instant::now() >= deadline {
                warn!(round, "deadline reached before all rounds were sent");
                break;
            }

            let target = first + u64::from(round);
            let bundle_hash = self.send_bundle(bundle, target).await?;
            debug!(round, target, %bundle_hash, "bundle submitted");

            if self.wait_for_block(target, watched, deadline).await? {
                return Ok(true);
            }
        }

        // the last target may have been mined between the receipt check and the head check
        Ok(self.chain.inclusion_block(watched).await?.is_some())
    }
}
