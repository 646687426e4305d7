//! In-memory collaborators for driving the pipeline in tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use tokio::time::Instant;

use arb_core::{
    Bundle, ExecutorConfig, SimulationResult, Transaction, TransportError, TransportResult,
    TxOutcome, ValidationError,
};
use arb_executor::{
    BuildError, BundleBuilder, ChainClient, Confirm, ConfirmationError, ExecutionPipeline,
    InputVerifier, RelayClient, ReportEvent, Reporter,
};

pub const GWEI: u128 = 1_000_000_000;
pub const ETHER: u64 = 1_000_000_000_000_000_000;

pub fn tx(nonce: u64, gas_limit: u64, max_fee_per_gas: u128) -> Transaction {
    Transaction {
        hash: B256::repeat_byte(0xa0 + nonce as u8),
        from: node_address(),
        to: Some(Address::repeat_byte(0x22)),
        value: U256::ZERO,
        gas_limit,
        max_fee_per_gas,
        max_priority_fee_per_gas: GWEI,
        nonce,
        input: Bytes::new(),
        raw: Bytes::from(vec![0x02, nonce as u8]),
    }
}

/// Distribute plus arbitrage, 100k gas each at 500 gwei
pub fn two_tx_bundle() -> Bundle {
    Bundle::new(vec![tx(0, 100_000, 500 * GWEI), tx(1, 100_000, 500 * GWEI)])
        .expect("non-empty bundle")
}

pub fn node_address() -> Address {
    Address::repeat_byte(0x11)
}

pub fn passing_simulation(bundle: &Bundle) -> SimulationResult {
    SimulationResult {
        bundle_hash: B256::repeat_byte(0xbb),
        results: bundle
            .transactions()
            .iter()
            .map(|tx| TxOutcome::ok(tx.hash, 80_000))
            .collect(),
    }
}

pub fn config() -> ExecutorConfig {
    ExecutorConfig {
        node_address: node_address(),
        builder_command: "build-bundle".to_string(),
        skip_confirmation: true,
        ..Default::default()
    }
}

#[derive(Default)]
pub struct StaticVerifier {
    pub error: Option<ValidationError>,
}

#[async_trait]
impl InputVerifier for StaticVerifier {
    async fn verify(&self, _config: &ExecutorConfig) -> Result<(), ValidationError> {
        match &self.error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

pub struct StaticBuilder {
    pub bundle: Bundle,
    pub expected_profit: U256,
    pub calls: AtomicUsize,
}

impl StaticBuilder {
    pub fn new(bundle: Bundle, expected_profit: U256) -> Self {
        Self {
            bundle,
            expected_profit,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl BundleBuilder for StaticBuilder {
    async fn build(&self, _config: &ExecutorConfig) -> Result<(Bundle, U256), BuildError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((self.bundle.clone(), self.expected_profit))
    }
}

/// How the relay answers a send
#[derive(Debug, Clone)]
pub enum SendBehavior {
    Include,
    Miss,
    Hang,
    Fail(TransportError),
}

/// What the relay saw on the bundle when it was sent
#[derive(Debug, Clone)]
pub struct SentBundle {
    pub target_block: Option<u64>,
    pub builders: Vec<String>,
    pub rounds: u32,
}

pub struct MockRelay {
    pub refund_error: Option<TransportError>,
    pub simulation: Option<TransportResult<(SimulationResult, bool)>>,
    pub send: SendBehavior,

    pub refund_calls: AtomicUsize,
    pub refund_recipients: Mutex<Vec<Address>>,
    pub simulate_calls: AtomicUsize,
    pub send_calls: AtomicUsize,
    pub sent: Mutex<Vec<SentBundle>>,
}

impl MockRelay {
    pub fn new(send: SendBehavior) -> Self {
        Self {
            refund_error: None,
            simulation: None,
            send,
            refund_calls: AtomicUsize::new(0),
            refund_recipients: Mutex::new(Vec::new()),
            simulate_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn with_simulation(mut self, result: TransportResult<(SimulationResult, bool)>) -> Self {
        self.simulation = Some(result);
        self
    }

    pub fn with_refund_error(mut self, error: TransportError) -> Self {
        self.refund_error = Some(error);
        self
    }

    pub fn sends(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelayClient for MockRelay {
    async fn update_fee_refund_recipient(&self, recipient: Address) -> TransportResult<()> {
        self.refund_calls.fetch_add(1, Ordering::SeqCst);
        self.refund_recipients.lock().unwrap().push(recipient);
        match &self.refund_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn simulate_bundle(
        &self,
        bundle: &Bundle,
        _block_offset: u64,
    ) -> TransportResult<(SimulationResult, bool)> {
        self.simulate_calls.fetch_add(1, Ordering::SeqCst);
        match &self.simulation {
            Some(result) => result.clone(),
            None => Ok((passing_simulation(bundle), true)),
        }
    }

    async fn send_and_wait_for_inclusion(
        &self,
        bundle: &Bundle,
        rounds: u32,
        _deadline: Instant,
    ) -> TransportResult<bool> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(SentBundle {
            target_block: bundle.target_block(),
            builders: bundle.builders().to_vec(),
            rounds,
        });

        match &self.send {
            SendBehavior::Include => Ok(true),
            SendBehavior::Miss => Ok(false),
            SendBehavior::Hang => futures::future::pending::<TransportResult<bool>>().await,
            SendBehavior::Fail(e) => Err(e.clone()),
        }
    }
}

pub struct MockChain {
    pub network_id: u64,
    pub head: u64,
    pub error: Option<TransportError>,
}

impl MockChain {
    pub fn mainnet(head: u64) -> Self {
        Self {
            network_id: 1,
            head,
            error: None,
        }
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn network_id(&self) -> TransportResult<u64> {
        match &self.error {
            Some(e) => Err(e.clone()),
            None => Ok(self.network_id),
        }
    }

    async fn block_number(&self) -> TransportResult<u64> {
        Ok(self.head)
    }

    async fn inclusion_block(&self, _tx_hash: B256) -> TransportResult<Option<u64>> {
        Ok(None)
    }
}

/// Fixed answer, counting how often it was asked
pub struct ScriptedConfirm {
    pub answer: bool,
    pub asked: Arc<AtomicUsize>,
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, bypass: bool) -> Result<bool, ConfirmationError> {
        if bypass {
            return Ok(true);
        }
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer)
    }
}

/// Records the kind of every reported event
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<&'static str>>,
}

impl RecordingReporter {
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: &ReportEvent<'_>) {
        let kind = match event {
            ReportEvent::RefundRecipientUpdated(_) => "refund",
            ReportEvent::SimulationTxFailed(_) => "tx-failed",
            ReportEvent::SimulationSummary { .. } => "summary",
            ReportEvent::DryRun { .. } => "dry-run",
            ReportEvent::ProfitRejected { .. } => "profit-rejected",
            ReportEvent::UserDeclined => "declined",
            ReportEvent::BundleSent { .. } => "sent",
            ReportEvent::Included { .. } => "included",
            ReportEvent::NotIncluded { .. } => "not-included",
        };
        self.events.lock().unwrap().push(kind);
    }
}

/// Test handle over a pipeline and its collaborators
pub struct Harness {
    pub verifier: Arc<StaticVerifier>,
    pub builder: Arc<StaticBuilder>,
    pub relay: Arc<MockRelay>,
    pub chain: Arc<MockChain>,
    pub asked: Arc<AtomicUsize>,
    pub reporter: Arc<RecordingReporter>,
    pub confirm_answer: bool,
}

impl Harness {
    pub fn new(expected_profit: U256, relay: MockRelay) -> Self {
        Self {
            verifier: Arc::new(StaticVerifier::default()),
            builder: Arc::new(StaticBuilder::new(two_tx_bundle(), expected_profit)),
            relay: Arc::new(relay),
            chain: Arc::new(MockChain::mainnet(19_000_000)),
            asked: Arc::new(AtomicUsize::new(0)),
            reporter: Arc::new(RecordingReporter::default()),
            confirm_answer: true,
        }
    }

    pub fn pipeline(&self, config: ExecutorConfig) -> ExecutionPipeline {
        ExecutionPipeline::new(
            config,
            self.verifier.clone(),
            self.builder.clone(),
            self.relay.clone(),
            self.chain.clone(),
            Box::new(ScriptedConfirm {
                answer: self.confirm_answer,
                asked: Arc::clone(&self.asked),
            }),
            self.reporter.clone(),
        )
    }
}

pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::from(ETHER)
}
