//! Bundle execution against a private relay
//!
//! Features:
//! - Relay simulation and per-transaction evaluation
//! - Profit gating and interactive confirmation
//! - Multi-block broadcast with a bounded inclusion wait
//! - Console and structured reporting

pub mod collaborators;
pub mod evaluator;
pub mod gate;
pub mod confirmation;
pub mod monitor;
pub mod report;
pub mod broadcast;
pub mod pipeline;
pub mod builder;
pub mod chain;
pub mod relay;
pub mod verifier;

pub use collaborators::{BundleBuilder, ChainClient, InputVerifier, RelayClient};
pub use evaluator::{BundleEvaluator, Evaluation, TxFailure};
pub use gate::ProfitGate;
pub use confirmation::{block_on_prompt, Confirm, ConfirmationError, ConfirmationGate};
pub use monitor::{InclusionMonitor, InclusionState};
pub use report::{ConsoleReporter, ReportEvent, Reporter, TracingReporter};
pub use broadcast::{BroadcastError, BroadcastOrchestrator, BroadcastReport, BroadcastStep};
pub use pipeline::{ExecutionOutcome, ExecutionPipeline, PipelineError, Stage};
pub use builder::{BuildError, CommandBundleBuilder};
pub use chain::AlloyChainClient;
pub use relay::FlashbotsRelay;
pub use verifier::ConfigVerifier;
