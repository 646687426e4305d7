//! End-to-end execution: simulate, evaluate, gate, broadcast, monitor

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{B256, U256};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use arb_core::{networks, ExecutorConfig, ProfitCheckMode, TransportError, ValidationError};

use crate::broadcast::{BroadcastOrchestrator, BroadcastStep};
use crate::builder::BuildError;
use crate::collaborators::{BundleBuilder, ChainClient, InputVerifier, RelayClient};
use crate::confirmation::{block_on_prompt, Confirm, ConfirmationError};
use crate::evaluator::BundleEvaluator;
use crate::gate::ProfitGate;
use crate::monitor::InclusionState;
use crate::report::{ReportEvent, Reporter};

/// Pipeline step, used to label failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Verify,
    Preflight,
    Build,
    Simulate,
    Confirm,
    Broadcast,
    Inclusion,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Verify => "verify",
            Stage::Preflight => "preflight",
            Stage::Build => "build",
            Stage::Simulate => "simulate",
            Stage::Confirm => "confirm",
            Stage::Broadcast => "broadcast",
            Stage::Inclusion => "inclusion",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Fatal errors; the run stops without an outcome
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("verify: invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("preflight: failed to update relay fee refund recipient: {0}")]
    Preflight(#[source] TransportError),

    #[error("build: failed to build bundle: {0}")]
    Build(#[from] BuildError),

    #[error("confirm: {0}")]
    Confirmation(#[from] ConfirmationError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Validation(_) => Stage::Verify,
            PipelineError::Preflight(_) => Stage::Preflight,
            PipelineError::Build(_) => Stage::Build,
            PipelineError::Confirmation(_) => Stage::Confirm,
        }
    }
}

/// Terminal result of one run
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    DryRunReported { simulation_success: bool },
    SimulationFailed { failed_transactions: usize },
    ProfitTooLow {
        mode: ProfitCheckMode,
        expected_profit: U256,
        required: U256,
    },
    UserDeclined,
    Included { tx_hash: B256, explorer_link: String },
    NotIncludedWithinDeadline,
    TransportError { stage: Stage, source: TransportError },
}

impl ExecutionOutcome {
    /// Whether the process should exit successfully
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ExecutionOutcome::DryRunReported { .. } | ExecutionOutcome::Included { .. }
        )
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionOutcome::DryRunReported { .. } => write!(f, "dry run reported"),
            ExecutionOutcome::SimulationFailed {
                failed_transactions,
            } => write!(
                f,
                "bundle simulation failed ({} failing transactions)",
                failed_transactions
            ),
            ExecutionOutcome::ProfitTooLow { mode, .. } => match mode {
                ProfitCheckMode::IgnoreDistributeCost => {
                    write!(f, "expected profit is less than max arbitrage fees")
                }
                _ => write!(f, "expected profit is less than max bundle fees"),
            },
            ExecutionOutcome::UserDeclined => write!(f, "user did not confirm to proceed"),
            ExecutionOutcome::Included { explorer_link, .. } => {
                write!(f, "bundle included: {}", explorer_link)
            }
            ExecutionOutcome::NotIncludedWithinDeadline => {
                write!(f, "bundle was not included before the deadline")
            }
            ExecutionOutcome::TransportError { stage, source } => write!(f, "{}: {}", stage, source),
        }
    }
}

/// Drives one bundle from construction to inclusion
pub struct ExecutionPipeline {
    config: ExecutorConfig,
    verifier: Arc<dyn InputVerifier>,
    builder: Arc<dyn BundleBuilder>,
    relay: Arc<dyn RelayClient>,
    chain: Arc<dyn ChainClient>,
    confirmer: Box<dyn Confirm>,
    reporter: Arc<dyn Reporter>,
}

impl ExecutionPipeline {
    pub fn new(
        config: ExecutorConfig,
        verifier: Arc<dyn InputVerifier>,
        builder: Arc<dyn BundleBuilder>,
        relay: Arc<dyn RelayClient>,
        chain: Arc<dyn ChainClient>,
        confirmer: Box<dyn Confirm>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            config,
            verifier,
            builder,
            relay,
            chain,
            confirmer,
            reporter,
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run the pipeline once
    #[instrument(skip_all, fields(dry_run = self.config.dry_run))]
    pub async fn run(&mut self) -> Result<ExecutionOutcome, PipelineError> {
        self.verifier.verify(&self.config).await?;
        debug!("verified input data");

        if let Some(target) = self.config.refund_target() {
            self.relay
                .update_fee_refund_recipient(target.address())
                .await
                .map_err(PipelineError::Preflight)?;
            self.reporter
                .report(&ReportEvent::RefundRecipientUpdated(target));
        }

        let (mut bundle, expected_profit) = self.builder.build(&self.config).await?;
        debug!(transactions = bundle.len(), %expected_profit, "bundle built");

        let (simulation, relay_success) = match self
            .relay
            .simulate_bundle(&bundle, self.config.simulation_block_offset)
            .await
        {
            Ok(result) => result,
            Err(source) => {
                warn!(error = %source, "bundle simulation request failed");
                return Ok(ExecutionOutcome::TransportError {
                    stage: Stage::Simulate,
                    source,
                });
            }
        };

        let evaluation =
            BundleEvaluator::evaluate(&bundle, &simulation, relay_success, expected_profit);
        for failure in &evaluation.failures {
            self.reporter.report(&ReportEvent::SimulationTxFailed(failure));
        }
        self.reporter.report(&ReportEvent::SimulationSummary {
            success: evaluation.success,
            profit: &evaluation.profit,
        });

        // reported before the success check so a failing bundle can still be inspected
        if self.config.dry_run {
            self.reporter.report(&ReportEvent::DryRun {
                from: self.config.node_address,
                bundle: &bundle,
            });
            return Ok(ExecutionOutcome::DryRunReported {
                simulation_success: evaluation.success,
            });
        }

        if !evaluation.success {
            return Ok(ExecutionOutcome::SimulationFailed {
                failed_transactions: evaluation.failures.len(),
            });
        }

        let gate = ProfitGate::new(self.config.profit_check);
        if !gate.admit(&evaluation.profit) {
            self.reporter.report(&ReportEvent::ProfitRejected {
                mode: gate.mode(),
                profit: &evaluation.profit,
            });
            return Ok(ExecutionOutcome::ProfitTooLow {
                mode: gate.mode(),
                expected_profit: evaluation.profit.expected_profit,
                required: gate.threshold(&evaluation.profit).unwrap_or_default(),
            });
        }

        let bypass = self.config.skip_confirmation;
        let confirmer = &mut self.confirmer;
        if !block_on_prompt(|| confirmer.confirm(bypass))? {
            self.reporter.report(&ReportEvent::UserDeclined);
            return Ok(ExecutionOutcome::UserDeclined);
        }

        let orchestrator = BroadcastOrchestrator::new(
            Arc::clone(&self.relay),
            Arc::clone(&self.chain),
            self.config.broadcast.clone(),
        );

        let report = match orchestrator
            .broadcast(&mut bundle, simulation.bundle_hash, self.reporter.as_ref())
            .await
        {
            Ok(report) => report,
            Err(e) => {
                let stage = match e.step {
                    BroadcastStep::NetworkId | BroadcastStep::BlockNumber => Stage::Broadcast,
                    BroadcastStep::Inclusion => Stage::Inclusion,
                };
                return Ok(ExecutionOutcome::TransportError {
                    stage,
                    source: e.source,
                });
            }
        };

        if report.state != InclusionState::Included {
            self.reporter.report(&ReportEvent::NotIncluded {
                window: orchestrator.window(),
            });
            return Ok(ExecutionOutcome::NotIncludedWithinDeadline);
        }

        let tx_hash = simulation
            .settlement_tx_hash()
            .unwrap_or_else(|| bundle.last().hash);
        let explorer_link = self.explorer_link(report.network_id, tx_hash);

        info!(%tx_hash, "arbitrage settled");
        self.reporter.report(&ReportEvent::Included {
            tx_hash,
            link: &explorer_link,
            transactions: simulation.results.len(),
        });

        Ok(ExecutionOutcome::Included {
            tx_hash,
            explorer_link,
        })
    }

    fn explorer_link(&self, network_id: u64, tx_hash: B256) -> String {
        let base = self
            .config
            .explorer_tx_url
            .as_deref()
            .unwrap_or_else(|| networks::explorer_tx_url(network_id));
        format!("{}{}", base, tx_hash)
    }
}
