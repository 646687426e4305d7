//! Operator-facing status reporting
//!
//! Pipeline stages emit structured [`ReportEvent`]s; a [`Reporter`] decides
//! how they are presented.

use std::fmt::Write as _;
use std::io::Write as _;
use std::time::Duration;

use alloy_primitives::{hex, Address, B256, U256};
use tracing::{info, warn};

use arb_core::units::{wei_to_ether, wei_to_gwei};
use arb_core::{Bundle, ProfitCheckMode, ProfitEvaluation, RefundTarget};

use crate::evaluator::TxFailure;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Something the operator should see
#[derive(Debug, Clone, Copy)]
pub enum ReportEvent<'a> {
    RefundRecipientUpdated(RefundTarget),
    SimulationTxFailed(&'a TxFailure),
    SimulationSummary {
        success: bool,
        profit: &'a ProfitEvaluation,
    },
    DryRun {
        from: Address,
        bundle: &'a Bundle,
    },
    ProfitRejected {
        mode: ProfitCheckMode,
        profit: &'a ProfitEvaluation,
    },
    UserDeclined,
    BundleSent {
        bundle_hash: B256,
        target_block: u64,
        builders: usize,
        window: Duration,
    },
    Included {
        tx_hash: B256,
        link: &'a str,
        transactions: usize,
    },
    NotIncluded {
        window: Duration,
    },
}

/// Presents pipeline events
pub trait Reporter: Send + Sync {
    fn report(&self, event: &ReportEvent<'_>);
}

/// Human-readable lines on stdout
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    color: bool,
}

impl ConsoleReporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, color: &str) -> String {
        if self.color {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }

    /// Text printed for an event
    pub fn render(&self, event: &ReportEvent<'_>) -> String {
        let mut out = String::new();

        match event {
            ReportEvent::RefundRecipientUpdated(target) => {
                let source = match target {
                    RefundTarget::Supplied(_) => "supplied recipient",
                    RefundTarget::NodeAddress(_) => "node address",
                };
                let _ = writeln!(
                    out,
                    "Updated relay fee refund recipient to {} ({})",
                    source,
                    target.address()
                );
            }
            ReportEvent::SimulationTxFailed(failure) => {
                let _ = writeln!(
                    out,
                    "    Transaction {} failed: {} (revert: 0x{})",
                    failure.index + 1,
                    failure.error,
                    failure.revert_hex
                );
            }
            ReportEvent::SimulationSummary { success, profit } => {
                let verdict = if *success {
                    self.paint("success", GREEN)
                } else {
                    self.paint("failed", RED)
                };
                let _ = writeln!(out, "Simulated bundle ({}):", verdict);
                let _ = writeln!(
                    out,
                    "    Expected profit after fees: {:.6}, with a tx fee of {:.6}",
                    profit.net_after_bundle_fee_eth(),
                    profit.bundle_fee_eth()
                );
                let _ = writeln!(
                    out,
                    "    Expected profit after arbitrage fees: {:.6}, with a tx fee of {:.6} (relevant if distributing regardless)",
                    profit.net_after_arbitrage_fee_eth(),
                    profit.arbitrage_fee_eth()
                );
                let _ = writeln!(out);
            }
            ReportEvent::DryRun { from, bundle } => {
                let _ = writeln!(out, "Dry run. Would have sent the following bundle:");
                for (i, tx) in bundle.transactions().iter().enumerate() {
                    let to = tx
                        .to
                        .map(|a| a.to_string())
                        .unwrap_or_else(|| "contract creation".to_string());
                    let _ = writeln!(out, "Transaction {}:", i + 1);
                    let _ = writeln!(out, "    From: {}", from);
                    let _ = writeln!(out, "    To: {}", to);
                    let _ = writeln!(out, "    Value: {}", tx.value);
                    let _ = writeln!(out, "    Gas Limit: {}", tx.gas_limit);
                    let _ = writeln!(
                        out,
                        "    Base Fee: {} ({:.2} Gwei)",
                        tx.max_fee_per_gas,
                        wei_to_gwei(U256::from(tx.max_fee_per_gas))
                    );
                    let _ = writeln!(
                        out,
                        "    Priority Fee: {} ({:.4} Gwei)",
                        tx.max_priority_fee_per_gas,
                        wei_to_gwei(U256::from(tx.max_priority_fee_per_gas))
                    );
                    let _ = writeln!(out, "    Nonce: {}", tx.nonce);
                    let _ = writeln!(out, "    Data: {}", hex::encode(&tx.input));
                }
            }
            ReportEvent::ProfitRejected { mode, profit } => {
                let fee = match mode {
                    ProfitCheckMode::IgnoreDistributeCost => profit.max_arbitrage_fee,
                    _ => profit.max_bundle_fee,
                };
                let _ = writeln!(
                    out,
                    "{} expected profit {:.6} is less than the max fee {:.6} ({})",
                    self.paint("Aborting:", RED),
                    profit.expected_profit_eth(),
                    wei_to_ether(fee),
                    mode
                );
            }
            ReportEvent::UserDeclined => {
                let _ = writeln!(out, "Not confirmed, bundle was not sent.");
            }
            ReportEvent::BundleSent {
                bundle_hash,
                target_block,
                builders,
                window,
            } => {
                let until = chrono::Local::now()
                    + chrono::Duration::from_std(*window).unwrap_or_else(|_| chrono::Duration::zero());
                let _ = writeln!(out);
                let _ = writeln!(
                    out,
                    "Sent bundle with hash: {} (target block {}, {} builders). Waiting until {} to see if it is included...",
                    bundle_hash,
                    target_block,
                    builders,
                    until.format("%H:%M:%S")
                );
                let _ = writeln!(out);
            }
            ReportEvent::Included {
                tx_hash,
                link,
                transactions,
            } => {
                let what = if *transactions == 2 {
                    "Distributed minipool!"
                } else {
                    "Distributed minipools!"
                };
                let _ = writeln!(
                    out,
                    "{} Arbitrage tx: {}",
                    self.paint(what, GREEN),
                    link
                );
                let _ = writeln!(out, "    ({})", tx_hash);
            }
            ReportEvent::NotIncluded { window } => {
                let _ = writeln!(
                    out,
                    "{} bundle was not included within {}s",
                    self.paint("Not included:", RED),
                    window.as_secs()
                );
            }
        }

        out
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, event: &ReportEvent<'_>) {
        let text = self.render(event);
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

/// One structured log record per event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: &ReportEvent<'_>) {
        match event {
            ReportEvent::RefundRecipientUpdated(target) => {
                info!(stage = "preflight", recipient = %target.address(), "refund recipient updated");
            }
            ReportEvent::SimulationTxFailed(failure) => {
                warn!(
                    stage = "simulate",
                    index = failure.index,
                    error = %failure.error,
                    revert = %failure.revert_hex,
                    "simulated transaction failed"
                );
            }
            ReportEvent::SimulationSummary { success, profit } => {
                info!(
                    stage = "evaluate",
                    success,
                    expected_profit = %profit.expected_profit,
                    max_bundle_fee = %profit.max_bundle_fee,
                    max_arbitrage_fee = %profit.max_arbitrage_fee,
                    "bundle simulated"
                );
            }
            ReportEvent::DryRun { from, bundle } => {
                for (index, tx) in bundle.transactions().iter().enumerate() {
                    info!(
                        stage = "dry-run",
                        index,
                        from = %from,
                        to = ?tx.to,
                        value = %tx.value,
                        gas_limit = tx.gas_limit,
                        max_fee_per_gas = tx.max_fee_per_gas,
                        max_priority_fee_per_gas = tx.max_priority_fee_per_gas,
                        nonce = tx.nonce,
                        data = %hex::encode(&tx.input),
                        "dry run transaction"
                    );
                }
            }
            ReportEvent::ProfitRejected { mode, profit } => {
                warn!(
                    stage = "profit-check",
                    mode = %mode,
                    expected_profit = %profit.expected_profit,
                    max_bundle_fee = %profit.max_bundle_fee,
                    max_arbitrage_fee = %profit.max_arbitrage_fee,
                    "profit below threshold"
                );
            }
            ReportEvent::UserDeclined => {
                info!(stage = "confirm", "declined by operator");
            }
            ReportEvent::BundleSent {
                bundle_hash,
                target_block,
                builders,
                window,
            } => {
                info!(
                    stage = "broadcast",
                    bundle_hash = %bundle_hash,
                    target_block,
                    builders,
                    window_secs = window.as_secs(),
                    "bundle sent"
                );
            }
            ReportEvent::Included {
                tx_hash,
                link,
                transactions,
            } => {
                info!(stage = "inclusion", tx_hash = %tx_hash, link, transactions, "bundle included");
            }
            ReportEvent::NotIncluded { window } => {
                warn!(stage = "inclusion", window_secs = window.as_secs(), "bundle not included");
            }
        }
    }
}
