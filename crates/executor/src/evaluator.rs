//! Simulation verdict and fee evaluation for a built bundle

use alloy_primitives::U256;
use tracing::warn;

use arb_core::{Bundle, ProfitEvaluation, SimulationResult};

/// A simulated transaction that did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxFailure {
    pub index: usize,
    pub error: String,
    pub revert_hex: String,
}

/// Combined result of checking a simulation and pricing the bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub success: bool,
    pub failures: Vec<TxFailure>,
    pub profit: ProfitEvaluation,
}

/// Bundle evaluator
pub struct BundleEvaluator;

impl BundleEvaluator {
    /// Evaluate a bundle against its simulation
    ///
    /// `relay_success` is the relay's own verdict; a bundle only succeeds when
    /// that verdict holds and every transaction outcome is ok.
    pub fn evaluate(
        bundle: &Bundle,
        simulation: &SimulationResult,
        relay_success: bool,
        expected_profit: U256,
    ) -> Evaluation {
        let failures = Self::failures(simulation);
        let aligned = simulation.results.len() == bundle.len();

        if !aligned {
            warn!(
                simulated = simulation.results.len(),
                bundled = bundle.len(),
                "simulation result count does not match bundle"
            );
        }

        Evaluation {
            success: relay_success && aligned && failures.is_empty(),
            failures,
            profit: Self::profit(bundle, expected_profit),
        }
    }

    /// Every failing entry, in bundle order
    pub fn failures(simulation: &SimulationResult) -> Vec<TxFailure> {
        simulation
            .results
            .iter()
            .enumerate()
            .filter(|(_, outcome)| !outcome.is_ok())
            .map(|(index, outcome)| TxFailure {
                index,
                error: outcome.error.clone().unwrap_or_default(),
                revert_hex: outcome.revert_hex(),
            })
            .collect()
    }

    /// Worst-case fees under both cost models
    ///
    /// Every transaction before the last is a distribute operation whose
    /// cost is sunk; the last one settles the arbitrage.
    pub fn profit(bundle: &Bundle, expected_profit: U256) -> ProfitEvaluation {
        ProfitEvaluation {
            expected_profit,
            max_bundle_fee: bundle.maximum_gas_fee(),
            max_arbitrage_fee: bundle.last().max_fee(),
        }
    }
}
