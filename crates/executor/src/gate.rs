//! Profit gate

use alloy_primitives::U256;

use arb_core::{ProfitCheckMode, ProfitEvaluation};

/// Whether `expected_profit` clears the fee threshold of `mode`.
/// Equality admits.
pub fn admit(
    expected_profit: U256,
    max_bundle_fee: U256,
    max_arbitrage_fee: U256,
    mode: ProfitCheckMode,
) -> bool {
    match threshold(max_bundle_fee, max_arbitrage_fee, mode) {
        Some(fee) => expected_profit >= fee,
        None => true,
    }
}

/// Fee the expected profit must cover, if any
pub fn threshold(
    max_bundle_fee: U256,
    max_arbitrage_fee: U256,
    mode: ProfitCheckMode,
) -> Option<U256> {
    match mode {
        ProfitCheckMode::Disabled => None,
        ProfitCheckMode::StrictCost => Some(max_bundle_fee),
        ProfitCheckMode::IgnoreDistributeCost => Some(max_arbitrage_fee),
    }
}

/// Profit gate bound to a configured mode
#[derive(Debug, Clone, Copy)]
pub struct ProfitGate {
    mode: ProfitCheckMode,
}

impl ProfitGate {
    pub fn new(mode: ProfitCheckMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ProfitCheckMode {
        self.mode
    }

    pub fn admit(&self, eval: &ProfitEvaluation) -> bool {
        admit(
            eval.expected_profit,
            eval.max_bundle_fee,
            eval.max_arbitrage_fee,
            self.mode,
        )
    }

    pub fn threshold(&self, eval: &ProfitEvaluation) -> Option<U256> {
        threshold(eval.max_bundle_fee, eval.max_arbitrage_fee, self.mode)
    }
}
