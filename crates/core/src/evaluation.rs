//! Profit evaluation figures

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::units::wei_to_ether;

/// Expected profit and worst-case fees of a bundle, in wei
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitEvaluation {
    pub expected_profit: U256,
    /// Worst-case fee of every transaction in the bundle
    pub max_bundle_fee: U256,
    /// Worst-case fee of the settlement transaction alone
    pub max_arbitrage_fee: U256,
}

impl ProfitEvaluation {
    pub fn expected_profit_eth(&self) -> f64 {
        wei_to_ether(self.expected_profit)
    }

    pub fn bundle_fee_eth(&self) -> f64 {
        wei_to_ether(self.max_bundle_fee)
    }

    pub fn arbitrage_fee_eth(&self) -> f64 {
        wei_to_ether(self.max_arbitrage_fee)
    }

    /// Signed, for display
    pub fn net_after_bundle_fee_eth(&self) -> f64 {
        self.expected_profit_eth() - self.bundle_fee_eth()
    }

    /// Signed, for display
    pub fn net_after_arbitrage_fee_eth(&self) -> f64 {
        self.expected_profit_eth() - self.arbitrage_fee_eth()
    }
}
