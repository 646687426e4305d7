//! Base-unit to display-unit conversion
//!
//! Display only. Nothing returned here may feed an admit/reject decision;
//! those compare `U256` values directly.

use alloy_primitives::{utils::format_units, U256};

pub const ETHER_DECIMALS: u8 = 18;
pub const GWEI_DECIMALS: u8 = 9;

/// Convert a base-unit amount to a fractional display value
pub fn to_display(amount: U256, decimals: u8) -> f64 {
    format_units(amount, decimals)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

pub fn wei_to_ether(amount: U256) -> f64 {
    to_display(amount, ETHER_DECIMALS)
}

pub fn wei_to_gwei(amount: U256) -> f64 {
    to_display(amount, GWEI_DECIMALS)
}
