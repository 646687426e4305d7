//! Core types for the bundle execution pipeline
//!
//! Shared across the executor and the command-line binary:
//! - Transaction and bundle model
//! - Relay simulation results
//! - Profit figures and display-unit conversion
//! - Configuration and error types

pub mod types;
pub mod simulation;
pub mod evaluation;
pub mod units;
pub mod networks;
pub mod config;
pub mod errors;

pub use types::*;
pub use simulation::*;
pub use evaluation::*;
pub use config::*;
pub use errors::*;
