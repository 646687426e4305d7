//! Error types

use thiserror::Error;

/// Relay or chain RPC failure
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("relay returned error {code}: {message}")]
    Relay { code: i64, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("request signing failed: {0}")]
    Signing(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Bundle construction errors
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("bundle has no transactions")]
    Empty,

    #[error("transaction {index} could not be decoded: {reason}")]
    Decode { index: usize, reason: String },
}

/// Rejected input; raised before any side effect
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} URL {value:?}: {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must not be the zero address")]
    ZeroAddress(&'static str),

    #[error("no builder command configured")]
    MissingBuilderCommand,

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}

pub type TransportResult<T> = Result<T, TransportError>;
