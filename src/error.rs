//! Error taxonomy for token operations.
//!
//! The variants follow the lifecycle of one operation: local validation,
//! pre-flight estimation, submission, inclusion. Which stage failed decides
//! whether a sequence number was consumed: validation and estimation errors
//! never consume a nonce, while a submission error always leaves one behind.

use thiserror::Error;

/// Errors produced by the orchestration core and its collaborators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Target address failed local well-formedness checks.
    ///
    /// Detected before any remote call; no nonce is consumed.
    #[error("invalid target address: {0:?}")]
    InvalidAddress(String),

    /// Mint amount is not a valid decimal unsigned integer.
    #[error("invalid mint amount: {0:?}")]
    InvalidAmount(String),

    /// The remote endpoint predicts the call would fail, or was unreachable
    /// during the pre-flight check. No nonce is consumed.
    #[error("gas estimation rejected the call: {0}")]
    Estimation(String),

    /// Signing or send failed after a nonce was already allocated.
    ///
    /// The nonce is consumed regardless: returning it would risk a collision
    /// with a concurrent allocation.
    #[error("submission failed at nonce {nonce}: {message}")]
    Submission { nonce: u64, message: String },

    /// The call was accepted into the pending pool, but the connection was
    /// lost while awaiting inclusion. Final status unknown.
    #[error("lost {tx_hash} while awaiting inclusion: {message}")]
    Inclusion { tx_hash: String, message: String },

    /// Transaction signing failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// RPC transport or endpoint failure.
    #[error("RPC error: {message} (endpoint: {endpoint:?})")]
    Rpc {
        endpoint: Option<String>,
        message: String,
    },

    /// Startup round-trips (pending nonce, gas price, role constants) failed.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

impl TokenError {
    /// Check if this error is transient and a later attempt might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            TokenError::Rpc { .. } => true,
            TokenError::Submission { .. } => true,
            TokenError::Inclusion { .. } => true,

            // Estimation failures are dominated by predicted reverts, which a
            // retry will not fix.
            TokenError::Estimation(_) => false,
            TokenError::InvalidAddress(_) => false,
            TokenError::InvalidAmount(_) => false,
            TokenError::Signing(_) => false,
            TokenError::Initialization(_) => false,
            TokenError::Config(_) => false,
        }
    }

    /// Error category for outcome reports and observability.
    pub fn category(&self) -> &'static str {
        match self {
            TokenError::InvalidAddress(_) | TokenError::InvalidAmount(_) => "validation",
            TokenError::Estimation(_) => "estimation",
            TokenError::Submission { .. } => "submission",
            TokenError::Inclusion { .. } => "inclusion",
            TokenError::Signing(_) => "signing",
            TokenError::Rpc { .. } => "rpc",
            TokenError::Initialization(_) => "init",
            TokenError::Config(_) => "config",
        }
    }
}

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;
