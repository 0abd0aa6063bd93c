//! Request, outcome, and report types shared across the service.

use alloy_primitives::{Address, U256};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{TokenError, TokenResult};

/// A single logical operation against the token contract.
///
/// Closed set: every variant has exactly one encoding and submission rule,
/// matched exhaustively downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRequest {
    /// Grant the whitelist role to `address`.
    Whitelist { address: String },
    /// Mint `amount` tokens (decimal string) to `address`.
    Mint { address: String, amount: String },
}

impl OperationRequest {
    /// Caller-supplied target address, unvalidated.
    pub fn address(&self) -> &str {
        match self {
            OperationRequest::Whitelist { address } => address,
            OperationRequest::Mint { address, .. } => address,
        }
    }

    /// Parse and validate into the typed form the pipeline operates on.
    ///
    /// Runs locally, before any remote call or nonce allocation.
    pub fn validate(&self) -> TokenResult<ValidOperation> {
        match self {
            OperationRequest::Whitelist { address } => {
                let target = parse_address(address)?;
                Ok(ValidOperation::Whitelist { target })
            }
            OperationRequest::Mint { address, amount } => {
                let target = parse_address(address)?;
                let amount = U256::from_str_radix(amount, 10)
                    .map_err(|_| TokenError::InvalidAmount(amount.clone()))?;
                Ok(ValidOperation::Mint { target, amount })
            }
        }
    }
}

fn parse_address(raw: &str) -> TokenResult<Address> {
    raw.parse::<Address>()
        .map_err(|_| TokenError::InvalidAddress(raw.to_string()))
}

/// An operation whose inputs passed local validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidOperation {
    Whitelist { target: Address },
    Mint { target: Address, amount: U256 },
}

impl ValidOperation {
    pub fn target(&self) -> Address {
        match self {
            ValidOperation::Whitelist { target } => *target,
            ValidOperation::Mint { target, .. } => *target,
        }
    }
}

/// Outcome for one operation. Produced exactly once per dispatched request.
///
/// `tx_hash` is empty when nothing was submitted. `ok: false` with a
/// non-empty hash means the call was included but reverted on-ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationOutcome {
    pub address: String,

    #[serde(rename = "txHash")]
    pub tx_hash: String,

    pub ok: bool,

    /// Error category when the operation failed before or during submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationOutcome {
    pub fn success(address: String, tx_hash: String) -> Self {
        Self {
            address,
            tx_hash,
            ok: true,
            error: None,
        }
    }

    /// Included on-ledger but executed with failure status.
    pub fn reverted(address: String, tx_hash: String) -> Self {
        Self {
            address,
            tx_hash,
            ok: false,
            error: Some("reverted".to_string()),
        }
    }

    pub fn failed(address: String, tx_hash: String, err: &TokenError) -> Self {
        Self {
            address,
            tx_hash,
            ok: false,
            error: Some(err.category().to_string()),
        }
    }
}

/// Concurrency-safe append-only collector of per-item outcomes.
///
/// Append order reflects completion time, not request order; callers read the
/// report only after every producer has finished.
#[derive(Debug, Default)]
pub struct BatchReport {
    outcomes: Mutex<Vec<OperationOutcome>>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Safe under unlimited concurrent callers; adds exactly one element.
    pub fn append(&self, outcome: OperationOutcome) {
        self.outcomes.lock().push(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone out the collected outcomes.
    pub fn snapshot(&self) -> Vec<OperationOutcome> {
        self.outcomes.lock().clone()
    }
}

// HTTP request/response bodies. Field names match the wire format the
// original deployment exposed.

#[derive(Debug, Clone, Deserialize)]
pub struct WhitelistRequest {
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhitelistBatchRequest {
    pub addresses: Vec<WhitelistRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MintRequest {
    pub address: String,
    pub amount: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MintBatchRequest {
    pub mints: Vec<MintRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub transactions: Vec<OperationOutcome>,
}

impl From<WhitelistRequest> for OperationRequest {
    fn from(req: WhitelistRequest) -> Self {
        OperationRequest::Whitelist {
            address: req.address,
        }
    }
}

impl From<MintRequest> for OperationRequest {
    fn from(req: MintRequest) -> Self {
        OperationRequest::Mint {
            address: req.address,
            amount: req.amount,
        }
    }
}
