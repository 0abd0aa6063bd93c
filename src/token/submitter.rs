//! Build, sign, and send one contract call.

use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_network::TxSignerSync;
use alloy_primitives::{B256, TxKind, U256};
use tracing::{debug, instrument, warn};

use super::context::TokenContext;
use crate::error::{TokenError, TokenResult};
use crate::ledger::LedgerClient;
use crate::types::ValidOperation;

/// Result of a successful hand-off to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub tx_hash: B256,

    /// Inclusion status under the synchronous policy; `None` when the call
    /// was only accepted into the pending pool (asynchronous policy).
    pub status: Option<bool>,
}

/// Sign and send one call at the given nonce.
///
/// Returning `Ok` means the ledger accepted the transaction into its pending
/// pool, not that the call succeeded on-ledger. With `wait_for_inclusion`
/// set, the receipt status is reported in [`Submission::status`]; a reverted
/// call is a normal result here, not an error.
#[instrument(skip(ctx, ledger, op), fields(to = %op.target()))]
pub async fn submit(
    ctx: &TokenContext,
    ledger: &dyn LedgerClient,
    op: &ValidOperation,
    nonce: u64,
    wait_for_inclusion: bool,
) -> TokenResult<Submission> {
    let mut tx = TxLegacy {
        chain_id: Some(ctx.chain_id()),
        nonce,
        gas_price: ctx.gas_price(),
        gas_limit: ctx.gas_limit(),
        to: TxKind::Call(ctx.contract()),
        value: U256::ZERO,
        input: ctx.calldata_for(op).into(),
    };

    let signature = ctx
        .signer()
        .sign_transaction_sync(&mut tx)
        .map_err(|err| TokenError::Signing(err.to_string()))?;
    let envelope = TxEnvelope::Legacy(tx.into_signed(signature));
    let raw = envelope.encoded_2718();

    let tx_hash = ledger
        .send_raw_transaction(&raw)
        .await
        .map_err(|err| TokenError::Submission {
            nonce,
            message: err.to_string(),
        })?;

    debug!(tx_hash = %tx_hash, "transaction accepted into pending pool");

    if !wait_for_inclusion {
        return Ok(Submission {
            tx_hash,
            status: None,
        });
    }

    let receipt = ledger
        .wait_for_inclusion(tx_hash)
        .await
        .map_err(|err| TokenError::Inclusion {
            tx_hash: format!("{tx_hash:#x}"),
            message: err.to_string(),
        })?;

    if !receipt.success {
        warn!(tx_hash = %tx_hash, "call included but reverted");
    }

    Ok(Submission {
        tx_hash,
        status: Some(receipt.success),
    })
}
