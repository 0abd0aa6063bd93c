//! Pre-flight cost estimation.
//!
//! Runs strictly before nonce allocation: a call the node already predicts
//! will revert must not consume a sequence slot, because a consumed slot has
//! to be filled to keep the account unblocked.

use tracing::{debug, instrument};

use super::context::TokenContext;
use crate::error::{TokenError, TokenResult};
use crate::ledger::LedgerClient;
use crate::types::ValidOperation;

/// Ask the ledger whether the call would succeed and at what gas cost.
#[instrument(skip_all, fields(to = %op.target()))]
pub async fn preflight(
    ctx: &TokenContext,
    ledger: &dyn LedgerClient,
    op: &ValidOperation,
) -> TokenResult<u64> {
    let data = ctx.calldata_for(op);

    let gas = ledger
        .estimate_gas(ctx.address(), ctx.contract(), &data)
        .await
        .map_err(|err| TokenError::Estimation(err.to_string()))?;

    debug!(gas, "estimation passed");
    Ok(gas)
}
