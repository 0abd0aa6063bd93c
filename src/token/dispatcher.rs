//! Batch dispatch over the shared account context.
//!
//! One tokio task per batch item, bounded by a semaphore sized from
//! configuration. Pipeline instances are fully independent; the only
//! serialization points are nonce allocation and appends into the shared
//! report. One item's failure never affects its siblings.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info, instrument, warn};

use super::context::TokenContext;
use super::submitter::Submission;
use super::{estimator, submitter};
use crate::config::SubmissionConfig;
use crate::error::{TokenError, TokenResult};
use crate::ledger::LedgerClient;
use crate::types::{BatchReport, OperationOutcome, OperationRequest};

pub struct BatchDispatcher {
    ctx: Arc<TokenContext>,
    ledger: Arc<dyn LedgerClient>,
    wait_for_inclusion: bool,
    max_in_flight: usize,
}

impl BatchDispatcher {
    pub fn new(
        ctx: Arc<TokenContext>,
        ledger: Arc<dyn LedgerClient>,
        submission: &SubmissionConfig,
    ) -> Self {
        Self {
            ctx,
            ledger,
            wait_for_inclusion: submission.wait_for_inclusion,
            max_in_flight: submission.max_in_flight.max(1),
        }
    }

    /// Run one operation through the full pipeline and report its outcome.
    ///
    /// Never returns an error: every failure is folded into the outcome so
    /// batch siblings and the front end see a uniform shape.
    pub async fn dispatch_one(&self, request: OperationRequest) -> OperationOutcome {
        Self::run_item(
            Arc::clone(&self.ctx),
            Arc::clone(&self.ledger),
            self.wait_for_inclusion,
            request,
        )
        .await
    }

    async fn run_item(
        ctx: Arc<TokenContext>,
        ledger: Arc<dyn LedgerClient>,
        wait_for_inclusion: bool,
        request: OperationRequest,
    ) -> OperationOutcome {
        let address = request.address().to_string();

        match Self::run_pipeline(&ctx, ledger.as_ref(), wait_for_inclusion, &request).await {
            Ok(Submission { tx_hash, status }) => {
                let tx_hash = format!("{tx_hash:#x}");
                match status {
                    // Included but reverted: a normal result, with the hash
                    // present so the caller can inspect it.
                    Some(false) => OperationOutcome::reverted(address, tx_hash),
                    _ => OperationOutcome::success(address, tx_hash),
                }
            }
            Err(err) => {
                warn!(target_address = %address, error = %err, category = err.category(), "operation failed");

                // An inclusion failure still carries the pool-accepted hash;
                // everything earlier in the pipeline never produced one.
                let tx_hash = match &err {
                    TokenError::Inclusion { tx_hash, .. } => tx_hash.clone(),
                    _ => String::new(),
                };
                OperationOutcome::failed(address, tx_hash, &err)
            }
        }
    }

    /// Dispatch a batch concurrently and wait for every outcome.
    ///
    /// Items with an empty target address are dropped before dispatch: the
    /// defined skip policy, not an error. Returns only after each remaining
    /// item has produced exactly one outcome; order is completion order.
    #[instrument(skip_all, fields(total = requests.len()))]
    pub async fn dispatch_batch(&self, requests: Vec<OperationRequest>) -> Vec<OperationOutcome> {
        let report = Arc::new(BatchReport::new());
        let semaphore = Arc::new(Semaphore::new(self.max_in_flight));
        let mut handles = Vec::new();

        for request in requests {
            if request.address().is_empty() {
                continue;
            }

            let ctx = Arc::clone(&self.ctx);
            let ledger = Arc::clone(&self.ledger);
            let wait_for_inclusion = self.wait_for_inclusion;
            let report = Arc::clone(&report);
            let semaphore = Arc::clone(&semaphore);

            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore is never closed");
                let outcome = Self::run_item(ctx, ledger, wait_for_inclusion, request).await;
                report.append(outcome);
            }));
        }

        let dispatched = handles.len();
        for handle in handles {
            if let Err(err) = handle.await {
                error!(error = %err, "dispatch task aborted");
            }
        }

        let outcomes = report.snapshot();
        info!(
            dispatched,
            ok = outcomes.iter().filter(|o| o.ok).count(),
            "batch complete"
        );
        outcomes
    }

    async fn run_pipeline(
        ctx: &TokenContext,
        ledger: &dyn LedgerClient,
        wait_for_inclusion: bool,
        request: &OperationRequest,
    ) -> TokenResult<Submission> {
        let op = request.validate()?;

        // Pre-flight before allocation: estimation failures must not consume
        // a sequence slot.
        estimator::preflight(ctx, ledger, &op).await?;

        let nonce = ctx.allocate_nonce();
        submitter::submit(ctx, ledger, &op, nonce, wait_for_inclusion).await
    }
}
