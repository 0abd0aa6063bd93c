//! Ledger client seam.
//!
//! The orchestration core consumes the remote ledger through [`LedgerClient`]
//! only; tests substitute an in-process mock, production wires in the
//! JSON-RPC implementation from [`rpc`].

pub mod rpc;

pub use rpc::HttpLedgerClient;

use alloy_primitives::{Address, B256};
use async_trait::async_trait;

use crate::error::TokenResult;

/// Outcome of waiting for a transaction to land in a finalized block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InclusionReceipt {
    pub tx_hash: B256,

    /// `true` when the call executed successfully, `false` when it was
    /// included but reverted. Distinct from pool acceptance.
    pub success: bool,
}

/// The remote ledger as the core consumes it.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Pending-pool sequence number for `address`.
    async fn pending_nonce(&self, address: Address) -> TokenResult<u64>;

    /// Fee price the node currently suggests.
    async fn gas_price(&self) -> TokenResult<u128>;

    /// Dry-run the call; consumes no nonce and mutates no state.
    async fn estimate_gas(&self, from: Address, to: Address, data: &[u8]) -> TokenResult<u64>;

    /// Submit a signed, RLP-encoded transaction. Returns the transaction
    /// hash on acceptance into the pending pool.
    async fn send_raw_transaction(&self, raw: &[u8]) -> TokenResult<B256>;

    /// Block until the transaction is included, then report its status.
    async fn wait_for_inclusion(&self, tx_hash: B256) -> TokenResult<InclusionReceipt>;

    /// Read-only contract call (used for the role-constant getters).
    async fn call(&self, to: Address, data: &[u8]) -> TokenResult<Vec<u8>>;
}
