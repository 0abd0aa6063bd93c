//! Shared test doubles and fixtures.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use alloy_primitives::{keccak256, Address, B256};
use async_trait::async_trait;
use parking_lot::Mutex;

use token_service::config::{
    Config, ContractConfig, RpcConfig, ServerConfig, SubmissionConfig, WalletConfig,
};
use token_service::error::{TokenError, TokenResult};
use token_service::ledger::{InclusionReceipt, LedgerClient};
use token_service::token::{BatchDispatcher, TokenContext};

/// Well-known throwaway key; never used against a real network.
pub const TEST_PRIVATE_KEY: &str =
    "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

pub const TEST_CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

const MINT_SELECTOR: [u8; 4] = [0x40, 0xc1, 0x0f, 0x19];
const GRANT_ROLE_SELECTOR: [u8; 4] = [0x2f, 0x2f, 0xf1, 0x5d];

/// In-process ledger double: call counters plus programmable failure points.
#[derive(Default)]
pub struct MockLedger {
    pub start_nonce: u64,
    pub estimate_calls: AtomicUsize,
    pub send_calls: AtomicUsize,
    pub inclusion_calls: AtomicUsize,
    fail_estimate_for: Mutex<HashSet<Address>>,
    pub revert_on_inclusion: AtomicBool,
    pub fail_send: AtomicBool,
}

impl MockLedger {
    pub fn new(start_nonce: u64) -> Self {
        Self {
            start_nonce,
            ..Self::default()
        }
    }

    /// Make estimation fail for calls targeting `address`.
    pub fn fail_estimate_for(&self, address: Address) {
        self.fail_estimate_for.lock().insert(address);
    }

    fn rpc_error(&self, message: &str) -> TokenError {
        TokenError::Rpc {
            endpoint: Some("mock".to_string()),
            message: message.to_string(),
        }
    }
}

/// Pull the target address out of mint/grantRole calldata.
fn extract_target(data: &[u8]) -> Option<Address> {
    if data.len() < 68 {
        return None;
    }
    let selector: [u8; 4] = data[..4].try_into().ok()?;
    match selector {
        MINT_SELECTOR => Some(Address::from_slice(&data[16..36])),
        GRANT_ROLE_SELECTOR => Some(Address::from_slice(&data[48..68])),
        _ => None,
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn pending_nonce(&self, _address: Address) -> TokenResult<u64> {
        Ok(self.start_nonce)
    }

    async fn gas_price(&self) -> TokenResult<u128> {
        Ok(20_000_000_000)
    }

    async fn estimate_gas(&self, _from: Address, _to: Address, data: &[u8]) -> TokenResult<u64> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(target) = extract_target(data) {
            if self.fail_estimate_for.lock().contains(&target) {
                return Err(self.rpc_error("execution reverted"));
            }
        }
        Ok(60_000)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> TokenResult<B256> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_send.load(Ordering::SeqCst) {
            return Err(self.rpc_error("connection refused"));
        }
        Ok(keccak256(raw))
    }

    async fn wait_for_inclusion(&self, tx_hash: B256) -> TokenResult<InclusionReceipt> {
        self.inclusion_calls.fetch_add(1, Ordering::SeqCst);
        Ok(InclusionReceipt {
            tx_hash,
            success: !self.revert_on_inclusion.load(Ordering::SeqCst),
        })
    }

    async fn call(&self, _to: Address, data: &[u8]) -> TokenResult<Vec<u8>> {
        // Role-constant getters; the two roles just need to be distinct.
        if data == token_service::abi::encode_call("WHITELISTED_ROLE()", &[]) {
            return Ok(vec![0xaa; 32]);
        }
        if data == token_service::abi::encode_call("MINTER_ROLE()", &[]) {
            return Ok(vec![0xbb; 32]);
        }
        Err(self.rpc_error("unexpected call"))
    }
}

pub fn test_config() -> Config {
    Config {
        rpc: RpcConfig {
            url: "http://localhost:8545".to_string(),
            chain_id: 1,
            timeout_secs: 5,
        },
        wallet: WalletConfig {
            private_key: TEST_PRIVATE_KEY.to_string(),
        },
        contract: ContractConfig {
            address: TEST_CONTRACT.to_string(),
        },
        submission: SubmissionConfig::default(),
        server: ServerConfig::default(),
    }
}

/// Context + dispatcher wired to the given mock.
pub async fn test_dispatcher(
    ledger: Arc<MockLedger>,
    config: &Config,
) -> (Arc<TokenContext>, Arc<BatchDispatcher>) {
    let ctx = Arc::new(
        TokenContext::init(config, ledger.as_ref())
            .await
            .expect("context init against mock"),
    );
    let dispatcher = Arc::new(BatchDispatcher::new(
        Arc::clone(&ctx),
        ledger,
        &config.submission,
    ));
    (ctx, dispatcher)
}
