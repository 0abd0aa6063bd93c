//! Shared account context for contract calls.
//!
//! One instance per process, constructed at startup and shared by every
//! in-flight operation. Owns the signing key, the nonce counter, the fee
//! parameters, and the role constants read from the contract.

use alloy_primitives::{Address, B256};
use alloy_signer_local::PrivateKeySigner;
use parking_lot::Mutex;
use tracing::info;

use crate::abi::{self, AbiValue};
use crate::config::Config;
use crate::error::{TokenError, TokenResult};
use crate::ledger::LedgerClient;
use crate::types::ValidOperation;

pub struct TokenContext {
    signer: PrivateKeySigner,
    address: Address,
    contract: Address,
    chain_id: u64,

    // Read-only after construction; no locking required.
    gas_price: u128,
    gas_limit: u64,

    // Fetched once at startup. Could keccak the role names locally, but
    // reading them from the contract is safer.
    whitelisted_role: B256,
    minter_role: B256,

    // Only ever read-modify-written under this lock, never held across I/O.
    next_nonce: Mutex<u64>,
}

impl TokenContext {
    /// Build the context from configuration plus the startup round-trips:
    /// pending nonce, suggested gas price, and the two role constants.
    /// Failure of any aborts startup.
    pub async fn init(config: &Config, ledger: &dyn LedgerClient) -> TokenResult<Self> {
        let signer: PrivateKeySigner = config
            .wallet
            .private_key
            .parse()
            .map_err(|_| TokenError::Initialization("invalid signing key".to_string()))?;
        let address = signer.address();

        let contract: Address = config
            .contract
            .address
            .parse()
            .map_err(|_| {
                TokenError::Initialization(format!(
                    "invalid contract address {:?}",
                    config.contract.address
                ))
            })?;

        let next_nonce = ledger
            .pending_nonce(address)
            .await
            .map_err(|err| TokenError::Initialization(format!("pending nonce: {err}")))?;

        let gas_price = ledger
            .gas_price()
            .await
            .map_err(|err| TokenError::Initialization(format!("gas price: {err}")))?;

        let whitelisted_role = fetch_role(ledger, contract, "WHITELISTED_ROLE()").await?;
        let minter_role = fetch_role(ledger, contract, "MINTER_ROLE()").await?;

        info!(
            caller = %address,
            contract = %contract,
            nonce = next_nonce,
            gas_price,
            "account context initialized"
        );

        Ok(Self {
            signer,
            address,
            contract,
            chain_id: config.rpc.chain_id,
            gas_price,
            gas_limit: config.submission.gas_limit,
            whitelisted_role,
            minter_role,
            next_nonce: Mutex::new(next_nonce),
        })
    }

    /// Allocate the sequence number for the next transaction.
    ///
    /// Returns the value to use now and leaves the counter one past it, so
    /// concurrent callers each get a distinct, strictly increasing number.
    /// The allocated number is committed here: it must be used for a
    /// submission attempt, successful or not, or the account stalls.
    pub fn allocate_nonce(&self) -> u64 {
        let mut next = self.next_nonce.lock();
        let allocated = *next;
        *next += 1;
        allocated
    }

    /// Build the calldata for an operation.
    ///
    /// Both the estimator and the submitter go through here, so the payload
    /// that was estimated is exactly the payload that gets signed.
    pub fn calldata_for(&self, op: &ValidOperation) -> Vec<u8> {
        match op {
            ValidOperation::Whitelist { target } => abi::encode_call(
                abi::GRANT_ROLE_SIG,
                &[
                    AbiValue::FixedBytes(self.whitelisted_role),
                    AbiValue::Address(*target),
                ],
            ),
            ValidOperation::Mint { target, amount } => abi::encode_call(
                abi::MINT_SIG,
                &[AbiValue::Address(*target), AbiValue::Uint(*amount)],
            ),
        }
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// Address derived from the signing key.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn gas_price(&self) -> u128 {
        self.gas_price
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn whitelisted_role(&self) -> B256 {
        self.whitelisted_role
    }

    pub fn minter_role(&self) -> B256 {
        self.minter_role
    }
}

async fn fetch_role(
    ledger: &dyn LedgerClient,
    contract: Address,
    getter_sig: &str,
) -> TokenResult<B256> {
    let data = abi::encode_call(getter_sig, &[]);
    let word = ledger
        .call(contract, &data)
        .await
        .map_err(|err| TokenError::Initialization(format!("{getter_sig}: {err}")))?;

    if word.len() != 32 {
        return Err(TokenError::Initialization(format!(
            "{getter_sig}: expected 32-byte word, got {} bytes",
            word.len()
        )));
    }
    Ok(B256::from_slice(&word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn test_context(start_nonce: u64) -> TokenContext {
        let signer = PrivateKeySigner::random();
        let address = signer.address();
        TokenContext {
            signer,
            address,
            contract: Address::repeat_byte(0x02),
            chain_id: 1,
            gas_price: 20_000_000_000,
            gas_limit: 300_000,
            whitelisted_role: B256::repeat_byte(0xaa),
            minter_role: B256::repeat_byte(0xbb),
            next_nonce: Mutex::new(start_nonce),
        }
    }

    #[test]
    fn test_allocate_nonce_returns_current_then_advances() {
        let ctx = test_context(7);
        assert_eq!(ctx.allocate_nonce(), 7);
        assert_eq!(ctx.allocate_nonce(), 8);
        assert_eq!(ctx.allocate_nonce(), 9);
    }

    #[test]
    fn test_allocate_nonce_concurrent_contiguous_run() {
        const THREADS: usize = 16;
        const PER_THREAD: usize = 50;

        let ctx = Arc::new(test_context(100));
        let mut handles = Vec::new();
        for _ in 0..THREADS {
            let ctx = Arc::clone(&ctx);
            handles.push(std::thread::spawn(move || {
                (0..PER_THREAD).map(|_| ctx.allocate_nonce()).collect::<Vec<_>>()
            }));
        }

        let mut seen = BTreeSet::new();
        for handle in handles {
            for nonce in handle.join().unwrap() {
                assert!(seen.insert(nonce), "nonce {nonce} handed out twice");
            }
        }

        // Distinct and contiguous: exactly [100, 100 + N).
        let total = (THREADS * PER_THREAD) as u64;
        assert_eq!(seen.len() as u64, total);
        assert_eq!(*seen.first().unwrap(), 100);
        assert_eq!(*seen.last().unwrap(), 100 + total - 1);
    }

    #[test]
    fn test_calldata_for_whitelist_embeds_cached_role() {
        let ctx = test_context(0);
        let target = Address::repeat_byte(0x03);
        let data = ctx.calldata_for(&ValidOperation::Whitelist { target });

        assert_eq!(data.len(), 4 + 64);
        assert_eq!(&data[4..36], ctx.whitelisted_role().as_slice());
        assert_eq!(&data[48..68], target.as_slice());
    }

    #[test]
    fn test_calldata_for_mint_matches_encoder() {
        let ctx = test_context(0);
        let target = Address::repeat_byte(0x04);
        let amount = U256::from(42u64);
        let data = ctx.calldata_for(&ValidOperation::Mint { target, amount });

        assert_eq!(
            data,
            crate::abi::encode_call(
                crate::abi::MINT_SIG,
                &[AbiValue::Address(target), AbiValue::Uint(amount)],
            )
        );
    }
}
