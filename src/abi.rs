//! Contract call encoding.
//!
//! Calldata layout: the first 4 bytes are the method selector (leading bytes
//! of the keccak-256 hash of the canonical signature string), followed by
//! each argument as a 32-byte big-endian word, left-zero-padded. Addresses
//! occupy the low 20 bytes of their word; integers are right-aligned.
//!
//! The estimator and the submitter both build calldata through this module,
//! so the payload the node estimated is byte-for-byte the payload that gets
//! signed and sent.

use alloy_primitives::{keccak256, Address, B256, U256};

/// Canonical signature of the role-grant method.
pub const GRANT_ROLE_SIG: &str = "grantRole(bytes32,address)";

/// Canonical signature of the mint method.
pub const MINT_SIG: &str = "mint(address,uint256)";

/// A single encodable call argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Uint(U256),
    FixedBytes(B256),
}

impl AbiValue {
    fn to_word(&self) -> [u8; 32] {
        match self {
            AbiValue::Address(address) => {
                let mut word = [0u8; 32];
                word[12..].copy_from_slice(address.as_slice());
                word
            }
            AbiValue::Uint(value) => value.to_be_bytes::<32>(),
            AbiValue::FixedBytes(bytes) => bytes.0,
        }
    }
}

/// First 4 bytes of the keccak-256 hash of the canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Build the full calldata for a method call.
pub fn encode_call(signature: &str, args: &[AbiValue]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 32 * args.len());
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(&arg.to_word());
    }
    data
}
