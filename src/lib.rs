//! Token submission service.
//!
//! Submits role-grant ("whitelist") and mint calls against a single token
//! contract on behalf of one shared signing identity. The core is the
//! transaction orchestration: strictly-ordered nonce allocation under
//! concurrent callers, pre-flight gas estimation against the exact call
//! encoding, signed submission, and per-item outcome aggregation for
//! batches.

pub mod abi;
pub mod config;
pub mod error;
pub mod ledger;
pub mod server;
pub mod token;
pub mod types;

pub use config::Config;
pub use error::{TokenError, TokenResult};
pub use token::{BatchDispatcher, TokenContext};
