//! Configuration loading.
//!
//! All settings come from a TOML file selected on the command line, with the
//! signing key overridable through the environment so it can stay out of the
//! file entirely.

use serde::{Deserialize, Serialize};

/// Environment variable that overrides `wallet.private_key`.
pub const PRIVATE_KEY_ENV: &str = "TOKEN_SERVICE_PRIVATE_KEY";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ledger RPC endpoint configuration.
    pub rpc: RpcConfig,

    /// Signing wallet configuration.
    pub wallet: WalletConfig,

    /// Target contract configuration.
    pub contract: ContractConfig,

    /// Transaction submission policy.
    #[serde(default)]
    pub submission: SubmissionConfig,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL.
    pub url: String,

    /// Chain identifier used when signing.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Request timeout in seconds.
    #[serde(default = "default_rpc_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Hex-encoded signing key. Prefer the environment override; never logged.
    #[serde(default)]
    pub private_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Address of the token contract all calls target.
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Gas limit attached to every call.
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,

    /// Block until the ledger reports inclusion and read the receipt status,
    /// instead of returning right after pool acceptance.
    #[serde(default = "default_true")]
    pub wait_for_inclusion: bool,

    /// Bound on concurrently in-flight operations within one batch.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    /// Receipt poll interval in milliseconds.
    #[serde(default = "default_receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,

    /// Give up waiting for inclusion after this many seconds.
    #[serde(default = "default_receipt_timeout")]
    pub receipt_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Basic-auth username.
    #[serde(default = "default_auth_user")]
    pub auth_user: String,

    /// Basic-auth password.
    #[serde(default = "default_auth_pass")]
    pub auth_pass: String,
}

// Default value functions
fn default_chain_id() -> u64 { 1 }
fn default_rpc_timeout() -> u64 { 30 }
fn default_gas_limit() -> u64 { 300_000 }
fn default_max_in_flight() -> usize { 8 }
fn default_receipt_poll_interval_ms() -> u64 { 1_000 }
fn default_receipt_timeout() -> u64 { 120 }
fn default_bind_addr() -> String { "0.0.0.0:8080".to_string() }
fn default_auth_user() -> String { "admin".to_string() }
fn default_auth_pass() -> String { "pass".to_string() }
fn default_true() -> bool { true }

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            gas_limit: default_gas_limit(),
            wait_for_inclusion: default_true(),
            max_in_flight: default_max_in_flight(),
            receipt_poll_interval_ms: default_receipt_poll_interval_ms(),
            receipt_timeout_secs: default_receipt_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            auth_user: default_auth_user(),
            auth_pass: default_auth_pass(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, applying environment overrides.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        if let Ok(key) = std::env::var(PRIVATE_KEY_ENV) {
            config.wallet.private_key = key;
        }
        if config.wallet.private_key.is_empty() {
            anyhow::bail!(
                "no signing key: set wallet.private_key or {}",
                PRIVATE_KEY_ENV
            );
        }

        Ok(config)
    }
}
