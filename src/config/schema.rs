//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Blockchain integration settings.
    pub blockchain: BlockchainConfig,

    /// Transfer policy (treasury, default amount, gas reserve).
    pub transfer: TransferConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for HTTP requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    ///
    /// Transfers block until confirmation, so this must exceed
    /// `blockchain.confirmation_timeout_secs`.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 600 }
    }
}

/// Blockchain integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// Candidate JSON-RPC endpoints, probed in order.
    pub rpc_urls: Vec<String>,

    /// Chain ID (1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of blocks (including the inclusion block) to wait for.
    pub confirmation_blocks: u64,

    /// Upper bound on the confirmation wait in seconds.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,

    /// Gas limit for a plain value transfer.
    pub gas_limit: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_urls: vec![
                "https://eth.llamarpc.com".to_string(),
                "https://ethereum-rpc.publicnode.com".to_string(),
                "https://rpc.ankr.com/eth".to_string(),
                "https://cloudflare-eth.com".to_string(),
            ],
            chain_id: 1,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            confirmation_timeout_secs: 300,
            poll_interval_ms: 2000,
            gas_limit: 21_000,
        }
    }
}

/// Transfer policy configuration.
///
/// Amounts are decimal strings in whole ETH so they survive TOML untouched.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Destination used when the request names none.
    pub treasury_address: String,

    /// Amount used when the request omits one or it cannot be parsed.
    pub default_amount_eth: String,

    /// Balance withheld from every transfer to pay for gas.
    pub reserve_eth: String,

    /// Hold a per-signer lock for the whole transfer (nonce fetch to
    /// confirmation).
    pub serialize_transfers: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            treasury_address: "0x71C7656EC7ab88b098defB751B7401B5f6d8976F".to_string(),
            default_amount_eth: "0.01".to_string(),
            reserve_eth: "0.002".to_string(),
            serialize_transfers: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024,
        }
    }
}
