//! Chain-specific types and error definitions.

use alloy::primitives::{Address, TxHash, U256};
use thiserror::Error;

// Re-export BlockchainConfig from config module to avoid duplication
pub use crate::config::schema::BlockchainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction was not confirmed within expected time.
    #[error("Transaction {tx_hash} not confirmed after {secs} seconds")]
    ConfirmationTimeout { tx_hash: TxHash, secs: u64 },

    /// Transaction was reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(TxHash),

    /// Invalid private key format or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// A configured endpoint is not a valid URL.
    #[error("Invalid RPC URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Every candidate endpoint failed its liveness check.
    #[error("No RPC endpoint reachable ({tried} tried, last error: {last_error})")]
    NoEndpointReachable { tried: usize, last_error: String },
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Transaction confirmation status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Transaction is pending in mempool.
    Pending,
    /// Transaction has been mined but not enough confirmations.
    Confirming { current: u64, required: u64 },
    /// Transaction is confirmed with required block depth.
    Confirmed { block_number: u64, gas_used: u64 },
}

/// A value transfer that reached the required confirmation depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedTransfer {
    pub tx_hash: TxHash,
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub block_number: u64,
    pub gas_used: u64,
}
