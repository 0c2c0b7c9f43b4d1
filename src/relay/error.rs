//! Relay error taxonomy.

use alloy::primitives::U256;
use thiserror::Error;

use crate::blockchain::wallet::PRIVATE_KEY_ENV_VAR;
use crate::blockchain::BlockchainError;

/// Errors surfaced by relay operations.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No signing key is configured for this process.
    #[error("Wallet not configured: set {} to enable transfers", PRIVATE_KEY_ENV_VAR)]
    SignerUnavailable,

    /// Request body could not be decoded.
    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    /// Destination is not a valid address.
    #[error("Invalid destination address: {0}")]
    InvalidDestination(String),

    /// Balance cannot cover the reserve or the transfer.
    #[error("{message}")]
    InsufficientFunds { message: String, balance: U256 },

    /// Connectivity, RPC, signing, broadcast or confirmation failure.
    #[error(transparent)]
    Blockchain(#[from] BlockchainError),
}

impl RelayError {
    /// True for errors caused by the caller or the wallet's funding rather
    /// than by the relay or the network.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RelayError::InvalidRequest(_)
                | RelayError::InvalidDestination(_)
                | RelayError::InsufficientFunds { .. }
        )
    }

    /// Short label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::SignerUnavailable => "signer_unavailable",
            RelayError::InvalidRequest(_) | RelayError::InvalidDestination(_) => "invalid_request",
            RelayError::InsufficientFunds { .. } => "insufficient_funds",
            RelayError::Blockchain(BlockchainError::NoEndpointReachable { .. }) => "no_endpoint",
            RelayError::Blockchain(_) => "failed",
        }
    }
}
