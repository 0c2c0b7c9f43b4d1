//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key)
//!     → wallet.rs (key loading, signing)
//!     → client.rs (ordered endpoint probing, RPC with timeouts)
//!     → transaction.rs (build, sign, broadcast, confirm)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod units;
pub mod wallet;

pub use client::BlockchainClient;
pub use transaction::TxBuilder;
pub use types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainId, ConfirmedTransfer};
pub use wallet::Wallet;
