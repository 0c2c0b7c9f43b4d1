//! Relay subsystem.
//!
//! # Data Flow
//! ```text
//! POST body
//!     → types.rs (amount / destination with aliases and defaults)
//!     → service.rs (signer check, bootstrap, balance vs reserve)
//!     → blockchain::TxBuilder (nonce, gas price, sign, broadcast, confirm)
//!     → types.rs (TransferResponse)
//! ```

pub mod error;
pub mod service;
pub mod types;

pub use error::RelayError;
pub use service::RelayService;
pub use types::{
    transferable_amount, BalanceResponse, StatusResponse, TransferPolicy, TransferRequest,
    TransferResponse,
};
