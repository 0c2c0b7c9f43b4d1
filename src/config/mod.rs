//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (RelayConfig::default)
//!     → optional TOML file (RELAY_CONFIG)
//!     → environment overrides (PORT, RELAY_RPC_URLS)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → shared with the relay service and HTTP server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The signing key is never part of the config; see `blockchain::wallet`

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{
    BlockchainConfig, ListenerConfig, ObservabilityConfig, RelayConfig, SecurityConfig,
    TimeoutConfig, TransferConfig,
};
pub use validation::{validate_config, ValidationError};
