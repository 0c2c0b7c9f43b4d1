//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, confirmations >= 1)
//! - Check that endpoints, addresses and amounts parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use alloy::primitives::Address;

use crate::blockchain::units::parse_eth;
use crate::config::schema::RelayConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// Human readable explanation.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let chain = &config.blockchain;
    if chain.rpc_urls.is_empty() {
        errors.push(ValidationError::new("blockchain.rpc_urls", "at least one endpoint is required"));
    }
    for rpc_url in &chain.rpc_urls {
        if let Err(e) = rpc_url.parse::<url::Url>() {
            errors.push(ValidationError::new(
                "blockchain.rpc_urls",
                format!("invalid URL '{}': {}", rpc_url, e),
            ));
        }
    }
    if chain.chain_id == 0 {
        errors.push(ValidationError::new("blockchain.chain_id", "must be non-zero"));
    }
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be greater than 0"));
    }
    if chain.confirmation_blocks == 0 {
        errors.push(ValidationError::new("blockchain.confirmation_blocks", "must be at least 1"));
    }
    if chain.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "blockchain.confirmation_timeout_secs",
            "must be greater than 0",
        ));
    }
    if chain.poll_interval_ms == 0 {
        errors.push(ValidationError::new("blockchain.poll_interval_ms", "must be greater than 0"));
    }
    if chain.gas_limit < 21_000 {
        errors.push(ValidationError::new(
            "blockchain.gas_limit",
            "must cover the 21000 intrinsic gas of a transfer",
        ));
    }

    let transfer = &config.transfer;
    if transfer.treasury_address.parse::<Address>().is_err() {
        errors.push(ValidationError::new(
            "transfer.treasury_address",
            format!("'{}' is not an address", transfer.treasury_address),
        ));
    }
    match parse_eth(&transfer.default_amount_eth) {
        Some(amount) if !amount.is_zero() => {}
        _ => errors.push(ValidationError::new(
            "transfer.default_amount_eth",
            "must be a positive ETH amount",
        )),
    }
    if parse_eth(&transfer.reserve_eth).is_none() {
        errors.push(ValidationError::new("transfer.reserve_eth", "must be an ETH amount"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RelayConfig::default();
        config.blockchain.rpc_urls = vec!["not a url".to_string()];
        config.blockchain.confirmation_blocks = 0;
        config.transfer.treasury_address = "0x1234".to_string();
        config.transfer.default_amount_eth = "0".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"blockchain.rpc_urls"));
        assert!(fields.contains(&"blockchain.confirmation_blocks"));
        assert!(fields.contains(&"transfer.treasury_address"));
        assert!(fields.contains(&"transfer.default_amount_eth"));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_empty_endpoint_list() {
        let mut config = RelayConfig::default();
        config.blockchain.rpc_urls.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].to_string(), "blockchain.rpc_urls: at least one endpoint is required");
    }

    #[test]
    fn test_bad_bind_address() {
        let mut config = RelayConfig::default();
        config.listener.bind_address = "localhost".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "listener.bind_address");
    }
}
