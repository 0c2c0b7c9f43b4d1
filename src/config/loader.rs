//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Names the optional TOML file layered over the defaults.
pub const CONFIG_PATH_ENV_VAR: &str = "RELAY_CONFIG";

/// Overrides the listener port (binds on all interfaces).
pub const PORT_ENV_VAR: &str = "PORT";

/// Comma-separated override for the candidate RPC endpoints.
pub const RPC_URLS_ENV_VAR: &str = "RELAY_RPC_URLS";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    InvalidEnv { var: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::InvalidEnv { var, value } => {
                write!(f, "Invalid value '{}' for {}", value, var)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: RelayConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build the effective configuration: defaults, then the file named by
/// `RELAY_CONFIG` (if set), then `PORT` / `RELAY_RPC_URLS` overrides.
pub fn load_from_env() -> Result<RelayConfig, ConfigError> {
    let mut config = match std::env::var(CONFIG_PATH_ENV_VAR) {
        Ok(path) => {
            tracing::info!(path = %path, "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        Err(_) => RelayConfig::default(),
    };

    apply_overrides(
        &mut config,
        std::env::var(PORT_ENV_VAR).ok().as_deref(),
        std::env::var(RPC_URLS_ENV_VAR).ok().as_deref(),
    )?;

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment-style overrides to a configuration.
pub fn apply_overrides(
    config: &mut RelayConfig,
    port: Option<&str>,
    rpc_urls: Option<&str>,
) -> Result<(), ConfigError> {
    if let Some(port) = port {
        let port: u16 = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            var: PORT_ENV_VAR,
            value: port.to_string(),
        })?;
        config.listener.bind_address = format!("0.0.0.0:{}", port);
    }

    if let Some(rpc_urls) = rpc_urls {
        let urls: Vec<String> = rpc_urls
            .split(',')
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .collect();
        if !urls.is_empty() {
            config.blockchain.rpc_urls = urls;
        }
    }

    Ok(())
}
