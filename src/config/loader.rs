//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::chain::Network;
use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable selecting the network profile.
pub const NETWORK_ENV_VAR: &str = "MASCHAIN_ENVIRONMENT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("Missing MasChain configuration. Please set {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("Invalid value '{value}' for {name}: expected 'testnet' or 'mainnet'")]
    InvalidNetwork { name: &'static str, value: String },
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides on top of a loaded configuration.
///
/// `lookup` is `std::env::var` in production; tests pass a closure over a map.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(NETWORK_ENV_VAR).filter(|v| !v.trim().is_empty()) {
        config.chain.network =
            value
                .trim()
                .parse::<Network>()
                .map_err(|_| ConfigError::InvalidNetwork {
                    name: NETWORK_ENV_VAR,
                    value,
                })?;
    }
    Ok(())
}

/// Read a variable from the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
