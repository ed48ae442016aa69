//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, poll budget > 0)
//! - Validate addresses and URLs before any subsystem starts
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than 0")]
    Zero(&'static str),

    #[error("chain.base_url '{0}' is not a valid http(s) URL")]
    InvalidBaseUrl(String),

    #[error("chain.simulated.initial_balance must be a finite, non-negative number")]
    InvalidInitialBalance,

    #[error("deployment.output_dir must not be empty")]
    EmptyOutputDir,
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.upstream_secs"));
    }
    if config.deployment.poll_interval_ms == 0 {
        errors.push(ValidationError::Zero("deployment.poll_interval_ms"));
    }
    if config.deployment.max_attempts == 0 {
        errors.push(ValidationError::Zero("deployment.max_attempts"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }
    if config.security.rate_limit.enabled {
        if config.security.rate_limit.requests_per_second == 0 {
            errors.push(ValidationError::Zero("security.rate_limit.requests_per_second"));
        }
        if config.security.rate_limit.burst_size == 0 {
            errors.push(ValidationError::Zero("security.rate_limit.burst_size"));
        }
    }
    if config.deployment.output_dir.trim().is_empty() {
        errors.push(ValidationError::EmptyOutputDir);
    }

    if let Some(base_url) = &config.chain.base_url {
        let valid = url::Url::parse(base_url)
            .map(|u| matches!(u.scheme(), "http" | "https") && !u.cannot_be_a_base())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::InvalidBaseUrl(base_url.clone()));
        }
    }

    let initial = config.chain.simulated.initial_balance;
    if !initial.is_finite() || initial < 0.0 {
        errors.push(ValidationError::InvalidInitialBalance);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
