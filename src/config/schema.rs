//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.
//! Credentials are not part of the schema; they come from the environment
//! (see [`crate::config::credentials`]).

use serde::{Deserialize, Serialize};

use crate::chain::Network;

/// Root configuration for the energy gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Ledger backend selection and network profile.
    pub chain: ChainConfig,

    /// Contract deployment polling settings.
    pub deployment: DeploymentConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request limits, CORS and response hardening.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Inbound request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Timeout for a single call to the ledger provider in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 30,
        }
    }
}

/// Which ledger adapter serves the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// MasChain L1 HTTP API.
    #[default]
    Maschain,
    /// In-process ledger for demos and local development.
    Simulated,
}

/// Ledger backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Adapter selection.
    pub backend: BackendKind,

    /// Network profile (testnet or mainnet).
    pub network: Network,

    /// Override for the provider base URL (defaults to the network's URL).
    pub base_url: Option<String>,

    /// Settings for the simulated backend.
    pub simulated: SimulatedConfig,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Maschain,
            network: Network::Testnet,
            base_url: None,
            simulated: SimulatedConfig::default(),
        }
    }
}

/// Simulated ledger behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulatedConfig {
    /// Energy credits granted to every newly created wallet.
    pub initial_balance: f64,

    /// Status queries a contract stays pending before it reports deployed.
    pub confirmations_required: u32,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            initial_balance: 100.0,
            confirmations_required: 1,
        }
    }
}

/// Contract deployment configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Delay between status polls in milliseconds.
    pub poll_interval_ms: u64,

    /// Maximum status polls per contract.
    pub max_attempts: u32,

    /// Directory receiving deployment records.
    pub output_dir: String,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            max_attempts: 30,
            output_dir: "deployments".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty output for development, JSON for production.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
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
    /// Origins allowed by CORS; empty allows any origin.
    pub allowed_origins: Vec<String>,
    /// Add hardening headers (nosniff, frame options, HSTS) to every response.
    pub security_headers: bool,
    /// Per-client request rate limiting.
    pub rate_limit: RateLimitConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // 10MB
            allowed_origins: vec!["http://localhost:3000".to_string()],
            security_headers: true,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Token bucket rate limiting, keyed by client IP.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Sustained requests per second per client.
    pub requests_per_second: u32,

    /// Burst capacity.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: 10,
            burst_size: 100,
        }
    }
}
