//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → loader.rs (environment overrides: MASCHAIN_ENVIRONMENT)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//!
//! environment
//!     → credentials.rs (API key, secret, project id)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Credentials never live in the config file

pub mod credentials;
pub mod loader;
pub mod schema;
pub mod validation;

pub use credentials::Credentials;
pub use loader::{apply_env_overrides, load_config, ConfigError};
pub use schema::{
    BackendKind, ChainConfig, DeploymentConfig, GatewayConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, RateLimitConfig, SecurityConfig, SimulatedConfig, TimeoutConfig,
};
