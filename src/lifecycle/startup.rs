//! Startup orchestration.
//!
//! The only place that turns configuration and environment into live
//! components. Everything downstream receives its dependencies from the
//! [`AppContext`] built here.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::chain::{connect_backend, BackendInitError, LedgerBackend};
use crate::config::{apply_env_overrides, load_config, ConfigError, GatewayConfig};
use crate::ledger::EnergyLedger;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendInitError),
}

/// Components shared by the server and the tools.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<GatewayConfig>,
    pub backend: Arc<dyn LedgerBackend>,
    pub ledger: EnergyLedger,
}

/// Read the config file (defaults when absent) and apply environment overrides.
pub fn resolve_config<F>(path: Option<&Path>, lookup: F) -> Result<GatewayConfig, StartupError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading configuration");
            load_config(path)?
        }
        None => GatewayConfig::default(),
    };
    apply_env_overrides(&mut config, lookup)?;
    Ok(config)
}

/// Build the backend and the ledger on top of it. Issues no network traffic.
pub fn bootstrap<F>(config: GatewayConfig, lookup: F) -> Result<AppContext, StartupError>
where
    F: Fn(&str) -> Option<String>,
{
    let backend = connect_backend(
        &config.chain,
        Duration::from_secs(config.timeouts.upstream_secs),
        lookup,
    )?;

    tracing::info!(
        backend = ?config.chain.backend,
        network = %config.chain.network,
        api = %backend.endpoints().api,
        "Ledger backend ready"
    );

    Ok(AppContext {
        config: Arc::new(config),
        ledger: EnergyLedger::new(backend.clone()),
        backend,
    })
}

/// Connectivity check. A failure is logged, never fatal.
pub async fn probe(backend: &dyn LedgerBackend) -> bool {
    match backend.health().await {
        Ok(()) => {
            tracing::info!(api = %backend.endpoints().api, "Ledger connection verified");
            true
        }
        Err(e) => {
            tracing::warn!(api = %backend.endpoints().api, error = %e, "Ledger health check failed");
            false
        }
    }
}
