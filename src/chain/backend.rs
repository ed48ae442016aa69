//! Ledger capability interface and adapter selection.
//!
//! Every ledger the gateway can talk to is reached through [`LedgerBackend`].
//! Callers hold an `Arc<dyn LedgerBackend>` and never know which adapter
//! sits behind it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::chain::client::ApiClient;
use crate::chain::maschain::MasChainBackend;
use crate::chain::simulated::SimulatedLedger;
use crate::chain::types::{
    ChainError, ChainResult, DeployedContract, DeploymentStatus, EnergyOffer, MeterReading,
    NetworkEndpoints, OfferId, Page, TradeOrder, TransactionId, TransactionPage, Transfer,
    WalletInfo,
};
use crate::config::{BackendKind, ChainConfig, ConfigError, Credentials};
use crate::deploy::templates::ContractTemplate;

/// Submit, query-status and query-balance operations against a ledger.
#[async_trait]
pub trait LedgerBackend: Send + Sync {
    /// API and explorer locations of this backend.
    fn endpoints(&self) -> &NetworkEndpoints;

    /// Connectivity probe.
    async fn health(&self) -> ChainResult<()>;

    // --- Submissions ---

    async fn create_wallet(&self, user_id: &str) -> ChainResult<WalletInfo>;

    async fn submit_reading(&self, reading: &MeterReading) -> ChainResult<TransactionId>;

    async fn create_offer(&self, offer: &EnergyOffer) -> ChainResult<OfferId>;

    async fn execute_trade(&self, trade: &TradeOrder) -> ChainResult<TransactionId>;

    async fn send_transfer(&self, transfer: &Transfer) -> ChainResult<TransactionId>;

    async fn create_contract(&self, template: &ContractTemplate) -> ChainResult<DeployedContract>;

    // --- Status queries ---

    async fn contract_status(&self, contract_id: &str) -> ChainResult<DeploymentStatus>;

    async fn contract_info(&self, contract_id: &str) -> ChainResult<Value>;

    async fn transaction_status(&self, transaction_id: &str) -> ChainResult<Value>;

    async fn network_status(&self) -> ChainResult<Value>;

    // --- Reads ---

    async fn balance(&self, wallet_address: &str) -> ChainResult<f64>;

    async fn wallet_info(&self, wallet_address: &str) -> ChainResult<Value>;

    async fn transactions(&self, wallet_address: &str, page: Page) -> ChainResult<TransactionPage>;
}

/// Errors raised while selecting and building a backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendInitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Build the adapter named by the configuration.
///
/// No network traffic happens here: a missing credential fails before any
/// request could be issued.
pub fn connect_backend<F>(
    config: &ChainConfig,
    upstream_timeout: Duration,
    lookup: F,
) -> Result<Arc<dyn LedgerBackend>, BackendInitError>
where
    F: Fn(&str) -> Option<String>,
{
    match config.backend {
        BackendKind::Maschain => {
            let credentials = Credentials::from_lookup(lookup)?;
            let client = match &config.base_url {
                Some(raw) => {
                    let base_url = url::Url::parse(raw)
                        .map_err(|e| ChainError::Config(format!("invalid base URL '{}': {}", raw, e)))?;
                    ApiClient::with_base_url(base_url, config.network, &credentials, upstream_timeout)?
                }
                None => ApiClient::new(config.network, &credentials, upstream_timeout)?,
            };
            Ok(Arc::new(MasChainBackend::new(client)))
        }
        BackendKind::Simulated => {
            tracing::warn!(network = %config.network, "Using simulated ledger; no transactions leave this process");
            Ok(Arc::new(SimulatedLedger::new(config.network, config.simulated.clone())))
        }
    }
}
