//! Ledger-specific types and error definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Network profile the gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Testnet,
    Mainnet,
}

impl Network {
    /// Provider API base URL.
    pub fn base_url(&self) -> &'static str {
        match self {
            Network::Testnet => "https://service-testnet.maschain.com",
            Network::Mainnet => "https://service.maschain.com",
        }
    }

    /// Block explorer base URL.
    pub fn explorer_url(&self) -> &'static str {
        match self {
            Network::Testnet => "https://explorer-testnet.maschain.com",
            Network::Mainnet => "https://explorer.maschain.com",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(ChainError::Config(format!("unknown network '{}'", other))),
        }
    }
}

/// Where a backend lives and where its transactions can be inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkEndpoints {
    #[serde(skip)]
    pub network: Network,
    pub api: String,
    pub explorer: String,
}

impl NetworkEndpoints {
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            api: network.base_url().to_string(),
            explorer: network.explorer_url().to_string(),
        }
    }

    /// Explorer link for a transaction.
    pub fn transaction_url(&self, transaction_id: &TransactionId) -> String {
        format!("{}/tx/{}", self.explorer, transaction_id)
    }

    /// Explorer link for a wallet address.
    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer, address)
    }
}

/// Opaque transaction identifier returned by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub String);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Opaque offer identifier returned by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferId(pub String);

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of meter reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingType {
    Production,
    Consumption,
}

/// A meter reading to anchor on the ledger.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterReading {
    pub meter_id: String,
    pub reading_value: f64,
    pub reading_type: ReadingType,
    pub signature: String,
}

/// How an offer is fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OfferType {
    #[default]
    Immediate,
    Scheduled,
    Recurring,
}

/// A sell offer for energy.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyOffer {
    pub seller_wallet: String,
    pub energy_amount: f64,
    pub price_per_kwh: f64,
    pub offer_type: OfferType,
    /// Lifetime in minutes.
    pub duration: u32,
}

/// A purchase against an existing offer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOrder {
    pub offer_id: String,
    pub buyer_wallet: String,
    pub amount: f64,
}

/// An energy credit transfer between wallets.
#[derive(Debug, Clone, Serialize)]
pub struct Transfer {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

/// A freshly created wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub wallet_id: String,
    pub wallet_address: String,
    #[serde(default)]
    pub balance: f64,
}

/// Deployment state of a contract as reported by the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    #[default]
    Pending,
    Deployed,
    Failed,
    /// Any status string the ledger invents beyond the three above.
    #[serde(other)]
    Unknown,
}

/// Result of a contract creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedContract {
    pub contract_id: String,
    pub contract_address: String,
    pub transaction_id: TransactionId,
    /// Polling decides the outcome; a creation response may omit this.
    #[serde(default)]
    pub status: DeploymentStatus,
}

/// Paging parameters for history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self { limit: 10, offset: 0 }
    }
}

/// One page of a wallet's transaction history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionPage {
    #[serde(default)]
    pub transactions: Vec<serde_json::Value>,
    #[serde(default)]
    pub total: u64,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Connection or transport failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider answered with a payload we could not read.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The ledger refused the operation.
    #[error("rejected: {0}")]
    Rejected(String),

    /// Referenced wallet, offer, contract or transaction does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Client could not be built from its configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for ledger operations.
pub type ChainResult<T> = Result<T, ChainError>;
