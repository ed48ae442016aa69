//! Ledger access.
//!
//! # Data Flow
//! ```text
//! ledger / deploy
//!     → backend.rs (LedgerBackend trait, adapter selection)
//!         → maschain.rs → client.rs (authenticated REST calls)
//!         → simulated.rs (in-process state)
//! ```

pub mod backend;
pub mod client;
pub mod maschain;
pub mod simulated;
pub mod types;

pub use backend::{connect_backend, BackendInitError, LedgerBackend};
pub use client::ApiClient;
pub use maschain::MasChainBackend;
pub use simulated::SimulatedLedger;
pub use types::{
    ChainError, ChainResult, DeployedContract, DeploymentStatus, EnergyOffer, MeterReading, Network,
    NetworkEndpoints, OfferId, OfferType, Page, ReadingType, TradeOrder, TransactionId,
    TransactionPage, Transfer, WalletInfo,
};
