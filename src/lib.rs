//! Energy trading gateway.
//!
//! Exposes wallet, market and oracle operations over HTTP and deploys the
//! trading contracts, all backed by a pluggable ledger.

pub mod chain;
pub mod config;
pub mod deploy;
pub mod http;
pub mod ledger;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
