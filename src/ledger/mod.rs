//! Energy trading operations.
//!
//! Every submission is validated here before the backend sees it. Balance
//! reads are the one operation that never fails: errors read as zero.

pub mod service;
pub mod validate;

pub use service::{EnergyLedger, LedgerError, LedgerResult};
pub use validate::ValidationError;
