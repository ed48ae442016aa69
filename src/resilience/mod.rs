//! Resilience primitives.
//!
//! # Data Flow
//! ```text
//! deploy::Deployer
//!     → poll.rs (fixed interval, bounded attempts, terminal-state detection)
//! ```
//!
//! Remote submissions are never retried; only status queries are polled.

pub mod poll;

pub use poll::{poll_until, PollError, PollStatus};
