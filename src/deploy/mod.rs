//! Contract deployment.
//!
//! # Data Flow
//! ```text
//! templates.rs (what to create)
//!     → orchestrator.rs (submit all, poll each in order)
//!     → report.rs (JSON record on disk)
//! ```

pub mod orchestrator;
pub mod report;
pub mod templates;

pub use orchestrator::{DeployError, DeployedResource, Deployer, DeploymentOutcome, PollPolicy};
pub use report::{ContractRecord, DeploymentRecord};
pub use templates::{standard_plan, ContractTemplate, TemplateKind};
