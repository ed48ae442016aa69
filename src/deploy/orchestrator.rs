//! Submit contracts, then poll each one to a terminal state.
//!
//! Submission happens for every template first, in order. Polling then walks
//! the same order, one resource at a time. A `failed` status or an exhausted
//! budget ends the whole run; resources after it are left unpolled and
//! reported as abandoned.

use std::sync::Arc;
use std::time::Duration;

use crate::chain::{ChainError, DeployedContract, DeploymentStatus, LedgerBackend};
use crate::config::DeploymentConfig;
use crate::deploy::templates::ContractTemplate;
use crate::observability::metrics;
use crate::resilience::{poll_until, PollError, PollStatus};

/// Polling cadence for deployment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_attempts: 30,
        }
    }
}

impl From<&DeploymentConfig> for PollPolicy {
    fn from(config: &DeploymentConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.max_attempts,
        }
    }
}

/// A contract that reached `deployed`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployedResource {
    pub key: String,
    pub contract: DeployedContract,
    /// Status queries it took, including the one that saw `deployed`.
    pub attempts: u32,
}

/// Every resource of a successful run, in submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeploymentOutcome {
    pub resources: Vec<DeployedResource>,
}

impl DeploymentOutcome {
    pub fn get(&self, key: &str) -> Option<&DeployedResource> {
        self.resources.iter().find(|r| r.key == key)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("poll policy needs a non-zero interval and at least one attempt (got {interval:?}, {max_attempts})")]
    InvalidPolicy { interval: Duration, max_attempts: u32 },

    #[error("failed to submit {key}: {source}")]
    Submit {
        key: String,
        #[source]
        source: ChainError,
    },

    #[error("{key} ({contract_id}) reported failed after {attempts} status checks")]
    Failed {
        key: String,
        contract_id: String,
        attempts: u32,
        abandoned: Vec<String>,
    },

    #[error("{key} ({contract_id}) not deployed after {attempts} status checks")]
    Timeout {
        key: String,
        contract_id: String,
        attempts: u32,
        abandoned: Vec<String>,
    },

    #[error("failed to write deployment record {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DeployError {
    /// Contract ids that were submitted but never polled.
    pub fn abandoned(&self) -> &[String] {
        match self {
            DeployError::Failed { abandoned, .. } | DeployError::Timeout { abandoned, .. } => abandoned,
            _ => &[],
        }
    }
}

/// Drives contract deployment against one backend.
pub struct Deployer {
    backend: Arc<dyn LedgerBackend>,
    policy: PollPolicy,
}

impl Deployer {
    pub fn new(backend: Arc<dyn LedgerBackend>, policy: PollPolicy) -> Self {
        Self { backend, policy }
    }

    /// Nothing is submitted when the policy could never confirm a contract.
    pub async fn deploy_all(&self, templates: &[ContractTemplate]) -> Result<DeploymentOutcome, DeployError> {
        if self.policy.max_attempts == 0 || self.policy.interval.is_zero() {
            return Err(DeployError::InvalidPolicy {
                interval: self.policy.interval,
                max_attempts: self.policy.max_attempts,
            });
        }

        let mut submitted = Vec::with_capacity(templates.len());
        for template in templates {
            tracing::info!(key = %template.key, template = template.kind.as_str(), "Submitting contract");
            let contract = self
                .backend
                .create_contract(template)
                .await
                .map_err(|source| DeployError::Submit {
                    key: template.key.clone(),
                    source,
                })?;
            tracing::info!(
                key = %template.key,
                contract_id = %contract.contract_id,
                transaction_id = %contract.transaction_id,
                "Contract submitted"
            );
            submitted.push((template.key.clone(), contract));
        }

        let mut outcome = DeploymentOutcome::default();
        for (index, (key, contract)) in submitted.iter().enumerate() {
            let abandoned = || {
                submitted[index + 1..]
                    .iter()
                    .map(|(_, c)| c.contract_id.clone())
                    .collect::<Vec<_>>()
            };

            match self.wait_for(key, &contract.contract_id).await {
                Ok(attempts) => {
                    tracing::info!(key = %key, contract_id = %contract.contract_id, attempts, "Contract deployed");
                    let mut contract = contract.clone();
                    contract.status = DeploymentStatus::Deployed;
                    outcome.resources.push(DeployedResource {
                        key: key.clone(),
                        contract,
                        attempts,
                    });
                }
                Err(PollError::Failed { attempts, .. }) => {
                    return Err(DeployError::Failed {
                        key: key.clone(),
                        contract_id: contract.contract_id.clone(),
                        attempts,
                        abandoned: abandoned(),
                    });
                }
                Err(PollError::Exhausted { attempts }) => {
                    return Err(DeployError::Timeout {
                        key: key.clone(),
                        contract_id: contract.contract_id.clone(),
                        attempts,
                        abandoned: abandoned(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    async fn wait_for(&self, key: &str, contract_id: &str) -> Result<u32, PollError<()>> {
        let backend = &self.backend;
        let max_attempts = self.policy.max_attempts;

        let result = poll_until(self.policy.interval, max_attempts, move |attempt| async move {
            match backend.contract_status(contract_id).await {
                Ok(DeploymentStatus::Deployed) => {
                    metrics::record_poll_attempt("deployed");
                    PollStatus::Ready(())
                }
                Ok(DeploymentStatus::Failed) => {
                    metrics::record_poll_attempt("failed");
                    tracing::error!(key, contract_id, attempt, "Contract deployment failed");
                    PollStatus::Failed(())
                }
                Ok(status) => {
                    metrics::record_poll_attempt("pending");
                    tracing::debug!(key, contract_id, attempt, max_attempts, status = ?status, "Waiting for deployment");
                    PollStatus::Pending
                }
                Err(e) => {
                    metrics::record_poll_attempt("error");
                    tracing::warn!(key, contract_id, attempt, error = %e, "Status check failed");
                    PollStatus::Pending
                }
            }
        })
        .await;

        if let Err(PollError::Exhausted { attempts }) = &result {
            tracing::error!(key, contract_id, attempts, "Contract deployment timed out");
        }
        result.map(|((), attempts)| attempts)
    }
}
