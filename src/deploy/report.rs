//! Persisted record of a successful deployment.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chain::{Network, NetworkEndpoints, TransactionId};
use crate::deploy::orchestrator::{DeployError, DeploymentOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRecord {
    pub contract_id: String,
    pub contract_address: String,
    pub transaction_id: TransactionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub environment: Network,
    pub timestamp: DateTime<Utc>,
    pub contracts: BTreeMap<String, ContractRecord>,
}

impl DeploymentRecord {
    pub fn new(environment: Network, outcome: &DeploymentOutcome) -> Self {
        let contracts = outcome
            .resources
            .iter()
            .map(|r| {
                (
                    r.key.clone(),
                    ContractRecord {
                        contract_id: r.contract.contract_id.clone(),
                        contract_address: r.contract.contract_address.clone(),
                        transaction_id: r.contract.transaction_id.clone(),
                    },
                )
            })
            .collect();

        Self {
            environment,
            timestamp: Utc::now(),
            contracts,
        }
    }

    /// `maschain-<environment>-<epoch millis>.json`
    pub fn file_name(&self) -> String {
        format!(
            "maschain-{}-{}.json",
            self.environment,
            self.timestamp.timestamp_millis()
        )
    }

    /// Write the record as pretty JSON under `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, DeployError> {
        let path = dir.join(self.file_name());
        let persist_err = |source: std::io::Error| DeployError::Persist {
            path: path.display().to_string(),
            source,
        };

        fs::create_dir_all(dir).map_err(persist_err)?;
        let json = serde_json::to_string_pretty(self).map_err(|e| persist_err(e.into()))?;
        fs::write(&path, json).map_err(persist_err)?;

        tracing::info!(path = %path.display(), "Deployment record saved");
        Ok(path)
    }

    /// Human-readable summary with explorer links.
    pub fn summary(&self, endpoints: &NetworkEndpoints) -> String {
        let mut out = format!("Environment: {}\n", self.environment);
        for (key, contract) in &self.contracts {
            out.push_str(&format!(
                "{}: {}\n  address: {}\n  explorer: {}\n",
                key,
                contract.contract_id,
                contract.contract_address,
                endpoints.transaction_url(&contract.transaction_id),
            ));
        }
        out
    }
}
