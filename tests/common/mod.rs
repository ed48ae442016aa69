//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::Instant;

use energy_gateway::chain::{
    ChainError, ChainResult, DeployedContract, DeploymentStatus, EnergyOffer, LedgerBackend,
    MeterReading, Network, NetworkEndpoints, OfferId, Page, TradeOrder, TransactionId,
    TransactionPage, Transfer, WalletInfo,
};
use energy_gateway::deploy::ContractTemplate;

/// One scripted answer to a status query.
#[derive(Debug, Clone)]
pub enum Step {
    Status(DeploymentStatus),
    Error,
}

/// Backend whose answers are scripted and whose calls are logged.
///
/// Contracts are numbered `c-1`, `c-2`, ... in submission order. A status
/// script that runs dry keeps answering `pending`.
pub struct ScriptedBackend {
    endpoints: NetworkEndpoints,
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    fail_submission: Option<String>,
    balances: HashMap<String, f64>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            endpoints: NetworkEndpoints::for_network(Network::Testnet),
            scripts: Mutex::new(HashMap::new()),
            fail_submission: None,
            balances: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Status answers for contract `id`, consumed in order.
    pub fn with_script(self, id: &str, steps: impl IntoIterator<Item = Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(id.to_string(), steps.into_iter().collect());
        self
    }

    /// `pending` × `pending` then `deployed`.
    pub fn deployed_after(self, id: &str, pending: usize) -> Self {
        let steps = std::iter::repeat(Step::Status(DeploymentStatus::Pending))
            .take(pending)
            .chain(std::iter::once(Step::Status(DeploymentStatus::Deployed)));
        self.with_script(id, steps)
    }

    pub fn failing_submission(mut self, key: &str) -> Self {
        self.fail_submission = Some(key.to_string());
        self
    }

    pub fn with_balance(mut self, address: &str, balance: f64) -> Self {
        self.balances.insert(address.to_string(), balance);
        self
    }

    /// Every call, in order, as `operation:argument`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    /// Calls paired with the (virtual) time they happened.
    pub fn timed_calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push((call, Instant::now()));
    }

    fn submitted(&self) -> usize {
        self.count("create_contract:")
    }
}

#[async_trait]
impl LedgerBackend for ScriptedBackend {
    fn endpoints(&self) -> &NetworkEndpoints {
        &self.endpoints
    }

    async fn health(&self) -> ChainResult<()> {
        self.log("health:".into());
        Ok(())
    }

    async fn create_wallet(&self, user_id: &str) -> ChainResult<WalletInfo> {
        self.log(format!("create_wallet:{}", user_id));
        Ok(WalletInfo {
            wallet_id: format!("w-{}", user_id),
            wallet_address: format!("addr-{}", user_id),
            balance: 0.0,
        })
    }

    async fn submit_reading(&self, reading: &MeterReading) -> ChainResult<TransactionId> {
        self.log(format!("submit_reading:{}", reading.meter_id));
        Ok(TransactionId::from("tx-reading"))
    }

    async fn create_offer(&self, offer: &EnergyOffer) -> ChainResult<OfferId> {
        self.log(format!("create_offer:{}", offer.seller_wallet));
        Ok(OfferId("offer-1".into()))
    }

    async fn execute_trade(&self, trade: &TradeOrder) -> ChainResult<TransactionId> {
        self.log(format!("execute_trade:{}", trade.offer_id));
        if trade.offer_id == "closed" {
            return Err(ChainError::Rejected("offer is not active".into()));
        }
        Ok(TransactionId::from("tx-trade"))
    }

    async fn send_transfer(&self, transfer: &Transfer) -> ChainResult<TransactionId> {
        self.log(format!("send_transfer:{}", transfer.from));
        Ok(TransactionId::from("tx-send"))
    }

    async fn create_contract(&self, template: &ContractTemplate) -> ChainResult<DeployedContract> {
        self.log(format!("create_contract:{}", template.key));
        if self.fail_submission.as_deref() == Some(template.key.as_str()) {
            return Err(ChainError::Status {
                status: 500,
                body: "quota exceeded".into(),
            });
        }
        let n = self.submitted();
        Ok(DeployedContract {
            contract_id: format!("c-{}", n),
            contract_address: format!("0x{:040}", n),
            transaction_id: TransactionId(format!("tx-{}", n)),
            status: DeploymentStatus::Pending,
        })
    }

    async fn contract_status(&self, contract_id: &str) -> ChainResult<DeploymentStatus> {
        self.log(format!("contract_status:{}", contract_id));
        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(contract_id)
            .and_then(VecDeque::pop_front);
        match step {
            Some(Step::Status(status)) => Ok(status),
            Some(Step::Error) => Err(ChainError::Status {
                status: 503,
                body: "unavailable".into(),
            }),
            None => Ok(DeploymentStatus::Pending),
        }
    }

    async fn contract_info(&self, contract_id: &str) -> ChainResult<Value> {
        self.log(format!("contract_info:{}", contract_id));
        Ok(json!({ "contractId": contract_id }))
    }

    async fn transaction_status(&self, transaction_id: &str) -> ChainResult<Value> {
        self.log(format!("transaction_status:{}", transaction_id));
        Ok(json!({ "transactionId": transaction_id, "status": "confirmed" }))
    }

    async fn network_status(&self) -> ChainResult<Value> {
        self.log("network_status:".into());
        Ok(json!({ "blockHeight": 42 }))
    }

    async fn balance(&self, wallet_address: &str) -> ChainResult<f64> {
        self.log(format!("balance:{}", wallet_address));
        self.balances
            .get(wallet_address)
            .copied()
            .ok_or_else(|| ChainError::Status {
                status: 500,
                body: "balance service down".into(),
            })
    }

    async fn wallet_info(&self, wallet_address: &str) -> ChainResult<Value> {
        self.log(format!("wallet_info:{}", wallet_address));
        Ok(json!({ "walletAddress": wallet_address }))
    }

    async fn transactions(&self, wallet_address: &str, page: Page) -> ChainResult<TransactionPage> {
        self.log(format!("transactions:{}:{}:{}", wallet_address, page.limit, page.offset));
        Ok(TransactionPage {
            transactions: vec![json!({ "transactionId": "tx-1" })],
            total: 1,
        })
    }
}
