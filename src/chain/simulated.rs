//! In-process ledger for demos and local development.
//!
//! Follows the rules of the energy market programs: offers are filled
//! partially until exhausted, a trade costs `amount × price_per_kwh` energy
//! credits paid from the buyer to the seller, and contracts report
//! `deployed` after a configurable number of status queries.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::chain::backend::LedgerBackend;
use crate::chain::types::{
    ChainError, ChainResult, DeployedContract, DeploymentStatus, EnergyOffer, MeterReading,
    Network, NetworkEndpoints, OfferId, Page, TradeOrder, TransactionId,
    TransactionPage, Transfer, WalletInfo,
};
use crate::config::SimulatedConfig;
use crate::deploy::templates::ContractTemplate;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimWallet {
    wallet_id: String,
    wallet_address: String,
    user_id: String,
    balance: f64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum OfferStatus {
    Active,
    Completed,
    Expired,
}

#[derive(Debug, Clone)]
struct SimOffer {
    seller: String,
    energy_amount: f64,
    filled_amount: f64,
    price_per_kwh: f64,
    status: OfferStatus,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimContract {
    contract_id: String,
    contract_address: String,
    transaction_id: TransactionId,
    template: String,
    name: String,
    #[serde(skip)]
    status_queries: u32,
    status: DeploymentStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimTransaction {
    transaction_id: TransactionId,
    kind: &'static str,
    from: Option<String>,
    to: Option<String>,
    amount: f64,
    status: &'static str,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct LedgerState {
    wallets: HashMap<String, SimWallet>,
    offers: HashMap<String, SimOffer>,
    contracts: HashMap<String, SimContract>,
    transactions: Vec<SimTransaction>,
}

impl LedgerState {
    fn record(
        &mut self,
        kind: &'static str,
        from: Option<&str>,
        to: Option<&str>,
        amount: f64,
    ) -> TransactionId {
        let transaction_id = TransactionId(format!("sim-tx-{}", Uuid::new_v4().simple()));
        self.transactions.push(SimTransaction {
            transaction_id: transaction_id.clone(),
            kind,
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            amount,
            status: "confirmed",
            timestamp: Utc::now(),
        });
        transaction_id
    }

    fn wallet_mut(&mut self, address: &str) -> ChainResult<&mut SimWallet> {
        self.wallets
            .get_mut(address)
            .ok_or_else(|| ChainError::NotFound(format!("wallet {}", address)))
    }

    /// Move credits between two existing wallets.
    fn move_credits(&mut self, from: &str, to: &str, amount: f64) -> ChainResult<()> {
        if !self.wallets.contains_key(to) {
            return Err(ChainError::NotFound(format!("wallet {}", to)));
        }
        let payer = self.wallet_mut(from)?;
        if payer.balance < amount {
            return Err(ChainError::Rejected(format!(
                "insufficient balance: {} has {} EC, needs {}",
                from, payer.balance, amount
            )));
        }
        payer.balance -= amount;
        self.wallet_mut(to)?.balance += amount;
        Ok(())
    }
}

/// Ledger kept entirely in memory.
#[derive(Debug)]
pub struct SimulatedLedger {
    endpoints: NetworkEndpoints,
    config: SimulatedConfig,
    state: Mutex<LedgerState>,
}

impl SimulatedLedger {
    pub fn new(network: Network, config: SimulatedConfig) -> Self {
        Self {
            endpoints: NetworkEndpoints {
                network,
                api: "simulated://local".to_string(),
                explorer: network.explorer_url().to_string(),
            },
            config,
            state: Mutex::new(LedgerState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn to_value<T: Serialize>(value: &T) -> ChainResult<Value> {
    serde_json::to_value(value).map_err(|e| ChainError::Decode(e.to_string()))
}

#[async_trait]
impl LedgerBackend for SimulatedLedger {
    fn endpoints(&self) -> &NetworkEndpoints {
        &self.endpoints
    }

    async fn health(&self) -> ChainResult<()> {
        Ok(())
    }

    async fn create_wallet(&self, user_id: &str) -> ChainResult<WalletInfo> {
        let wallet = SimWallet {
            wallet_id: format!("sim-wallet-{}", Uuid::new_v4().simple()),
            wallet_address: format!("DEMO{}", Uuid::new_v4().simple()),
            user_id: user_id.to_string(),
            balance: self.config.initial_balance,
            created_at: Utc::now(),
        };

        let mut state = self.state();
        if wallet.balance > 0.0 {
            state.record("faucet", None, Some(&wallet.wallet_address), wallet.balance);
        }
        state.wallets.insert(wallet.wallet_address.clone(), wallet.clone());

        Ok(WalletInfo {
            wallet_id: wallet.wallet_id,
            wallet_address: wallet.wallet_address,
            balance: wallet.balance,
        })
    }

    async fn submit_reading(&self, reading: &MeterReading) -> ChainResult<TransactionId> {
        let mut state = self.state();
        Ok(state.record("meter_reading", Some(&reading.meter_id), None, reading.reading_value))
    }

    async fn create_offer(&self, offer: &EnergyOffer) -> ChainResult<OfferId> {
        let mut state = self.state();
        if !state.wallets.contains_key(&offer.seller_wallet) {
            return Err(ChainError::NotFound(format!("wallet {}", offer.seller_wallet)));
        }

        let offer_id = format!("sim-offer-{}", Uuid::new_v4().simple());
        state.offers.insert(
            offer_id.clone(),
            SimOffer {
                seller: offer.seller_wallet.clone(),
                energy_amount: offer.energy_amount,
                filled_amount: 0.0,
                price_per_kwh: offer.price_per_kwh,
                status: OfferStatus::Active,
                expires_at: Utc::now() + ChronoDuration::minutes(i64::from(offer.duration)),
            },
        );
        Ok(OfferId(offer_id))
    }

    async fn execute_trade(&self, trade: &TradeOrder) -> ChainResult<TransactionId> {
        let mut state = self.state();

        let offer = state
            .offers
            .get_mut(&trade.offer_id)
            .ok_or_else(|| ChainError::NotFound(format!("offer {}", trade.offer_id)))?;
        if offer.status == OfferStatus::Active && Utc::now() >= offer.expires_at {
            offer.status = OfferStatus::Expired;
        }
        match offer.status {
            OfferStatus::Active => {}
            OfferStatus::Expired => return Err(ChainError::Rejected("offer has expired".into())),
            OfferStatus::Completed => return Err(ChainError::Rejected("offer is not active".into())),
        }
        let available = offer.energy_amount - offer.filled_amount;
        if trade.amount > available {
            return Err(ChainError::Rejected(format!(
                "insufficient energy available: requested {} kWh, {} kWh left",
                trade.amount, available
            )));
        }
        let seller = offer.seller.clone();
        let cost = trade.amount * offer.price_per_kwh;

        state.move_credits(&trade.buyer_wallet, &seller, cost)?;

        if let Some(offer) = state.offers.get_mut(&trade.offer_id) {
            offer.filled_amount += trade.amount;
            if offer.filled_amount >= offer.energy_amount {
                offer.status = OfferStatus::Completed;
            }
        }

        Ok(state.record("energy_trade", Some(&trade.buyer_wallet), Some(&seller), cost))
    }

    async fn send_transfer(&self, transfer: &Transfer) -> ChainResult<TransactionId> {
        if transfer.from == transfer.to {
            return Err(ChainError::Rejected("cannot transfer to the same wallet".into()));
        }
        let mut state = self.state();
        state.move_credits(&transfer.from, &transfer.to, transfer.amount)?;
        Ok(state.record("transfer", Some(&transfer.from), Some(&transfer.to), transfer.amount))
    }

    async fn create_contract(&self, template: &ContractTemplate) -> ChainResult<DeployedContract> {
        let address_bytes: [u8; 20] = rand::random();
        let mut state = self.state();
        let transaction_id = state.record("contract_deployment", None, None, 0.0);

        let contract = SimContract {
            contract_id: format!("sim-contract-{}", Uuid::new_v4().simple()),
            contract_address: format!("0x{}", hex::encode(address_bytes)),
            transaction_id,
            template: template.kind.as_str().to_string(),
            name: template.name.clone(),
            status_queries: 0,
            status: DeploymentStatus::Pending,
        };
        state.contracts.insert(contract.contract_id.clone(), contract.clone());

        Ok(DeployedContract {
            contract_id: contract.contract_id,
            contract_address: contract.contract_address,
            transaction_id: contract.transaction_id,
            status: contract.status,
        })
    }

    async fn contract_status(&self, contract_id: &str) -> ChainResult<DeploymentStatus> {
        let required = self.config.confirmations_required;
        let mut state = self.state();
        let contract = state
            .contracts
            .get_mut(contract_id)
            .ok_or_else(|| ChainError::NotFound(format!("contract {}", contract_id)))?;

        contract.status_queries += 1;
        if contract.status_queries >= required {
            contract.status = DeploymentStatus::Deployed;
        }
        Ok(contract.status.clone())
    }

    async fn contract_info(&self, contract_id: &str) -> ChainResult<Value> {
        let state = self.state();
        let contract = state
            .contracts
            .get(contract_id)
            .ok_or_else(|| ChainError::NotFound(format!("contract {}", contract_id)))?;
        to_value(contract)
    }

    async fn transaction_status(&self, transaction_id: &str) -> ChainResult<Value> {
        let state = self.state();
        let transaction = state
            .transactions
            .iter()
            .find(|tx| tx.transaction_id.0 == transaction_id)
            .ok_or_else(|| ChainError::NotFound(format!("transaction {}", transaction_id)))?;
        to_value(transaction)
    }

    async fn network_status(&self) -> ChainResult<Value> {
        let state = self.state();
        Ok(json!({
            "mode": "simulated",
            "network": self.endpoints.network,
            "transactions": state.transactions.len(),
            "wallets": state.wallets.len(),
            "activeOffers": state.offers.values().filter(|o| o.status == OfferStatus::Active).count(),
        }))
    }

    async fn balance(&self, wallet_address: &str) -> ChainResult<f64> {
        self.state()
            .wallets
            .get(wallet_address)
            .map(|w| w.balance)
            .ok_or_else(|| ChainError::NotFound(format!("wallet {}", wallet_address)))
    }

    async fn wallet_info(&self, wallet_address: &str) -> ChainResult<Value> {
        let state = self.state();
        let wallet = state
            .wallets
            .get(wallet_address)
            .ok_or_else(|| ChainError::NotFound(format!("wallet {}", wallet_address)))?;
        to_value(wallet)
    }

    async fn transactions(&self, wallet_address: &str, page: Page) -> ChainResult<TransactionPage> {
        let state = self.state();
        let involved: Vec<&SimTransaction> = state
            .transactions
            .iter()
            .rev()
            .filter(|tx| {
                tx.from.as_deref() == Some(wallet_address) || tx.to.as_deref() == Some(wallet_address)
            })
            .collect();

        let transactions = involved
            .iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .map(|tx| to_value(*tx))
            .collect::<ChainResult<Vec<_>>>()?;

        Ok(TransactionPage {
            transactions,
            total: involved.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::types::OfferType;

    fn ledger(initial_balance: f64) -> SimulatedLedger {
        SimulatedLedger::new(
            Network::Testnet,
            SimulatedConfig {
                initial_balance,
                confirmations_required: 2,
            },
        )
    }

    #[tokio::test]
    async fn test_wallet_starts_with_initial_balance() {
        let ledger = ledger(50.0);
        let wallet = ledger.create_wallet("alice").await.unwrap();
        assert!(wallet.wallet_address.starts_with("DEMO"));
        assert_eq!(wallet.balance, 50.0);
        assert_eq!(ledger.balance(&wallet.wallet_address).await.unwrap(), 50.0);
    }

    #[tokio::test]
    async fn test_transfer_moves_credits() {
        let ledger = ledger(10.0);
        let a = ledger.create_wallet("a").await.unwrap();
        let b = ledger.create_wallet("b").await.unwrap();

        let transfer = Transfer {
            from: a.wallet_address.clone(),
            to: b.wallet_address.clone(),
            amount: 4.0,
        };
        ledger.send_transfer(&transfer).await.unwrap();

        assert_eq!(ledger.balance(&a.wallet_address).await.unwrap(), 6.0);
        assert_eq!(ledger.balance(&b.wallet_address).await.unwrap(), 14.0);

        let history = ledger.transactions(&a.wallet_address, Page::default()).await.unwrap();
        assert_eq!(history.total, 2); // faucet + transfer
        assert_eq!(history.transactions[0]["kind"], "transfer");
    }

    #[tokio::test]
    async fn test_transfer_rejects_overdraft() {
        let ledger = ledger(1.0);
        let a = ledger.create_wallet("a").await.unwrap();
        let b = ledger.create_wallet("b").await.unwrap();

        let result = ledger
            .send_transfer(&Transfer {
                from: a.wallet_address.clone(),
                to: b.wallet_address,
                amount: 5.0,
            })
            .await;
        assert!(matches!(result, Err(ChainError::Rejected(_))));
        assert_eq!(ledger.balance(&a.wallet_address).await.unwrap(), 1.0);
    }

    #[tokio::test]
    async fn test_trade_fills_offer() {
        let ledger = ledger(100.0);
        let seller = ledger.create_wallet("seller").await.unwrap();
        let buyer = ledger.create_wallet("buyer").await.unwrap();

        let offer_id = ledger
            .create_offer(&EnergyOffer {
                seller_wallet: seller.wallet_address.clone(),
                energy_amount: 10.0,
                price_per_kwh: 2.0,
                offer_type: OfferType::Immediate,
                duration: 60,
            })
            .await
            .unwrap();

        let trade = |amount| TradeOrder {
            offer_id: offer_id.0.clone(),
            buyer_wallet: buyer.wallet_address.clone(),
            amount,
        };

        ledger.execute_trade(&trade(6.0)).await.unwrap();
        assert_eq!(ledger.balance(&buyer.wallet_address).await.unwrap(), 88.0);
        assert_eq!(ledger.balance(&seller.wallet_address).await.unwrap(), 112.0);

        let over = ledger.execute_trade(&trade(5.0)).await;
        assert!(matches!(over, Err(ChainError::Rejected(msg)) if msg.contains("insufficient energy")));

        ledger.execute_trade(&trade(4.0)).await.unwrap();
        let closed = ledger.execute_trade(&trade(1.0)).await;
        assert!(matches!(closed, Err(ChainError::Rejected(msg)) if msg == "offer is not active"));
    }

    #[tokio::test]
    async fn test_contract_deploys_after_required_queries() {
        let ledger = ledger(0.0);
        let contract = ledger
            .create_contract(&ContractTemplate::energy_oracle())
            .await
            .unwrap();
        assert_eq!(contract.status, DeploymentStatus::Pending);
        assert!(contract.contract_address.starts_with("0x"));

        assert_eq!(
            ledger.contract_status(&contract.contract_id).await.unwrap(),
            DeploymentStatus::Pending
        );
        assert_eq!(
            ledger.contract_status(&contract.contract_id).await.unwrap(),
            DeploymentStatus::Deployed
        );

        let info = ledger.contract_info(&contract.contract_id).await.unwrap();
        assert_eq!(info["template"], "ORACLE");
        assert_eq!(info["status"], "deployed");
    }

    #[tokio::test]
    async fn test_unknown_wallet_balance_is_not_found() {
        let ledger = ledger(0.0);
        assert!(matches!(
            ledger.balance("nobody").await,
            Err(ChainError::NotFound(_))
        ));
    }
}
