//! MasChain L1 adapter over the authenticated provider API.

use std::future::Future;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::chain::backend::LedgerBackend;
use crate::chain::client::ApiClient;
use crate::chain::types::{
    ChainResult, DeployedContract, DeploymentStatus, EnergyOffer, MeterReading, NetworkEndpoints,
    OfferId, Page, TradeOrder, TransactionId, TransactionPage, Transfer, WalletInfo,
};
use crate::deploy::templates::ContractTemplate;
use crate::observability::metrics;

const API: &str = "api";
const V1: &str = "v1";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalletCreated {
    wallet_id: String,
    wallet_address: String,
}

#[derive(Deserialize)]
struct BalanceResponse {
    #[serde(default)]
    balance: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionReceipt {
    transaction_id: TransactionId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OfferReceipt {
    offer_id: OfferId,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: DeploymentStatus,
}

/// Ledger backend speaking the MasChain REST API.
#[derive(Debug, Clone)]
pub struct MasChainBackend {
    client: ApiClient,
    endpoints: NetworkEndpoints,
}

impl MasChainBackend {
    pub fn new(client: ApiClient) -> Self {
        let network = client.network();
        let endpoints = NetworkEndpoints {
            network,
            api: client.base_url().as_str().trim_end_matches('/').to_string(),
            explorer: network.explorer_url().to_string(),
        };
        Self { client, endpoints }
    }

    async fn observe<T, F>(&self, operation: &'static str, call: F) -> ChainResult<T>
    where
        F: Future<Output = ChainResult<T>>,
    {
        let start = Instant::now();
        let result = call.await;
        metrics::record_remote_call(operation, result.is_ok(), start);
        if let Err(e) = &result {
            tracing::debug!(operation, error = %e, "Ledger call failed");
        }
        result
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

#[async_trait]
impl LedgerBackend for MasChainBackend {
    fn endpoints(&self) -> &NetworkEndpoints {
        &self.endpoints
    }

    async fn health(&self) -> ChainResult<()> {
        self.observe("health", async {
            let _: Value = self.client.get(&[API, V1, "health"]).await?;
            Ok(())
        })
        .await
    }

    async fn create_wallet(&self, user_id: &str) -> ChainResult<WalletInfo> {
        self.observe("create_wallet", async {
            let body = json!({
                "userId": user_id,
                "walletType": "energy_trading",
                "metadata": {
                    "purpose": "Energy trading wallet",
                    "createdAt": now_iso(),
                },
            });
            let created: WalletCreated = self.client.post(&[API, V1, "wallet", "create"], &body).await?;
            Ok(WalletInfo {
                wallet_id: created.wallet_id,
                wallet_address: created.wallet_address,
                balance: 0.0,
            })
        })
        .await
    }

    async fn submit_reading(&self, reading: &MeterReading) -> ChainResult<TransactionId> {
        self.observe("submit_reading", async {
            let body = json!({
                "meterId": reading.meter_id,
                "readingValue": reading.reading_value,
                "readingType": reading.reading_type,
                "timestamp": now_iso(),
                "signature": reading.signature,
                "metadata": { "source": "iot_meter" },
            });
            let receipt: TransactionReceipt = self
                .client
                .post(&[API, V1, "oracle", "submit-reading"], &body)
                .await?;
            tracing::info!(
                meter_id = %reading.meter_id,
                reading_value = reading.reading_value,
                reading_type = ?reading.reading_type,
                transaction_id = %receipt.transaction_id,
                "Submitted meter reading"
            );
            Ok(receipt.transaction_id)
        })
        .await
    }

    async fn create_offer(&self, offer: &EnergyOffer) -> ChainResult<OfferId> {
        self.observe("create_offer", async {
            let now = Utc::now();
            let expires_at = now + ChronoDuration::minutes(i64::from(offer.duration));
            let body = json!({
                "sellerWallet": offer.seller_wallet,
                "energyAmount": offer.energy_amount,
                "pricePerKwh": offer.price_per_kwh,
                "offerType": offer.offer_type,
                "duration": offer.duration,
                "expiresAt": expires_at.to_rfc3339(),
                "metadata": { "createdAt": now.to_rfc3339() },
            });
            let receipt: OfferReceipt = self
                .client
                .post(&[API, V1, "market", "create-offer"], &body)
                .await?;
            tracing::info!(
                offer_id = %receipt.offer_id,
                energy_amount = offer.energy_amount,
                price_per_kwh = offer.price_per_kwh,
                "Created energy offer"
            );
            Ok(receipt.offer_id)
        })
        .await
    }

    async fn execute_trade(&self, trade: &TradeOrder) -> ChainResult<TransactionId> {
        self.observe("execute_trade", async {
            let body = json!({
                "offerId": trade.offer_id,
                "buyerWallet": trade.buyer_wallet,
                "amount": trade.amount,
                "timestamp": now_iso(),
            });
            let receipt: TransactionReceipt = self
                .client
                .post(&[API, V1, "market", "execute-trade"], &body)
                .await?;
            tracing::info!(
                offer_id = %trade.offer_id,
                amount = trade.amount,
                transaction_id = %receipt.transaction_id,
                "Executed trade"
            );
            Ok(receipt.transaction_id)
        })
        .await
    }

    async fn send_transfer(&self, transfer: &Transfer) -> ChainResult<TransactionId> {
        self.observe("send_transfer", async {
            let body = json!({
                "from": transfer.from,
                "to": transfer.to,
                "amount": transfer.amount,
                "tokenType": "EC",
                "timestamp": now_iso(),
                "metadata": {
                    "type": "energy_credit_transfer",
                    "description": format!(
                        "Transfer of {} EC from {} to {}",
                        transfer.amount, transfer.from, transfer.to
                    ),
                },
            });
            let receipt: TransactionReceipt = self
                .client
                .post(&[API, V1, "transaction", "send"], &body)
                .await?;
            Ok(receipt.transaction_id)
        })
        .await
    }

    async fn create_contract(&self, template: &ContractTemplate) -> ChainResult<DeployedContract> {
        self.observe("create_contract", async {
            let contract: DeployedContract = self
                .client
                .post(&[API, V1, "smart-contract", "create"], &template.request_body())
                .await?;
            tracing::info!(
                template = template.key.as_str(),
                contract_id = %contract.contract_id,
                "Contract creation submitted"
            );
            Ok(contract)
        })
        .await
    }

    async fn contract_status(&self, contract_id: &str) -> ChainResult<DeploymentStatus> {
        self.observe("contract_status", async {
            let response: StatusResponse = self
                .client
                .get(&[API, V1, "smart-contract", contract_id, "status"])
                .await?;
            Ok(response.status)
        })
        .await
    }

    async fn contract_info(&self, contract_id: &str) -> ChainResult<Value> {
        self.observe("contract_info", self.client.get(&[API, V1, "smart-contract", contract_id]))
            .await
    }

    async fn transaction_status(&self, transaction_id: &str) -> ChainResult<Value> {
        self.observe("transaction_status", self.client.get(&[API, V1, "transaction", transaction_id]))
            .await
    }

    async fn network_status(&self) -> ChainResult<Value> {
        self.observe("network_status", self.client.get(&[API, V1, "network", "status"]))
            .await
    }

    async fn balance(&self, wallet_address: &str) -> ChainResult<f64> {
        self.observe("balance", async {
            let response: BalanceResponse = self
                .client
                .get(&[API, V1, "wallet", wallet_address, "balance"])
                .await?;
            Ok(response.balance.unwrap_or(0.0))
        })
        .await
    }

    async fn wallet_info(&self, wallet_address: &str) -> ChainResult<Value> {
        self.observe("wallet_info", self.client.get(&[API, V1, "wallet", wallet_address]))
            .await
    }

    async fn transactions(&self, wallet_address: &str, page: Page) -> ChainResult<TransactionPage> {
        self.observe(
            "transactions",
            self.client
                .get_with_query(&[API, V1, "wallet", wallet_address, "transactions"], &page),
        )
        .await
    }
}
