//! Energy trading operations on top of a ledger backend.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::chain::{
    ChainError, EnergyOffer, LedgerBackend, MeterReading, NetworkEndpoints, OfferId, Page,
    TradeOrder, TransactionId, TransactionPage, Transfer, WalletInfo,
};
use crate::ledger::validate::{require_duration, require_id, require_positive, ValidationError};
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Rejected locally; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The ledger call failed.
    #[error(transparent)]
    Remote(#[from] ChainError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Validated entry point for wallet, market and oracle operations.
#[derive(Clone)]
pub struct EnergyLedger {
    backend: Arc<dyn LedgerBackend>,
}

impl EnergyLedger {
    pub fn new(backend: Arc<dyn LedgerBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn LedgerBackend> {
        &self.backend
    }

    pub fn endpoints(&self) -> &NetworkEndpoints {
        self.backend.endpoints()
    }

    pub async fn create_wallet(&self, user_id: &str) -> LedgerResult<WalletInfo> {
        require_id("userId", user_id)?;
        let wallet = self.backend.create_wallet(user_id.trim()).await?;
        tracing::info!(user_id, wallet_address = %wallet.wallet_address, "Wallet created");
        Ok(wallet)
    }

    /// Energy credit balance. Any failure reads as zero.
    pub async fn balance(&self, wallet_address: &str) -> f64 {
        match self.backend.balance(wallet_address).await {
            Ok(balance) => balance,
            Err(e) => {
                tracing::warn!(wallet_address, error = %e, "Balance query failed, reporting 0");
                metrics::record_balance_fallback();
                0.0
            }
        }
    }

    pub async fn submit_reading(&self, reading: &MeterReading) -> LedgerResult<TransactionId> {
        require_id("meterId", &reading.meter_id)?;
        require_positive("readingValue", reading.reading_value)?;
        require_id("signature", &reading.signature)?;
        Ok(self.backend.submit_reading(reading).await?)
    }

    pub async fn create_offer(&self, offer: &EnergyOffer) -> LedgerResult<OfferId> {
        require_id("sellerWallet", &offer.seller_wallet)?;
        require_positive("energyAmount", offer.energy_amount)?;
        require_positive("pricePerKwh", offer.price_per_kwh)?;
        require_duration(offer.duration)?;
        Ok(self.backend.create_offer(offer).await?)
    }

    pub async fn execute_trade(&self, trade: &TradeOrder) -> LedgerResult<TransactionId> {
        require_id("offerId", &trade.offer_id)?;
        require_id("buyerWallet", &trade.buyer_wallet)?;
        require_positive("amount", trade.amount)?;
        Ok(self.backend.execute_trade(trade).await?)
    }

    pub async fn send_transfer(&self, transfer: &Transfer) -> LedgerResult<TransactionId> {
        require_id("from", &transfer.from)?;
        require_id("to", &transfer.to)?;
        require_positive("amount", transfer.amount)?;
        let transaction_id = self.backend.send_transfer(transfer).await?;
        tracing::info!(
            from = %transfer.from,
            to = %transfer.to,
            amount = transfer.amount,
            transaction_id = %transaction_id,
            "Transfer submitted"
        );
        Ok(transaction_id)
    }

    pub async fn transactions(&self, wallet_address: &str, page: Page) -> LedgerResult<TransactionPage> {
        require_id("walletAddress", wallet_address)?;
        Ok(self.backend.transactions(wallet_address, page).await?)
    }

    pub async fn wallet_info(&self, wallet_address: &str) -> LedgerResult<Value> {
        require_id("walletAddress", wallet_address)?;
        Ok(self.backend.wallet_info(wallet_address).await?)
    }

    pub async fn transaction_status(&self, transaction_id: &str) -> LedgerResult<Value> {
        require_id("transactionId", transaction_id)?;
        Ok(self.backend.transaction_status(transaction_id).await?)
    }

    pub async fn contract_info(&self, contract_id: &str) -> LedgerResult<Value> {
        require_id("contractId", contract_id)?;
        Ok(self.backend.contract_info(contract_id).await?)
    }

    pub async fn network_status(&self) -> LedgerResult<Value> {
        Ok(self.backend.network_status().await?)
    }
}
