//! Local API handlers.
//!
//! Handlers translate JSON to ledger calls and back; all validation lives in
//! [`crate::ledger`].

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::chain::{EnergyOffer, MeterReading, OfferType, Page, ReadingType, TradeOrder, Transfer};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::ledger::validate::require_id;

type ApiResult = Result<Json<Value>, ApiError>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDemoRequest {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRequest {
    #[serde(default)]
    pub wallet_address: String,
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    #[serde(default)]
    pub offer_id: String,
    #[serde(default)]
    pub buyer_wallet: String,
    #[serde(default)]
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferRequest {
    #[serde(default)]
    pub seller_wallet: String,
    #[serde(default)]
    pub energy_amount: f64,
    #[serde(default)]
    pub price_per_kwh: f64,
    #[serde(default)]
    pub offer_type: OfferType,
    #[serde(default = "default_offer_duration")]
    pub duration: u32,
}

fn default_offer_duration() -> u32 {
    60
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingRequest {
    #[serde(default)]
    pub meter_id: String,
    #[serde(default)]
    pub reading_value: f64,
    pub reading_type: ReadingType,
    #[serde(default)]
    pub signature: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl From<PageQuery> for Page {
    fn from(query: PageQuery) -> Self {
        let defaults = Page::default();
        Page {
            limit: query.limit.unwrap_or(defaults.limit),
            offset: query.offset.unwrap_or(defaults.offset),
        }
    }
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "network": state.ledger.endpoints().network,
    }))
}

/// `POST /api/wallet/create-demo`
pub async fn create_demo_wallet(
    State(state): State<AppState>,
    payload: Result<Json<CreateDemoRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let wallet = state
        .ledger
        .create_wallet(&request.user_id)
        .await
        .map_err(ApiError::ledger("Failed to create demo wallet"))?;

    Ok(Json(json!({
        "success": true,
        "walletId": wallet.wallet_id,
        "walletAddress": wallet.wallet_address,
        "balance": wallet.balance,
    })))
}

/// `POST /api/wallet/balance`
pub async fn balance(
    State(state): State<AppState>,
    payload: Result<Json<BalanceRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    require_id("walletAddress", &request.wallet_address).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let balance = state.ledger.balance(&request.wallet_address).await;
    Ok(Json(json!({
        "success": true,
        "walletAddress": request.wallet_address,
        "balance": balance,
        "currency": "EC",
    })))
}

/// `POST /api/wallet/send`
pub async fn send(
    State(state): State<AppState>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let transfer = Transfer {
        from: request.from,
        to: request.to,
        amount: request.amount,
    };
    let transaction_id = state
        .ledger
        .send_transfer(&transfer)
        .await
        .map_err(ApiError::ledger("Failed to send transaction"))?;

    Ok(Json(json!({
        "success": true,
        "transactionId": transaction_id,
        "from": transfer.from,
        "to": transfer.to,
        "amount": transfer.amount,
        "status": "pending",
        "explorerUrl": state.ledger.endpoints().transaction_url(&transaction_id),
    })))
}

/// `GET /api/wallet/transactions/{walletAddress}`
pub async fn transactions(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult {
    let Query(query) = query?;
    let page = Page::from(query);
    let history = state
        .ledger
        .transactions(&wallet_address, page)
        .await
        .map_err(ApiError::ledger("Failed to get transaction history"))?;

    Ok(Json(json!({
        "success": true,
        "walletAddress": wallet_address,
        "transactions": history.transactions,
        "total": history.total,
        "limit": page.limit,
        "offset": page.offset,
    })))
}

/// `GET /api/wallet/info/{walletAddress}`
pub async fn wallet_info(State(state): State<AppState>, Path(wallet_address): Path<String>) -> ApiResult {
    let (info, balance) = tokio::join!(
        state.ledger.wallet_info(&wallet_address),
        state.ledger.balance(&wallet_address),
    );
    let info = info.map_err(ApiError::ledger("Failed to get wallet info"))?;
    let endpoints = state.ledger.endpoints();

    Ok(Json(json!({
        "success": true,
        "walletAddress": wallet_address,
        "balance": balance,
        "walletInfo": info,
        "network": endpoints.network,
        "explorerUrl": endpoints.address_url(&wallet_address),
    })))
}

/// `POST /api/wallet/trade`
pub async fn trade(
    State(state): State<AppState>,
    payload: Result<Json<TradeRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let order = TradeOrder {
        offer_id: request.offer_id,
        buyer_wallet: request.buyer_wallet,
        amount: request.amount,
    };
    let transaction_id = state
        .ledger
        .execute_trade(&order)
        .await
        .map_err(ApiError::ledger("Failed to execute trade"))?;

    Ok(Json(json!({
        "success": true,
        "transactionId": transaction_id,
        "offerId": order.offer_id,
        "buyerWallet": order.buyer_wallet,
        "amount": order.amount,
        "status": "pending",
        "explorerUrl": state.ledger.endpoints().transaction_url(&transaction_id),
    })))
}

/// `GET /api/wallet/network-status`
pub async fn network_status(State(state): State<AppState>) -> ApiResult {
    let status = state
        .ledger
        .network_status()
        .await
        .map_err(ApiError::ledger("Failed to get network status"))?;
    let endpoints = state.ledger.endpoints();

    Ok(Json(json!({
        "success": true,
        "network": endpoints.network,
        "status": status,
        "endpoints": endpoints,
    })))
}

/// `POST /api/market/offers`
pub async fn create_offer(
    State(state): State<AppState>,
    payload: Result<Json<OfferRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let offer = EnergyOffer {
        seller_wallet: request.seller_wallet,
        energy_amount: request.energy_amount,
        price_per_kwh: request.price_per_kwh,
        offer_type: request.offer_type,
        duration: request.duration,
    };
    let offer_id = state
        .ledger
        .create_offer(&offer)
        .await
        .map_err(ApiError::ledger("Failed to create offer"))?;

    Ok(Json(json!({ "success": true, "offerId": offer_id })))
}

/// `POST /api/oracle/readings`
pub async fn submit_reading(
    State(state): State<AppState>,
    payload: Result<Json<ReadingRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let reading = MeterReading {
        meter_id: request.meter_id,
        reading_value: request.reading_value,
        reading_type: request.reading_type,
        signature: request.signature,
    };
    let transaction_id = state
        .ledger
        .submit_reading(&reading)
        .await
        .map_err(ApiError::ledger("Failed to submit meter reading"))?;

    Ok(Json(json!({
        "success": true,
        "transactionId": transaction_id,
        "explorerUrl": state.ledger.endpoints().transaction_url(&transaction_id),
    })))
}

/// `GET /api/transactions/{transactionId}`
pub async fn transaction_status(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> ApiResult {
    let transaction = state
        .ledger
        .transaction_status(&transaction_id)
        .await
        .map_err(ApiError::ledger("Failed to get transaction status"))?;

    Ok(Json(json!({
        "success": true,
        "transaction": transaction,
        "explorerUrl": state
            .ledger
            .endpoints()
            .transaction_url(&transaction_id.as_str().into()),
    })))
}

/// `GET /api/contracts/{contractId}`
pub async fn contract_info(State(state): State<AppState>, Path(contract_id): Path<String>) -> ApiResult {
    let contract = state
        .ledger
        .contract_info(&contract_id)
        .await
        .map_err(ApiError::ledger("Failed to get contract info"))?;

    Ok(Json(json!({
        "success": true,
        "contract": contract,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        let page = Page::from(PageQuery { limit: None, offset: Some(20) });
        assert_eq!(page, Page { limit: 10, offset: 20 });
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let request: SendRequest = serde_json::from_str(r#"{"from":"a"}"#).unwrap();
        assert_eq!(request.to, "");
        assert_eq!(request.amount, 0.0);

        let offer: OfferRequest = serde_json::from_str(r#"{"sellerWallet":"s"}"#).unwrap();
        assert_eq!(offer.duration, 60);
        assert_eq!(offer.offer_type, OfferType::Immediate);
    }
}
