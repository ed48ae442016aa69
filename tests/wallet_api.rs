//! Local HTTP API exercised in-process.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::ScriptedBackend;
use energy_gateway::config::GatewayConfig;
use energy_gateway::http::{HttpServer, X_REQUEST_ID};
use energy_gateway::ledger::EnergyLedger;

fn app(backend: Arc<ScriptedBackend>) -> Router {
    HttpServer::new(&GatewayConfig::default(), EnergyLedger::new(backend)).router()
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_send_with_zero_amount_is_rejected_locally() {
    let backend = Arc::new(ScriptedBackend::new());
    let (status, body) = call(
        app(backend.clone()),
        post("/api/wallet/send", json!({ "from": "a", "to": "b", "amount": 0 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "amount must be greater than 0");
    assert_eq!(backend.count("send_transfer:"), 0);
}

#[tokio::test]
async fn test_send_missing_recipient_is_rejected_locally() {
    let backend = Arc::new(ScriptedBackend::new());
    let (status, body) = call(
        app(backend.clone()),
        post("/api/wallet/send", json!({ "from": "a", "amount": 3 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "to is required");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_send_returns_pending_receipt() {
    let backend = Arc::new(ScriptedBackend::new());
    let (status, body) = call(
        app(backend.clone()),
        post("/api/wallet/send", json!({ "from": "a", "to": "b", "amount": 2.5 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["transactionId"], "tx-send");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["amount"], 2.5);
    assert_eq!(body["explorerUrl"], "https://explorer-testnet.maschain.com/tx/tx-send");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::post("/api/wallet/send")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = call(app(Arc::new(ScriptedBackend::new())), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_balance_failure_reads_as_zero() {
    let backend = Arc::new(ScriptedBackend::new());
    let (status, body) = call(
        app(backend.clone()),
        post("/api/wallet/balance", json!({ "walletAddress": "addr-1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 0.0);
    assert_eq!(body["currency"], "EC");
    assert_eq!(backend.count("balance:addr-1"), 1);
}

#[tokio::test]
async fn test_balance_success() {
    let backend = Arc::new(ScriptedBackend::new().with_balance("addr-1", 12.5));
    let (_, body) = call(
        app(backend),
        post("/api/wallet/balance", json!({ "walletAddress": "addr-1" })),
    )
    .await;
    assert_eq!(body["balance"], 12.5);
}

#[tokio::test]
async fn test_balance_requires_address() {
    let backend = Arc::new(ScriptedBackend::new());
    let (status, body) = call(app(backend.clone()), post("/api/wallet/balance", json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "walletAddress is required");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_create_demo_wallet() {
    let backend = Arc::new(ScriptedBackend::new());
    let (status, body) = call(
        app(backend.clone()),
        post("/api/wallet/create-demo", json!({ "userId": "alice" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["walletAddress"], "addr-alice");
    assert_eq!(body["walletId"], "w-alice");

    let (status, body) = call(app(backend), post("/api/wallet/create-demo", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "userId is required");
}

#[tokio::test]
async fn test_remote_rejection_is_server_error() {
    let (status, body) = call(
        app(Arc::new(ScriptedBackend::new())),
        post(
            "/api/wallet/trade",
            json!({ "offerId": "closed", "buyerWallet": "b", "amount": 1 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to execute trade");
    assert_eq!(body["details"], "rejected: offer is not active");
}

#[tokio::test]
async fn test_transactions_forward_paging() {
    let backend = Arc::new(ScriptedBackend::new());
    let (status, body) = call(
        app(backend.clone()),
        get("/api/wallet/transactions/addr-1?limit=5&offset=10"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 5);
    assert_eq!(body["offset"], 10);
    assert_eq!(body["total"], 1);
    assert_eq!(backend.calls(), ["transactions:addr-1:5:10"]);
}

#[tokio::test]
async fn test_transactions_bad_query_is_bad_request() {
    let (status, _) = call(
        app(Arc::new(ScriptedBackend::new())),
        get("/api/wallet/transactions/addr-1?limit=many"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wallet_info_combines_balance_and_details() {
    let backend = Arc::new(ScriptedBackend::new().with_balance("addr-9", 3.0));
    let (status, body) = call(app(backend), get("/api/wallet/info/addr-9")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 3.0);
    assert_eq!(body["walletInfo"]["walletAddress"], "addr-9");
    assert_eq!(body["network"], "testnet");
    assert_eq!(body["explorerUrl"], "https://explorer-testnet.maschain.com/address/addr-9");
}

#[tokio::test]
async fn test_network_status_lists_endpoints() {
    let (status, body) = call(app(Arc::new(ScriptedBackend::new())), get("/api/wallet/network-status")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"]["blockHeight"], 42);
    assert_eq!(body["endpoints"]["api"], "https://service-testnet.maschain.com");
    assert_eq!(body["endpoints"]["explorer"], "https://explorer-testnet.maschain.com");
}

#[tokio::test]
async fn test_offer_duration_is_bounded() {
    let backend = Arc::new(ScriptedBackend::new());
    let offer = json!({
        "sellerWallet": "s",
        "energyAmount": 10,
        "pricePerKwh": 0.15,
        "duration": 20000,
    });
    let (status, _) = call(app(backend.clone()), post("/api/market/offers", offer)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(backend.count("create_offer:"), 0);

    let offer = json!({ "sellerWallet": "s", "energyAmount": 10, "pricePerKwh": 0.15 });
    let (status, body) = call(app(backend), post("/api/market/offers", offer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["offerId"], "offer-1");
}

#[tokio::test]
async fn test_reading_type_must_be_known() {
    let reading = json!({
        "meterId": "m-1",
        "readingValue": 4.2,
        "readingType": "storage",
        "signature": "sig",
    });
    let backend = Arc::new(ScriptedBackend::new());
    let (status, _) = call(app(backend.clone()), post("/api/oracle/readings", reading)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_transaction_lookup() {
    let (status, body) = call(app(Arc::new(ScriptedBackend::new())), get("/api/transactions/tx-7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction"]["status"], "confirmed");
    assert_eq!(body["explorerUrl"], "https://explorer-testnet.maschain.com/tx/tx-7");
}

#[tokio::test]
async fn test_health_and_request_id() {
    let response = app(Arc::new(ScriptedBackend::new()))
        .oneshot(get("/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(X_REQUEST_ID));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["network"], "testnet");
}

#[tokio::test]
async fn test_caller_request_id_is_echoed() {
    let request = Request::get("/health")
        .header(X_REQUEST_ID, "trace-me")
        .body(Body::empty())
        .unwrap();
    let response = app(Arc::new(ScriptedBackend::new())).oneshot(request).await.unwrap();
    assert_eq!(response.headers()[X_REQUEST_ID], "trace-me");
}

#[tokio::test]
async fn test_contract_info_is_forwarded() {
    let backend = Arc::new(ScriptedBackend::new());
    let (status, body) = call(app(backend.clone()), get("/api/contracts/c-42")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["contract"]["contractId"], "c-42");
    assert_eq!(backend.calls(), ["contract_info:c-42"]);
}

#[tokio::test]
async fn test_blank_contract_id_is_rejected_locally() {
    let backend = Arc::new(ScriptedBackend::new());
    let (status, body) = call(app(backend.clone()), get("/api/contracts/%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "contractId is required");
    assert!(backend.calls().is_empty());
}

fn rate_limited_app(requests_per_second: u32, burst_size: u32) -> Router {
    let mut config = GatewayConfig::default();
    config.security.rate_limit.requests_per_second = requests_per_second;
    config.security.rate_limit.burst_size = burst_size;
    HttpServer::new(&config, EnergyLedger::new(Arc::new(ScriptedBackend::new()))).router()
}

fn from_peer(uri: &str, peer: [u8; 4]) -> Request<Body> {
    let mut request = get(uri);
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((peer, 40000))));
    request
}

#[tokio::test]
async fn test_requests_over_the_limit_get_429() {
    let app = rate_limited_app(1, 2);

    for _ in 0..2 {
        let (status, _) = call(app.clone(), from_peer("/health", [10, 0, 0, 1])).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = call(app.clone(), from_peer("/health", [10, 0, 0, 1])).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many requests");
    assert!(body["details"].as_str().unwrap().contains("burst of 2"));

    let (status, _) = call(app, from_peer("/health", [10, 0, 0, 2])).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_can_be_disabled() {
    let mut config = GatewayConfig::default();
    config.security.rate_limit.enabled = false;
    config.security.rate_limit.burst_size = 1;
    let app = HttpServer::new(&config, EnergyLedger::new(Arc::new(ScriptedBackend::new()))).router();

    for _ in 0..5 {
        let (status, _) = call(app.clone(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_responses_carry_security_headers() {
    let response = app(Arc::new(ScriptedBackend::new()))
        .oneshot(get("/health"))
        .await
        .unwrap();
    let headers = response.headers();
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN");
    assert_eq!(headers[header::REFERRER_POLICY], "no-referrer");
    assert!(headers.contains_key(header::STRICT_TRANSPORT_SECURITY));
}
