//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request id, tracing, timeout, body limit, CORS, metrics,
//!   rate limiting, security headers)
//! - Bind the server to a listener and drain on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::middleware::{rate_limit, track_metrics, with_security_headers, RateLimiter};
use crate::http::request::{make_span, X_REQUEST_ID};
use crate::ledger::EnergyLedger;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub ledger: EnergyLedger,
}

/// HTTP server for the local API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &GatewayConfig, ledger: EnergyLedger) -> Self {
        let router = Self::build_router(config, AppState { ledger });
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let wallet = Router::new()
            .route("/create-demo", post(handlers::create_demo_wallet))
            .route("/balance", post(handlers::balance))
            .route("/send", post(handlers::send))
            .route("/transactions/{walletAddress}", get(handlers::transactions))
            .route("/info/{walletAddress}", get(handlers::wallet_info))
            .route("/trade", post(handlers::trade))
            .route("/network-status", get(handlers::network_status));

        let request_id = HeaderName::from_static(X_REQUEST_ID);

        let mut router = Router::new()
            .route("/health", get(handlers::health))
            .nest("/api/wallet", wallet)
            .route("/api/market/offers", post(handlers::create_offer))
            .route("/api/oracle/readings", post(handlers::submit_reading))
            .route("/api/transactions/{transactionId}", get(handlers::transaction_status))
            .route("/api/contracts/{contractId}", get(handlers::contract_info))
            .route_layer(middleware::from_fn(track_metrics))
            .with_state(state);

        if config.security.rate_limit.enabled {
            let limiter = Arc::new(RateLimiter::new(&config.security.rate_limit));
            router = router.layer(middleware::from_fn_with_state(limiter, rate_limit));
        }
        if config.security.security_headers {
            router = with_security_headers(router);
        }

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(cors_layer(&config.security.allowed_origins))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                .layer(DefaultBodyLimit::max(config.security.max_body_size)),
        )
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    if origins.is_empty() {
        return cors.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}
