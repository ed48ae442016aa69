//! Error responses.
//!
//! Every failure leaves the API as `{"error": ..., "details": ...}`:
//! 400 when the request itself is wrong, 429 when the client is over its
//! rate limit, 500 when the ledger call failed.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::ledger::LedgerError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest { message: String, details: Option<String> },
    Upstream { context: &'static str, details: String },
    RateLimited { details: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            details: None,
        }
    }

    /// Map a ledger failure, naming the operation for the 500 case.
    pub fn ledger(context: &'static str) -> impl FnOnce(LedgerError) -> ApiError {
        move |err| match err {
            LedgerError::Validation(e) => ApiError::bad_request(e.to_string()),
            LedgerError::Remote(e) => {
                tracing::error!(error = %e, "{}", context);
                ApiError::Upstream {
                    context,
                    details: e.to_string(),
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            message: "Invalid request body".into(),
            details: Some(rejection.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest {
            message: "Invalid query parameters".into(),
            details: Some(rejection.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest { message, details } => ErrorBody {
                error: message,
                details,
            },
            ApiError::Upstream { context, details } => ErrorBody {
                error: context.to_string(),
                details: Some(details),
            },
            ApiError::RateLimited { details } => ErrorBody {
                error: "Too many requests".into(),
                details: Some(details),
            },
        };
        (status, Json(body)).into_response()
    }
}
