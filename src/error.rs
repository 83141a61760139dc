//! Domain-specific error types for the trade opportunities service

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub const AUTH_FAILURE_MESSAGE: &str = "Could not validate credentials";
pub const UNAVAILABLE_MESSAGE: &str = "Service unavailable. Please try again later.";

/// Errors that cross a component boundary.
///
/// Upstream provider failures never appear here; they become placeholder
/// data or a fallback report at the call site.
#[derive(Error, Debug)]
pub enum TradeError {
    #[error("{message}")]
    Config { message: String },

    #[error("Could not validate credentials")]
    Auth,

    #[error("Rate limit exceeded: {limit} per 1 minute")]
    RateLimited { limit: u32, retry_after_secs: u64 },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl TradeError {
    pub fn status(&self) -> StatusCode {
        match self {
            TradeError::Config { .. } => StatusCode::BAD_REQUEST,
            TradeError::Auth => StatusCode::FORBIDDEN,
            TradeError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            TradeError::Internal { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<anyhow::Error> for TradeError {
    fn from(err: anyhow::Error) -> Self {
        TradeError::Internal {
            message: err.to_string(),
        }
    }
}

impl IntoResponse for TradeError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            TradeError::Config { message } => {
                (status, Json(json!({ "detail": message }))).into_response()
            }
            TradeError::Auth => {
                (status, Json(json!({ "detail": AUTH_FAILURE_MESSAGE }))).into_response()
            }
            TradeError::RateLimited {
                limit,
                retry_after_secs,
            } => {
                let mut resp = (
                    status,
                    Json(json!({
                        "error": format!("Rate limit exceeded: {limit} per 1 minute")
                    })),
                )
                    .into_response();
                if let Ok(v) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                    resp.headers_mut().insert(header::RETRY_AFTER, v);
                }
                resp
            }
            TradeError::Internal { message } => {
                tracing::error!(severity = "critical", "Internal Server Error: {}", message);
                unavailable_response()
            }
        }
    }
}

/// Generic 503 body; never carries internal detail.
pub fn unavailable_response() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "detail": UNAVAILABLE_MESSAGE })),
    )
        .into_response()
}

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, TradeError>;
