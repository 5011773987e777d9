//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use threadbot_types::error::{InferenceError, RouterError, StoreError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Routing-level errors (session lookup, target checks, inference).
    Router(RouterError),
    /// Direct store access errors (read paths at the boundary).
    Store(StoreError),
    /// Validation error on request input.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<RouterError> for AppError {
    fn from(e: RouterError) -> Self {
        AppError::Router(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

fn store_error_parts(e: &StoreError) -> (StatusCode, &'static str, String) {
    match e {
        StoreError::NotFound => (
            StatusCode::NOT_FOUND,
            "SESSION_NOT_FOUND",
            "No session for this thread".to_string(),
        ),
        StoreError::AlreadyExists => (
            StatusCode::CONFLICT,
            "SESSION_EXISTS",
            "Thread already has a session".to_string(),
        ),
        e => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR", e.to_string()),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Router(RouterError::NoSessionForThread) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "No session for this thread".to_string(),
            ),
            AppError::Router(RouterError::InvalidTarget) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Target message cannot be regenerated".to_string(),
            ),
            AppError::Router(RouterError::Inference(e)) => {
                let code = match e {
                    InferenceError::RateLimited { .. } => "INFERENCE_RATE_LIMITED",
                    _ => "INFERENCE_ERROR",
                };
                (StatusCode::BAD_GATEWAY, code, e.to_string())
            }
            AppError::Router(RouterError::Store(e)) => store_error_parts(e),
            AppError::Store(e) => store_error_parts(e),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        let body = json!({
            "data": null,
            "meta": {
                "request_id": "",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
