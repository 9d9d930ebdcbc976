use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::DateTime;
use serde_json::json;
use thiserror::Error;

/// Errors a handler can surface to the caller. A limiter failure is never
/// among them; the only limiter-driven rejection is `RateLimited`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("rate limit exceeded")]
    RateLimited { reset_at: u64 },
    #[error("{0}")]
    InvalidRequest(String),
    #[error("analysis backend error: {0}")]
    Backend(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::RateLimited { reset_at } => {
                let reset_time = DateTime::from_timestamp_millis(reset_at as i64)
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default();
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({
                        "error": "Rate limit exceeded. Try again later.",
                        "resetTime": reset_time,
                    })),
                )
                    .into_response()
            }
            ApiError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Backend(msg) => {
                (StatusCode::BAD_GATEWAY, Json(json!({ "error": msg }))).into_response()
            }
        }
    }
}
