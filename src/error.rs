//! Common error type for the relay and its upstream clients.
//!
//! Every upstream failure keeps enough detail to be forwarded to the caller:
//! non-2xx responses carry the provider's status code and raw body.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    ProviderParse(String),

    #[error("prompt enhancement failed: {0}")]
    Enhancement(String),

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Status code the relay answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Provider { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::HttpClient(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            AppError::HttpClient(_) | AppError::ProviderParse(_) => StatusCode::BAD_GATEWAY,
            AppError::Enhancement(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Upstream bodies go back as-is; everything else gets the rendered message.
        let detail = match self {
            AppError::Provider { body, .. } => body,
            AppError::Enhancement(msg) => msg,
            other => other.to_string(),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_keeps_upstream_status() {
        let err = AppError::Provider { status: 429, body: "slow down".into() };
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.to_string(), "provider returned 429: slow down");
    }

    #[test]
    fn unknown_upstream_status_maps_to_bad_gateway() {
        let err = AppError::Provider { status: 1000, body: String::new() };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn enhancement_failure_is_internal_error() {
        let err = AppError::Enhancement("upstream exploded".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
