//! Error types for eli5cast
//!
//! All errors in the application are converted to `AppError`.
//! Every variant knows the short, non-technical message a user is
//! allowed to see (`user_message`), and `AppError` implements
//! `IntoResponse` for the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Message shown for any failure of an outside service.
const UPSTREAM_MESSAGE: &str =
    "Something went wrong while talking to an outside service. Please try again.";

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// A required secret is absent (fatal for any outbound call)
    #[error("Missing configuration: {0}")]
    ConfigMissing(String),

    /// Input references neither accepted Farcaster domain
    #[error("Invalid cast URL")]
    InvalidUrl,

    /// The indexing API returned no cast
    #[error("Cast not found")]
    CastNotFound,

    /// Network failure or non-2xx answer from an outside service.
    ///
    /// The payload is diagnostic detail for logs only.
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// The generation API answered without usable text
    #[error("No explanation generated")]
    EmptyGeneration,

    /// Malformed request at the HTTP boundary (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed configuration (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Message safe to show to the end user.
    ///
    /// Never contains credentials, status codes or transport detail.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ConfigMissing(name) => {
                format!("This app is not set up yet: the {name} API key is missing.")
            }
            AppError::InvalidUrl => "Please enter a valid Warpcast or Farcaster URL".to_string(),
            AppError::CastNotFound => {
                "Cast not found. Please check the URL and try again.".to_string()
            }
            AppError::Upstream(_) | AppError::EmptyGeneration => UPSTREAM_MESSAGE.to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Config(_) => "This app is not set up correctly.".to_string(),
            AppError::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// Short label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ConfigMissing(_) => "config_missing",
            AppError::InvalidUrl => "invalid_url",
            AppError::CastNotFound => "cast_not_found",
            AppError::Upstream(_) => "upstream",
            AppError::EmptyGeneration => "empty_generation",
            AppError::Validation(_) => "validation",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidUrl | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::CastNotFound => StatusCode::NOT_FOUND,
            AppError::Upstream(_) | AppError::EmptyGeneration => StatusCode::BAD_GATEWAY,
            AppError::ConfigMissing(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each error variant to an HTTP status code and a JSON body
    /// holding the user message only.
    fn into_response(self) -> Response {
        use axum::Json;

        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[self.kind(), "http"]).inc();

        match &self {
            AppError::Internal(_) | AppError::Config(_) => {
                tracing::error!(error = %self, "Request failed");
            }
            _ => tracing::debug!(error = %self, "Request rejected"),
        }

        let body = Json(serde_json::json!({
            "error": self.user_message(),
        }));

        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_detail_never_reaches_the_user() {
        let err = AppError::Upstream("401 Unauthorized: invalid key sk-secret".to_string());
        let message = err.user_message();
        assert!(!message.contains("sk-secret"));
        assert!(!message.contains("401"));
    }

    #[test]
    fn empty_generation_reads_like_upstream_failure() {
        assert_eq!(
            AppError::EmptyGeneration.user_message(),
            AppError::Upstream(String::new()).user_message()
        );
    }

    #[test]
    fn config_missing_names_the_secret() {
        let message = AppError::ConfigMissing("Neynar".to_string()).user_message();
        assert!(message.contains("Neynar"));
    }

    #[test]
    fn status_codes() {
        assert_eq!(AppError::InvalidUrl.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::CastNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::EmptyGeneration.status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
