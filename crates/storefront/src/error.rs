//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-class errors to
//! Sentry before responding to the client. All route handlers should return
//! `Result<T, AppError>`. Responses carry a readable message and never a
//! stack trace; checkout errors surface their own failure-page copy.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::gemini::GeminiError;
use crate::notion::NotionError;
use crate::services::checkout::CheckoutError;
use crate::supabase::StoreError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Data store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Order finalization failed.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// CRM logging operation failed.
    #[error("Notion error: {0}")]
    Notion(#[from] NotionError),

    /// Chat generation failed.
    #[error("Chat error: {0}")]
    Chat(#[from] GeminiError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A feature is disabled because its configuration is absent.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error should be captured to Sentry.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Store(StoreError::Validation(_)) => false,
            Self::Store(_) | Self::Internal(_) | Self::Notion(_) | Self::Chat(_) => true,
            Self::Checkout(err) => matches!(err, CheckoutError::Store(_)),
            _ => false,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::Validation(_)) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Notion(_) | Self::Chat(_) => StatusCode::BAD_GATEWAY,
            Self::Checkout(err) => match err {
                CheckoutError::MalformedCallback(_) | CheckoutError::AmountMismatch { .. } => {
                    StatusCode::BAD_REQUEST
                }
                CheckoutError::UnknownOrder(_) => StatusCode::NOT_FOUND,
                CheckoutError::AlreadyClaimed(_) => StatusCode::CONFLICT,
                CheckoutError::Gateway(_) | CheckoutError::Store(_) => StatusCode::BAD_GATEWAY,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the end user.
    fn user_message(&self) -> String {
        match self {
            // Checkout errors carry their own failure-page copy, including
            // the gateway's "{message} (코드: {code})" format
            Self::Checkout(err) => err.to_string(),
            Self::Store(StoreError::Validation(msg)) => msg.clone(),
            Self::Store(_) => "일시적인 오류가 발생했습니다. 잠시 후 다시 시도해주세요.".to_string(),
            Self::Notion(_) | Self::Chat(_) => "외부 서비스 오류가 발생했습니다.".to_string(),
            Self::BadRequest(msg) | Self::NotFound(msg) | Self::Unavailable(msg) => msg.clone(),
            Self::Internal(_) => "서버 오류가 발생했습니다.".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status_code();
        let body = Json(json!({ "error": self.user_message() }));
        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
