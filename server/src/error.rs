//! Gateway Error Types

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use wx_crypto::CryptoError;

/// Errors that end one inbound exchange.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Request signature did not match and the account does not tolerate it.
    #[error("Signature mismatch")]
    SignatureMismatch,

    /// Key, ciphertext or frame could not be processed.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Decrypted payload was produced for a different application.
    #[error("Embedded app id does not match the account")]
    AppIdMismatch,

    /// `MsgType` missing or not supported.
    #[error("Unknown message type: {0:?}")]
    UnknownMessageType(String),

    /// `Event` missing or not supported.
    #[error("Unknown event type: {0:?}")]
    UnknownEventType(String),

    /// Body is not well-formed XML or a field has the wrong shape.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Application handlers did not reply within the budget.
    #[error("Handler did not reply within {0:?}")]
    HandlerTimeout(Duration),

    /// No account is configured under this id.
    #[error("Unknown account: {0}")]
    UnknownAccount(String),
}

impl GatewayError {
    pub(crate) fn malformed(message: impl std::fmt::Display) -> Self {
        Self::MalformedPayload(message.to_string())
    }
}

/// Error response body for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::SignatureMismatch => (StatusCode::UNAUTHORIZED, "SIGNATURE_MISMATCH"),
            Self::Crypto(_) => (StatusCode::BAD_REQUEST, "CRYPTO_ERROR"),
            Self::AppIdMismatch => (StatusCode::BAD_REQUEST, "APP_ID_MISMATCH"),
            Self::UnknownMessageType(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_MESSAGE_TYPE"),
            Self::UnknownEventType(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_EVENT_TYPE"),
            Self::MalformedPayload(_) => (StatusCode::BAD_REQUEST, "MALFORMED_PAYLOAD"),
            Self::HandlerTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "HANDLER_TIMEOUT"),
            Self::UnknownAccount(_) => (StatusCode::NOT_FOUND, "UNKNOWN_ACCOUNT"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Exchange failed");
        } else {
            tracing::warn!(error = %self, "Exchange rejected");
        }

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
