//! Error types the HTTP-402 middleware surfaces to axum's `IntoResponse`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum X402HttpError {
    #[error("X-Payment header is not valid base64: {0}")]
    MalformedHeader(String),

    #[error("X-Payment payload is not valid JSON: {0}")]
    MalformedPayload(String),

    #[error("payment rejected: {0:?}")]
    VerificationFailed(splendor_x402_types::ErrorReason),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
}

impl IntoResponse for X402HttpError {
    fn into_response(self) -> Response {
        let status = match &self {
            X402HttpError::MalformedHeader(_) | X402HttpError::MalformedPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            X402HttpError::VerificationFailed(_) => StatusCode::PAYMENT_REQUIRED,
        };
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
