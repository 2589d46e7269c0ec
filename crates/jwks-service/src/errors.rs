use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures of the key lifecycle and issuance core.
///
/// The core returns these untouched; only [`IntoResponse`] turns them into
/// something a client sees.
#[derive(Debug, Error)]
pub enum JwksError {
    /// Entropy or key-generation failure. Fatal during startup.
    #[error("Key generation failed: {0}")]
    KeyGenFailure(String),

    /// The requested key slot is empty.
    #[error("No signing key available")]
    NoKeyAvailable,

    /// The signing capability rejected the claims or failed internally.
    #[error("Token signing failed: {0}")]
    SigningFailure(String),
}

impl JwksError {
    /// Stable machine-readable code, also used as a metrics label.
    pub fn code(&self) -> &'static str {
        match self {
            JwksError::KeyGenFailure(_) => "KEY_GEN_FAILURE",
            JwksError::NoKeyAvailable => "NO_KEY_AVAILABLE",
            JwksError::SigningFailure(_) => "SIGNING_FAILURE",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for JwksError {
    fn into_response(self) -> Response {
        // Every variant is a server-side condition; messages stay generic.
        let message = match &self {
            JwksError::KeyGenFailure(_) => "Signing keys are unavailable",
            JwksError::NoKeyAvailable => "No keys available",
            JwksError::SigningFailure(_) => "Failed to sign token",
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: message.to_string(),
            },
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)).into_response()
    }
}
