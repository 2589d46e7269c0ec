//! JWT utilities shared by the issuer and token verifiers.
//!
//! This module provides:
//! - The claim set carried by issued tokens
//! - Size limits for DoS prevention
//! - Key ID extraction from JWT headers (JWKS lookup)
//! - Unverified claim inspection for diagnostics and tests
//! - Decoding of base64url JWK components
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Nothing in this module verifies signatures; callers that make trust
//!   decisions must verify against a key from the discovery document
//! - The `sub` field in [`TokenClaims`] is redacted in Debug output
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::jwt::{extract_kid, MAX_JWT_SIZE_BYTES};
//!
//! // Extract key ID for JWKS lookup
//! let kid = extract_kid(token)?;
//! let jwk = jwks.keys.iter().find(|k| k.kid == kid);
//! ```

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// RS256 tokens signed with a 4096-bit key are ~900 bytes, so 8KB leaves
/// plenty of room while rejecting oversized input before any base64 decode.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while inspecting a JWT.
///
/// Messages are intentionally generic; detail goes to debug logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token format is invalid (not a valid JWT structure).
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Token is missing required `kid` header.
    #[error("The access token is invalid or expired")]
    MissingKid,
}

// =============================================================================
// Claims Types
// =============================================================================

/// Claim set carried by every issued token.
///
/// - `sub`: Subject identity
/// - `exp`: Expiration timestamp (Unix epoch seconds)
/// - `iat`: Issued-at timestamp (Unix epoch seconds)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - redacted in Debug output.
    pub sub: String,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,
}

impl fmt::Debug for TokenClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenClaims")
            .field("sub", &"[REDACTED]")
            .field("exp", &self.exp)
            .field("iat", &self.iat)
            .finish()
    }
}

impl TokenClaims {
    /// Creates a new claim set.
    #[must_use]
    pub fn new(sub: impl Into<String>, iat: i64, exp: i64) -> Self {
        Self {
            sub: sub.into(),
            exp,
            iat,
        }
    }

    /// Whether the token is expired at `now` (Unix seconds).
    ///
    /// A token is valid strictly before `exp`.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Split a token into its three segments after the size check.
fn split_token(token: &str) -> Result<[&str; 3], JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }

    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None) => Ok([header, payload, signature]),
        _ => {
            tracing::debug!(target: "common.jwt", "Token rejected: invalid JWT format");
            Err(JwtValidationError::MalformedToken)
        }
    }
}

/// Decode one base64url JSON segment of a token.
fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, JwtValidationError> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT segment base64");
        JwtValidationError::MalformedToken
    })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT segment JSON");
        JwtValidationError::MalformedToken
    })
}

/// Extract the `kid` (key ID) from a JWT header without verifying the signature.
///
/// Verifiers use the returned value to locate the matching record in the
/// discovery document. The token MUST still be verified with that key.
///
/// # Errors
///
/// - `TokenTooLarge` - Token exceeds `MAX_JWT_SIZE_BYTES`
/// - `MalformedToken` - Wrong structure, bad base64, or invalid JSON
/// - `MissingKid` - Header has no `kid`, or it is not a non-empty string
pub fn extract_kid(token: &str) -> Result<String, JwtValidationError> {
    let [header_part, _, _] = split_token(token)?;
    let header: serde_json::Value = decode_segment(header_part)?;

    header
        .get("kid")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or(JwtValidationError::MissingKid)
}

/// Read the claim set of a token WITHOUT verifying its signature.
///
/// Only for diagnostics and tests. Never base an authorization decision on
/// the result.
///
/// # Errors
///
/// Returns `TokenTooLarge` or `MalformedToken` as for [`extract_kid`].
pub fn peek_claims(token: &str) -> Result<TokenClaims, JwtValidationError> {
    let [_, payload_part, _] = split_token(token)?;
    decode_segment(payload_part)
}

/// Decode a base64url (unpadded) JWK component such as `n` or `e`.
///
/// # Errors
///
/// Returns `base64::DecodeError` if the value is not valid unpadded base64url.
pub fn decode_jwk_component(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(value)
}
