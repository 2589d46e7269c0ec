//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for issued tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use common::jwt::TokenClaims;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use jwks_service::models::JsonWebKey;
use serde::Deserialize;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
    #[serde(default)]
    pub kid: Option<String>,
}

fn segment(token: &str, index: usize) -> Vec<u8> {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing segment {}", index));
    URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT segment {}: {}", index, e))
}

fn header_of(token: &str) -> JwtHeader {
    serde_json::from_slice(&segment(token, 0)).expect("Failed to parse JWT header")
}

fn claims_of(token: &str) -> TokenClaims {
    serde_json::from_slice(&segment(token, 1)).expect("Failed to parse JWT claims")
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_signed_by(&active_kid)
///     .assert_expires_in(3600);
/// ```
pub trait TokenAssertions {
    /// Assert that the token is a well-formed RS256 JWT with a `kid`
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert that the header names the specified key
    fn assert_signed_by(&self, key_id: &str) -> &Self;

    /// Assert that the token expires within the specified seconds (5s tolerance)
    fn assert_expires_in(&self, seconds: i64) -> &Self;

    /// Assert that `exp` is not in the future
    fn assert_expired(&self) -> &Self;

    /// Assert that the token is for the specified subject
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert that the signature verifies against a published record.
    ///
    /// Expiry is not checked, so tokens from the expired key can be verified
    /// against that key's material.
    fn assert_verifies_with(&self, jwk: &JsonWebKey) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        assert_eq!(
            self.split('.').count(),
            3,
            "JWT must have 3 parts (header.payload.signature)"
        );

        let header = header_of(self);
        assert_eq!(header.alg, "RS256", "Expected RS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");
        assert!(
            header.kid.as_deref().is_some_and(|kid| !kid.is_empty()),
            "JWT header must carry a kid"
        );

        let claims = claims_of(self);
        assert!(
            claims.iat <= claims.exp,
            "iat {} must not be after exp {}",
            claims.iat,
            claims.exp
        );

        self
    }

    fn assert_signed_by(&self, key_id: &str) -> &Self {
        let header = header_of(self);
        assert_eq!(
            header.kid.as_deref(),
            Some(key_id),
            "Expected key_id '{}', got {:?}",
            key_id,
            header.kid
        );

        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        let claims = claims_of(self);
        let expires_in = claims.exp - chrono::Utc::now().timestamp();

        assert!(
            (expires_in - seconds).abs() <= 5,
            "Token expires in {} seconds, expected ~{} seconds",
            expires_in,
            seconds
        );

        self
    }

    fn assert_expired(&self) -> &Self {
        let claims = claims_of(self);
        let now = chrono::Utc::now().timestamp();

        assert!(
            claims.is_expired_at(now),
            "Token exp {} should not be after now {}",
            claims.exp,
            now
        );

        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims = claims_of(self);
        assert_eq!(
            claims.sub, subject,
            "Expected subject '{}', got '{}'",
            subject, claims.sub
        );

        self
    }

    fn assert_verifies_with(&self, jwk: &JsonWebKey) -> &Self {
        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .expect("Published record must be a valid RSA public key");

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let result = decode::<TokenClaims>(self, &key, &validation);
        assert!(
            result.is_ok(),
            "Token did not verify against kid '{}': {:?}",
            jwk.kid,
            result.err()
        );

        self
    }
}
