use crate::crypto::{Signer, SIGNING_ALGORITHM};
use crate::errors::JwksError;
use crate::services::key_registry::{KeyPair, KeyRegistry};
use chrono::{DateTime, Duration, Utc};
use common::jwt::TokenClaims;
use jsonwebtoken::Header;
use tracing::instrument;

/// Default lifetime of a normally issued token (1 hour).
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3_600;

/// Placeholder subject placed in every token.
pub const DEFAULT_TOKEN_SUBJECT: &str = "user123";

/// Which key signs the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuanceScenario {
    /// Active key; `exp = now + token_ttl`.
    Normal,
    /// Expired key; `exp` equals the key's own expiry, so the token is
    /// already expired when issued.
    ForcedExpiredKey,
}

impl IssuanceScenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssuanceScenario::Normal => "normal",
            IssuanceScenario::ForcedExpiredKey => "forced_expired_key",
        }
    }
}

/// Per-token settings supplied by the caller.
#[derive(Debug, Clone)]
pub struct IssuanceOptions {
    pub subject: String,
    pub token_ttl: Duration,
}

impl Default for IssuanceOptions {
    fn default() -> Self {
        Self {
            subject: DEFAULT_TOKEN_SUBJECT.to_string(),
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECONDS),
        }
    }
}

fn select_key(
    registry: &KeyRegistry,
    scenario: IssuanceScenario,
) -> Result<&KeyPair, JwksError> {
    let key = match scenario {
        IssuanceScenario::Normal => registry.active_key(),
        IssuanceScenario::ForcedExpiredKey => registry.expired_key(),
    };

    key.ok_or(JwksError::NoKeyAvailable)
}

/// Issue a signed token for `scenario` at `now`.
///
/// The header carries `alg=RS256`, `typ=JWT` and the signing key's `kid`.
/// Either a complete token is returned or nothing; the registry is only read.
///
/// # Errors
///
/// - `JwksError::NoKeyAvailable` - the scenario's key slot is empty
/// - `JwksError::SigningFailure` - the signer failed for any reason, or
///   `now + token_ttl` is not representable
#[instrument(skip_all, fields(scenario = scenario.as_str()))]
pub fn issue(
    registry: &KeyRegistry,
    signer: &dyn Signer,
    scenario: IssuanceScenario,
    now: DateTime<Utc>,
    options: &IssuanceOptions,
) -> Result<String, JwksError> {
    let key = select_key(registry, scenario)?;

    let exp = match scenario {
        IssuanceScenario::Normal => now.checked_add_signed(options.token_ttl).ok_or_else(|| {
            JwksError::SigningFailure(format!(
                "Token expiry out of range (ttl={}s)",
                options.token_ttl.num_seconds()
            ))
        })?,
        IssuanceScenario::ForcedExpiredKey => key.expires_at(),
    };

    let claims = TokenClaims::new(options.subject.clone(), now.timestamp(), exp.timestamp());

    let mut header = Header::new(SIGNING_ALGORITHM);
    header.typ = Some("JWT".to_string());
    header.kid = Some(key.kid().to_string());

    signer
        .sign(&header, &claims, key.private_key_der())
        .map_err(|e| JwksError::SigningFailure(e.to_string()))
}
