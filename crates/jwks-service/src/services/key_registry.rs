//! Key registry: owns the signing key pairs and builds the discovery document.
//!
//! The registry is built once at startup and never mutated afterwards, so it
//! can be shared behind an `Arc` and read without locking. It holds at most
//! two keys:
//!
//! - the **active** key, valid for `active_ttl` after initialization
//! - the **expired** key, whose validity ended `expired_age` before it
//!
//! Only keys whose expiry is strictly after the query time are published.

use crate::crypto::{self, KeyGenerator};
use crate::errors::JwksError;
use crate::models::{JsonWebKey, Jwks, JWK_ALGORITHM, JWK_KEY_TYPE, JWK_USE_SIGNATURE};
use chrono::{DateTime, Duration, Utc};
use common::secret::{ExposeSecret, SecretBox};
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use std::fmt;
use tracing::instrument;
use uuid::Uuid;

/// Default validity of the active key (24 hours).
pub const DEFAULT_ACTIVE_KEY_TTL_SECONDS: i64 = 86_400;

/// Default age of the expired key at initialization (1 hour).
pub const DEFAULT_EXPIRED_KEY_AGE_SECONDS: i64 = 3_600;

/// One asymmetric signing key.
///
/// Immutable once constructed. Debug output redacts the private half.
pub struct KeyPair {
    kid: String,
    private_key_der: SecretBox<Vec<u8>>,
    public_key: RsaPublicKey,
    expires_at: DateTime<Utc>,
}

impl KeyPair {
    /// Key identifier, carried as `kid` in token headers and JWKS records.
    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the key may be published at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// PKCS#1 DER of the private key. Only handed to a `Signer`.
    pub(crate) fn private_key_der(&self) -> &[u8] {
        self.private_key_der.expose_secret()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("kid", &self.kid)
            .field("private_key_der", &"[REDACTED]")
            .field("modulus_bits", &(self.public_key.size() * 8))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Validity windows used by [`KeyRegistry::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLifetimes {
    /// How far past `now` the active key stays valid. Must be positive.
    pub active_ttl: Duration,
    /// How far before `now` the expired key stopped being valid. Must be positive.
    pub expired_age: Duration,
}

impl Default for KeyLifetimes {
    fn default() -> Self {
        Self {
            active_ttl: Duration::seconds(DEFAULT_ACTIVE_KEY_TTL_SECONDS),
            expired_age: Duration::seconds(DEFAULT_EXPIRED_KEY_AGE_SECONDS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeySlot {
    Active,
    Expired,
}

/// Registry of signing keys, in insertion order.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    keys: Vec<(KeySlot, KeyPair)>,
}

/// Generate a fresh key pair with a new unique identifier.
///
/// # Errors
///
/// Returns `JwksError::KeyGenFailure` if the generator or DER encoding fails.
#[instrument(skip_all)]
pub fn generate_key_pair(
    generator: &dyn KeyGenerator,
    expires_at: DateTime<Utc>,
) -> Result<KeyPair, JwksError> {
    let private_key = generator
        .generate()
        .map_err(|e| JwksError::KeyGenFailure(e.to_string()))?;

    let private_key_der = crypto::private_key_to_der(&private_key)
        .map_err(|e| JwksError::KeyGenFailure(e.to_string()))?;

    Ok(KeyPair {
        kid: Uuid::new_v4().to_string(),
        private_key_der,
        public_key: private_key.to_public_key(),
        expires_at,
    })
}

/// Convert a key pair into its published JWK record.
pub fn to_discovery_record(key: &KeyPair) -> JsonWebKey {
    JsonWebKey {
        kty: JWK_KEY_TYPE.to_string(),
        kid: key.kid.clone(),
        use_: JWK_USE_SIGNATURE.to_string(),
        alg: JWK_ALGORITHM.to_string(),
        n: crypto::encode_unsigned_be(key.public_key.n()),
        e: crypto::encode_unsigned_be(key.public_key.e()),
    }
}

impl KeyRegistry {
    /// A registry with no keys. Every issuance against it fails.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a registry from explicit slots (active first).
    pub fn from_keys(active: Option<KeyPair>, expired: Option<KeyPair>) -> Self {
        let keys = active
            .map(|key| (KeySlot::Active, key))
            .into_iter()
            .chain(expired.map(|key| (KeySlot::Expired, key)))
            .collect();

        Self { keys }
    }

    /// Generate the active and expired keys relative to `now`.
    ///
    /// # Errors
    ///
    /// Returns `JwksError::KeyGenFailure` if either generation fails or the
    /// lifetimes would not place the active key in the future and the
    /// expired key in the past. The process must not serve in that case.
    #[instrument(skip_all)]
    pub fn initialize(
        generator: &dyn KeyGenerator,
        now: DateTime<Utc>,
        lifetimes: KeyLifetimes,
    ) -> Result<Self, JwksError> {
        if lifetimes.active_ttl <= Duration::zero() || lifetimes.expired_age <= Duration::zero() {
            return Err(JwksError::KeyGenFailure(format!(
                "Key lifetimes must be positive (active_ttl={}s, expired_age={}s)",
                lifetimes.active_ttl.num_seconds(),
                lifetimes.expired_age.num_seconds()
            )));
        }

        let active_expiry = now.checked_add_signed(lifetimes.active_ttl).ok_or_else(|| {
            JwksError::KeyGenFailure(format!(
                "Active key expiry out of range (active_ttl={}s)",
                lifetimes.active_ttl.num_seconds()
            ))
        })?;
        let expired_expiry = now.checked_sub_signed(lifetimes.expired_age).ok_or_else(|| {
            JwksError::KeyGenFailure(format!(
                "Expired key expiry out of range (expired_age={}s)",
                lifetimes.expired_age.num_seconds()
            ))
        })?;

        let active = generate_key_pair(generator, active_expiry)?;
        let expired = generate_key_pair(generator, expired_expiry)?;

        Ok(Self::from_keys(Some(active), Some(expired)))
    }

    fn slot(&self, slot: KeySlot) -> Option<&KeyPair> {
        self.keys
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, key)| key)
    }

    /// The key used for normal issuance.
    pub fn active_key(&self) -> Option<&KeyPair> {
        self.slot(KeySlot::Active)
    }

    /// The pre-expired key used for forced-expired issuance.
    pub fn expired_key(&self) -> Option<&KeyPair> {
        self.slot(KeySlot::Expired)
    }

    /// All keys in insertion order, regardless of validity.
    pub fn keys(&self) -> impl Iterator<Item = &KeyPair> {
        self.keys.iter().map(|(_, key)| key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Build the discovery document for `now`.
    ///
    /// Contains exactly the keys with `expires_at > now`, in insertion order.
    #[instrument(skip_all)]
    pub fn discovery_document(&self, now: DateTime<Utc>) -> Jwks {
        Jwks {
            keys: self
                .keys()
                .filter(|key| key.is_valid_at(now))
                .map(to_discovery_record)
                .collect(),
        }
    }
}
