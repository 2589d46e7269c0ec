//! Cryptographic capabilities: RSA key generation and RS256 token signing.
//!
//! Both operations are exposed as traits so the registry and the issuance
//! service can be driven with fault-injecting implementations in tests:
//!
//! - [`KeyGenerator`] produces fresh RSA private keys ([`RsaKeyGenerator`])
//! - [`Signer`] turns a header and claim set into a compact JWT ([`Rs256Signer`])
//!
//! Private keys cross the [`Signer`] seam as PKCS#1 DER bytes only.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use common::jwt::TokenClaims;
use common::secret::SecretBox;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::{BigUint, RsaPrivateKey};
use thiserror::Error;
use tracing::instrument;

/// The single signing algorithm used for every key in the registry.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::RS256;

/// Minimum accepted RSA modulus size in bits.
pub const MIN_RSA_KEY_BITS: usize = 2048;

/// Maximum accepted RSA modulus size in bits.
///
/// Larger keys take tens of seconds to generate on startup.
pub const MAX_RSA_KEY_BITS: usize = 4096;

/// Default RSA modulus size in bits.
pub const DEFAULT_RSA_KEY_BITS: usize = 2048;

/// Errors raised by the cryptographic capabilities.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

/// Capability that produces fresh RSA private keys.
pub trait KeyGenerator: Send + Sync {
    fn generate(&self) -> Result<RsaPrivateKey, CryptoError>;
}

/// Capability that signs a claim set with a private key.
///
/// Implementations must embed `header` verbatim (in particular its `kid`)
/// and return the compact serialized token.
pub trait Signer: Send + Sync {
    fn sign(
        &self,
        header: &Header,
        claims: &TokenClaims,
        private_key_der: &[u8],
    ) -> Result<String, CryptoError>;
}

/// Production key generator backed by the thread-local CSPRNG.
#[derive(Debug, Clone, Copy)]
pub struct RsaKeyGenerator {
    bits: usize,
}

impl RsaKeyGenerator {
    pub fn new(bits: usize) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> usize {
        self.bits
    }
}

impl Default for RsaKeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_RSA_KEY_BITS)
    }
}

impl KeyGenerator for RsaKeyGenerator {
    #[instrument(skip_all, fields(bits = self.bits))]
    fn generate(&self) -> Result<RsaPrivateKey, CryptoError> {
        if !(MIN_RSA_KEY_BITS..=MAX_RSA_KEY_BITS).contains(&self.bits) {
            return Err(CryptoError::KeyGeneration(format!(
                "Invalid RSA key size: {} (must be {}-{})",
                self.bits, MIN_RSA_KEY_BITS, MAX_RSA_KEY_BITS
            )));
        }

        RsaPrivateKey::new(&mut rand::thread_rng(), self.bits)
            .map_err(|e| CryptoError::KeyGeneration(format!("RSA keypair generation failed: {}", e)))
    }
}

/// Production signer: RS256 via `jsonwebtoken`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rs256Signer;

impl Signer for Rs256Signer {
    #[instrument(skip_all)]
    fn sign(
        &self,
        header: &Header,
        claims: &TokenClaims,
        private_key_der: &[u8],
    ) -> Result<String, CryptoError> {
        if header.alg != SIGNING_ALGORITHM {
            return Err(CryptoError::Signing(format!(
                "Unsupported algorithm: {:?}",
                header.alg
            )));
        }

        let encoding_key = EncodingKey::from_rsa_der(private_key_der);

        encode(header, claims, &encoding_key)
            .map_err(|e| CryptoError::Signing(format!("JWT signing operation failed: {}", e)))
    }
}

/// Serialize a private key as PKCS#1 DER for use with [`Signer`].
#[instrument(skip_all)]
pub fn private_key_to_der(private_key: &RsaPrivateKey) -> Result<SecretBox<Vec<u8>>, CryptoError> {
    let document = private_key
        .to_pkcs1_der()
        .map_err(|e| CryptoError::KeyGeneration(format!("PKCS#1 encoding failed: {}", e)))?;

    Ok(SecretBox::new(Box::new(document.as_bytes().to_vec())))
}

/// Encode an unsigned integer as a JWK numeric component.
///
/// Minimal big-endian bytes (a single zero byte for zero), base64url
/// without padding.
pub fn encode_unsigned_be(value: &BigUint) -> String {
    URL_SAFE_NO_PAD.encode(value.to_bytes_be())
}
