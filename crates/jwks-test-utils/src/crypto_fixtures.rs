//! Deterministic cryptographic fixtures for testing
//!
//! RSA key generation is slow, so seeded keys are generated once per process
//! and cloned out of a cache. The same seed always yields the same key.

use common::jwt::TokenClaims;
use jsonwebtoken::Header;
use jwks_service::crypto::{CryptoError, KeyGenerator, Rs256Signer, Signer, DEFAULT_RSA_KEY_BITS};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rsa::RsaPrivateKey;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

/// Seeds handed out by [`FixtureKeyGenerator`], in order.
pub const FIXTURE_SEEDS: [u64; 2] = [1, 2];

static KEY_CACHE: OnceLock<Mutex<HashMap<u64, RsaPrivateKey>>> = OnceLock::new();

/// Deterministic 2048-bit RSA key for `seed`.
///
/// # Example
/// ```rust,ignore
/// let a = test_signing_key(1);
/// let b = test_signing_key(1);
/// assert_eq!(a, b);
/// ```
pub fn test_signing_key(seed: u64) -> RsaPrivateKey {
    let cache = KEY_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut keys = cache.lock().expect("fixture key cache poisoned");

    keys.entry(seed)
        .or_insert_with(|| {
            RsaPrivateKey::new(&mut ChaCha8Rng::seed_from_u64(seed), DEFAULT_RSA_KEY_BITS)
                .expect("fixture key generation should succeed")
        })
        .clone()
}

/// Key generator that cycles through [`FIXTURE_SEEDS`].
///
/// Registry initialization generates the active key first, so it gets
/// `test_signing_key(1)` and the expired key gets `test_signing_key(2)`.
#[derive(Debug, Default)]
pub struct FixtureKeyGenerator {
    calls: AtomicU64,
}

impl FixtureKeyGenerator {
    /// Number of keys generated so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl KeyGenerator for FixtureKeyGenerator {
    fn generate(&self) -> Result<RsaPrivateKey, CryptoError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let seed = FIXTURE_SEEDS[(call % FIXTURE_SEEDS.len() as u64) as usize];
        Ok(test_signing_key(seed))
    }
}

/// Key generator that fails on one zero-based call.
#[derive(Debug)]
pub struct FailingKeyGenerator {
    fail_on_call: u64,
    inner: FixtureKeyGenerator,
}

impl FailingKeyGenerator {
    /// Fail the first generation (the active key).
    pub fn always() -> Self {
        Self::on_call(0)
    }

    /// Fail generation number `fail_on_call`; 1 is the expired key.
    pub fn on_call(fail_on_call: u64) -> Self {
        Self {
            fail_on_call,
            inner: FixtureKeyGenerator::default(),
        }
    }
}

impl KeyGenerator for FailingKeyGenerator {
    fn generate(&self) -> Result<RsaPrivateKey, CryptoError> {
        if self.inner.calls() == self.fail_on_call {
            self.inner.calls.fetch_add(1, Ordering::SeqCst);
            return Err(CryptoError::KeyGeneration(
                "entropy source exhausted".to_string(),
            ));
        }
        self.inner.generate()
    }
}

/// Signer that always fails.
#[derive(Debug, Default)]
pub struct FailingSigner;

impl Signer for FailingSigner {
    fn sign(
        &self,
        _header: &Header,
        _claims: &TokenClaims,
        _private_key_der: &[u8],
    ) -> Result<String, CryptoError> {
        Err(CryptoError::Signing("HSM unavailable".to_string()))
    }
}

/// Signer whose failure mode can be switched while a server is running.
///
/// Delegates to [`Rs256Signer`] while healthy.
#[derive(Debug, Default)]
pub struct ToggleSigner {
    failing: AtomicBool,
}

impl ToggleSigner {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn is_failing(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }
}

impl Signer for ToggleSigner {
    fn sign(
        &self,
        header: &Header,
        claims: &TokenClaims,
        private_key_der: &[u8],
    ) -> Result<String, CryptoError> {
        if self.is_failing() {
            return Err(CryptoError::Signing("signer toggled off".to_string()));
        }
        Rs256Signer.sign(header, claims, private_key_der)
    }
}
