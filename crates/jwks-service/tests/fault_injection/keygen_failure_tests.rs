//! Fault injection: key generation fails during startup.
//!
//! A failed initialization yields no registry at all, so nothing can be
//! served from partially generated keys.

use chrono::Utc;
use jwks_service::crypto::Rs256Signer;
use jwks_service::errors::JwksError;
use jwks_service::services::key_registry::{KeyLifetimes, KeyRegistry};
use jwks_test_utils::{FailingKeyGenerator, TestJwksServer};
use reqwest::StatusCode;
use std::sync::Arc;

#[test]
fn test_active_key_failure_aborts_initialization() {
    let result = KeyRegistry::initialize(
        &FailingKeyGenerator::always(),
        Utc::now(),
        KeyLifetimes::default(),
    );

    assert!(
        matches!(result, Err(JwksError::KeyGenFailure(ref msg)) if msg.contains("entropy")),
        "expected KeyGenFailure, got {:?}",
        result
    );
}

#[test]
fn test_expired_key_failure_aborts_initialization() {
    let result = KeyRegistry::initialize(
        &FailingKeyGenerator::on_call(1),
        Utc::now(),
        KeyLifetimes::default(),
    );

    assert!(matches!(result, Err(JwksError::KeyGenFailure(_))));
}

/// Serving an empty registry: discovery is empty and issuance reports that
/// no key is available.
#[tokio::test]
async fn test_empty_registry_behaviour() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn_with(KeyRegistry::empty(), Arc::new(Rs256Signer)).await?;
    let client = reqwest::Client::new();

    let jwks = server.fetch_jwks().await?;
    assert!(jwks.keys.is_empty());

    for query in ["", "?expired=true"] {
        let response = client
            .post(format!("{}/auth{}", server.url(), query))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["error"]["code"], "NO_KEY_AVAILABLE");
    }

    Ok(())
}
