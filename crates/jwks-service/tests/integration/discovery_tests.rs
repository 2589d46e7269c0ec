//! Integration tests for the discovery endpoint.

use chrono::{Duration, Utc};
use jwks_service::crypto::Rs256Signer;
use jwks_service::models::Jwks;
use jwks_service::services::key_registry::{generate_key_pair, KeyRegistry};
use jwks_test_utils::{FixtureKeyGenerator, TestJwksServer};
use reqwest::StatusCode;
use std::sync::Arc;

/// Only the active key is published; the expired key never appears.
#[tokio::test]
async fn test_discovery_publishes_only_active_key() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn().await?;

    // Act
    let jwks = server.fetch_jwks().await?;

    // Assert
    assert_eq!(jwks.keys.len(), 1, "Exactly one key should be published");
    let key = jwks.find(server.active_kid()).expect("active kid should be published");
    assert!(
        jwks.find(server.expired_kid()).is_none(),
        "expired kid must not be published"
    );

    assert_eq!(key.kty, "RSA");
    assert_eq!(key.use_, "sig");
    assert_eq!(key.alg, "RS256");
    assert_eq!(key.e, "AQAB");
    assert!(!key.n.contains('='), "modulus must be unpadded base64url");

    Ok(())
}

/// Verifiers must never cache the document.
#[tokio::test]
async fn test_discovery_is_not_cacheable() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;

    let response = reqwest::get(format!("{}/.well-known/jwks.json", server.url())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(reqwest::header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok()),
        Some("no-store")
    );
    assert!(response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json")));

    Ok(())
}

/// The wire shape uses `use` (not `use_`) and nothing beyond the six fields.
#[tokio::test]
async fn test_discovery_wire_shape() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;

    let body: serde_json::Value =
        reqwest::get(format!("{}/.well-known/jwks.json", server.url()))
            .await?
            .json()
            .await?;

    let record = body["keys"][0]
        .as_object()
        .expect("first key should be an object");
    let mut fields: Vec<&str> = record.keys().map(String::as_str).collect();
    fields.sort_unstable();
    assert_eq!(fields, vec!["alg", "e", "kid", "kty", "n", "use"]);

    Ok(())
}

/// Repeated requests return the same document.
#[tokio::test]
async fn test_discovery_is_stable() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;

    let first = server.fetch_jwks().await?;
    let second = server.fetch_jwks().await?;

    assert_eq!(first, second);
    Ok(())
}

/// A registry whose keys have all lapsed publishes an empty set, not an error.
#[tokio::test]
async fn test_discovery_with_no_valid_keys() -> Result<(), anyhow::Error> {
    let generator = FixtureKeyGenerator::default();
    let lapsed = generate_key_pair(&generator, Utc::now() - Duration::minutes(5))?;
    let registry = KeyRegistry::from_keys(None, Some(lapsed));

    let server = TestJwksServer::spawn_with(registry, Arc::new(Rs256Signer)).await?;

    let jwks = server.fetch_jwks().await?;
    assert_eq!(jwks, Jwks::default());

    Ok(())
}

#[tokio::test]
async fn test_discovery_rejects_other_methods() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;
    let client = reqwest::Client::new();
    let url = format!("{}/.well-known/jwks.json", server.url());

    for response in [
        client.post(&url).send().await?,
        client.put(&url).send().await?,
        client.delete(&url).send().await?,
    ] {
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    Ok(())
}
