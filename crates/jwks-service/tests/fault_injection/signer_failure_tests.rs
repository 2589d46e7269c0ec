//! Fault injection: the signing capability fails while the server runs.

use chrono::Utc;
use jwks_service::services::key_registry::{KeyLifetimes, KeyRegistry};
use jwks_test_utils::{
    FailingSigner, FixtureKeyGenerator, TestJwksServer, ToggleSigner, TokenAssertions,
};
use reqwest::StatusCode;
use std::sync::Arc;

fn fixture_registry() -> Result<KeyRegistry, anyhow::Error> {
    Ok(KeyRegistry::initialize(
        &FixtureKeyGenerator::default(),
        Utc::now(),
        KeyLifetimes::default(),
    )?)
}

/// A signing failure is a generic 500 that leaks nothing about the cause.
#[tokio::test]
async fn test_signing_failure_returns_generic_500() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn_with(fixture_registry()?, Arc::new(FailingSigner)).await?;

    // Act
    let response = reqwest::Client::new()
        .post(format!("{}/auth", server.url()))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "SIGNING_FAILURE");
    assert_eq!(body["error"]["message"], "Failed to sign token");
    assert!(
        !body.to_string().contains("HSM"),
        "internal cause must not reach the client"
    );

    Ok(())
}

/// Discovery keeps working while the signer is down.
#[tokio::test]
async fn test_discovery_unaffected_by_signer_failure() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn_with(fixture_registry()?, Arc::new(FailingSigner)).await?;

    let jwks = server.fetch_jwks().await?;

    assert_eq!(jwks.keys.len(), 1);
    assert!(jwks.find(server.active_kid()).is_some());

    Ok(())
}

/// A failed request leaves no state behind: once the signer recovers the
/// next issuance succeeds with the same key.
#[tokio::test]
async fn test_issuance_recovers_after_signer_failure() -> Result<(), anyhow::Error> {
    let signer = Arc::new(ToggleSigner::default());
    let server = TestJwksServer::spawn_with(fixture_registry()?, signer.clone()).await?;
    let client = reqwest::Client::new();
    let url = format!("{}/auth", server.url());

    signer.set_failing(true);
    let failed = client.post(&url).send().await?;
    assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);

    signer.set_failing(false);
    let token = server.issue_token(false).await?;
    token.assert_valid_jwt().assert_signed_by(server.active_kid());

    Ok(())
}
