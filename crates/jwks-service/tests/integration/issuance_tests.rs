//! Integration tests for the issuance endpoint.

use jwks_service::models::TokenResponse;
use jwks_service::services::key_registry::to_discovery_record;
use jwks_test_utils::{TestJwksServer, TokenAssertions};
use reqwest::StatusCode;

/// A normal token names the active key, verifies against the published
/// record and expires an hour from now.
#[tokio::test]
async fn test_normal_token_verifies_against_discovery() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn().await?;

    // Act
    let token = server.issue_token(false).await?;
    let jwks = server.fetch_jwks().await?;

    // Assert
    let record = jwks
        .find(server.active_kid())
        .expect("active kid should be published");

    token
        .assert_valid_jwt()
        .assert_signed_by(server.active_kid())
        .assert_for_subject("user123")
        .assert_expires_in(3600)
        .assert_verifies_with(record);

    Ok(())
}

/// `?expired=true` signs with the expired key, whose kid is missing from
/// discovery, and the token is already past its `exp`.
#[tokio::test]
async fn test_expired_token_kid_is_not_published() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;

    let token = server.issue_token(true).await?;
    let jwks = server.fetch_jwks().await?;

    token
        .assert_valid_jwt()
        .assert_signed_by(server.expired_kid())
        .assert_expired();

    assert!(
        jwks.find(server.expired_kid()).is_none(),
        "a verifier resolving the kid must find nothing"
    );

    // The signature itself is sound; only the key is gone.
    let expired_key = server
        .registry()
        .expired_key()
        .expect("registry should hold an expired key");
    token.assert_verifies_with(&to_discovery_record(expired_key));

    Ok(())
}

/// Any non-empty `expired` value selects the expired key; empty does not.
#[tokio::test]
async fn test_expired_query_values() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;
    let client = reqwest::Client::new();

    for (query, expected_kid) in [
        ("?expired=1", server.expired_kid()),
        ("?expired=false", server.expired_kid()),
        ("?expired=", server.active_kid()),
        ("", server.active_kid()),
    ] {
        let response: TokenResponse = client
            .post(format!("{}/auth{}", server.url(), query))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.token.assert_signed_by(expected_kid);
    }

    Ok(())
}

/// The request body is ignored.
#[tokio::test]
async fn test_request_body_is_ignored() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/auth", server.url()))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(r#"{"sub":"admin","exp":9999999999}"#)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: TokenResponse = response.json().await?;
    body.token.assert_for_subject("user123");

    Ok(())
}

/// Each call produces an independently valid token.
#[tokio::test]
async fn test_concurrent_issuance() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;

    let tokens = issue_concurrently(&server, 8).await?;

    let jwks = server.fetch_jwks().await?;
    let record = jwks
        .find(server.active_kid())
        .expect("active kid should be published");
    for token in &tokens {
        token.assert_verifies_with(record);
    }

    Ok(())
}

async fn issue_concurrently(
    server: &TestJwksServer,
    count: usize,
) -> Result<Vec<String>, anyhow::Error> {
    let mut set = tokio::task::JoinSet::new();
    for _ in 0..count {
        let url = format!("{}/auth", server.url());
        set.spawn(async move {
            let response: TokenResponse = reqwest::Client::new()
                .post(url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            Ok::<_, anyhow::Error>(response.token)
        });
    }

    let mut tokens = Vec::with_capacity(count);
    while let Some(joined) = set.join_next().await {
        tokens.push(joined??);
    }
    Ok(tokens)
}

#[tokio::test]
async fn test_auth_rejects_other_methods() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;
    let client = reqwest::Client::new();
    let url = format!("{}/auth", server.url());

    for response in [
        client.get(&url).send().await?,
        client.put(&url).send().await?,
        client.delete(&url).send().await?,
    ] {
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    Ok(())
}
