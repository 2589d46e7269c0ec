//! Test server harness for E2E testing
//!
//! Provides `TestJwksServer` for spawning real issuer instances in tests.

use crate::crypto_fixtures::FixtureKeyGenerator;
use chrono::Utc;
use jwks_service::config::Config;
use jwks_service::crypto::{Rs256Signer, Signer};
use jwks_service::models::{Jwks, TokenResponse};
use jwks_service::observability::metrics::init_metrics_recorder;
use jwks_service::routes::{self, AppState};
use jwks_service::services::key_registry::{KeyLifetimes, KeyRegistry};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Test harness for spawning the JWKS issuer in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_discovery_e2e() -> Result<()> {
///     let server = TestJwksServer::spawn().await?;
///
///     let response = reqwest::get(format!("{}/.well-known/jwks.json", server.url())).await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestJwksServer {
    addr: SocketAddr,
    registry: Arc<KeyRegistry>,
    client: reqwest::Client,
    _handle: JoinHandle<()>,
}

impl TestJwksServer {
    /// Spawn a server with fixture keys (active first, then expired) and
    /// the real RS256 signer.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        let registry = KeyRegistry::initialize(
            &FixtureKeyGenerator::default(),
            Utc::now(),
            KeyLifetimes::default(),
        )
        .map_err(|e| anyhow::anyhow!("Failed to initialize key registry: {}", e))?;

        Self::spawn_with(registry, Arc::new(Rs256Signer)).await
    }

    /// Spawn a server around an explicit registry and signer.
    ///
    /// The server binds to 127.0.0.1:0 and runs until the harness is dropped
    /// with the test runtime.
    pub async fn spawn_with(
        registry: KeyRegistry,
        signer: Arc<dyn Signer>,
    ) -> Result<Self, anyhow::Error> {
        let registry = Arc::new(registry);

        let state = Arc::new(AppState {
            registry: registry.clone(),
            signer,
            config: Config {
                bind_address: "127.0.0.1:0".to_string(),
                ..Config::default()
            },
        });

        // The global recorder can only be installed once per test process;
        // later servers get a standalone handle.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => PrometheusBuilder::new().build_recorder().handle(),
        };

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            registry,
            client: reqwest::Client::new(),
            _handle: handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Registry the server was started with
    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    /// `kid` of the active key. Panics if the registry has none.
    pub fn active_kid(&self) -> &str {
        self.registry
            .active_key()
            .expect("test registry has no active key")
            .kid()
    }

    /// `kid` of the expired key. Panics if the registry has none.
    pub fn expired_kid(&self) -> &str {
        self.registry
            .expired_key()
            .expect("test registry has no expired key")
            .kid()
    }

    /// GET the discovery document, failing on any non-200 response.
    pub async fn fetch_jwks(&self) -> Result<Jwks, anyhow::Error> {
        let jwks = self
            .client
            .get(format!("{}/.well-known/jwks.json", self.url()))
            .send()
            .await?
            .error_for_status()?
            .json::<Jwks>()
            .await?;
        Ok(jwks)
    }

    /// POST /auth, optionally with `?expired=true`, failing on any non-200
    /// response.
    pub async fn issue_token(&self, expired: bool) -> Result<String, anyhow::Error> {
        let mut url = format!("{}/auth", self.url());
        if expired {
            url.push_str("?expired=true");
        }

        let response = self
            .client
            .post(url)
            .send()
            .await?
            .error_for_status()?
            .json::<TokenResponse>()
            .await?;
        Ok(response.token)
    }
}
