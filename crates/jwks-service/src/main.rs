use chrono::Utc;
use jwks_service::config::Config;
use jwks_service::crypto::{Rs256Signer, RsaKeyGenerator};
use jwks_service::observability::metrics::{
    init_metrics_recorder, record_key_generation, set_registry_keys,
};
use jwks_service::routes::{self, AppState};
use jwks_service::services::key_registry::KeyRegistry;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jwks_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JWKS issuer");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        rsa_key_bits = config.rsa_key_bits,
        "Configuration loaded successfully"
    );

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    // Key generation is CPU-bound; keep it off the async workers.
    info!("Generating signing keys...");
    let generator = RsaKeyGenerator::new(config.rsa_key_bits);
    let lifetimes = config.key_lifetimes();
    let registry = tokio::task::spawn_blocking(move || {
        KeyRegistry::initialize(&generator, Utc::now(), lifetimes)
    })
    .await?
    .map_err(|e| {
        record_key_generation("error");
        error!("Failed to generate signing keys: {}", e);
        e
    })?;

    record_key_generation("success");
    set_registry_keys(registry.len());

    if let Some(active) = registry.active_key() {
        info!(kid = %active.kid(), expires_at = %active.expires_at(), "Active key ready");
    }
    if let Some(expired) = registry.expired_key() {
        info!(kid = %expired.kid(), expires_at = %expired.expires_at(), "Expired key ready");
    }

    let bind_address = config.bind_address.clone();

    let state = Arc::new(AppState {
        registry: Arc::new(registry),
        signer: Arc::new(Rs256Signer),
        config,
    });

    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind {}: {}", addr, e);
        e
    })?;

    info!("JWKS issuer listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
