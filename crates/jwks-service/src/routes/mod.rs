//! HTTP routes for the JWKS issuer.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::crypto::Signer;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::services::key_registry::KeyRegistry;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
///
/// The registry is immutable once built, so handlers share it without locks.
#[derive(Clone)]
pub struct AppState {
    /// Keys generated at startup.
    pub registry: Arc<KeyRegistry>,

    /// Signing capability used for issuance.
    pub signer: Arc<dyn Signer>,

    /// Service configuration.
    pub config: Config,
}

/// Build the application routes.
///
/// - `GET /.well-known/jwks.json` - discovery document
/// - `POST /auth` - token issuance (`?expired=<non-empty>` for the expired key)
/// - `GET /health` - liveness probe
/// - `GET /metrics` - Prometheus scrape endpoint
///
/// Any other method on a known path gets 405 from the router.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let app_routes = Router::new()
        .route("/.well-known/jwks.json", get(handlers::handle_get_jwks))
        .route("/auth", post(handlers::handle_issue_token))
        .route("/health", get(handlers::health_check))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Each .layer() wraps everything added before it:
    // 1. TraceLayer (innermost)
    // 2. TimeoutLayer
    // 3. http_metrics_middleware (outermost, sees 404/405 too)
    app_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn(http_metrics_middleware))
}
