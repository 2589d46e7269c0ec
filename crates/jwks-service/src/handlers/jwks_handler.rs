use crate::models::Jwks;
use crate::observability::metrics::record_jwks_request;
use crate::routes::AppState;
use axum::{
    extract::State,
    http::header::{HeaderMap, HeaderValue, CACHE_CONTROL},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

/// Handle discovery request
///
/// GET /.well-known/jwks.json
///
/// Returns the public half of every key still valid at request time
/// (RFC 7517). Responses are marked `no-store` so verifiers always see the
/// current set; an empty `keys` array is a valid answer.
#[instrument(name = "jwks.discovery.get", skip_all, fields(keys_published))]
pub async fn handle_get_jwks(State(state): State<Arc<AppState>>) -> (HeaderMap, Json<Jwks>) {
    let jwks = state.registry.discovery_document(Utc::now());

    tracing::Span::current().record("keys_published", jwks.keys.len() as u64);
    record_jwks_request(jwks.keys.len());

    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    (headers, Json(jwks))
}
