//! Metrics definitions for the JWKS issuer
//!
//! All metrics follow Prometheus naming conventions:
//! - `jwks_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `scenario`: 2 values (normal, forced_expired_key)
//! - `status`: 2 values (success, error)
//! - `error_code`: 3 values plus "none"
//! - `path`: known routes, everything else collapses to "/other"

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the global Prometheus recorder and return its render handle.
///
/// Fails if a recorder is already installed in this process.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // RS256 signing is ~1-5ms; buckets stretch to cover slow hosts
        .set_buckets_for_metric(
            Matcher::Prefix("jwks_token_issuance".to_string()),
            &[0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("jwks_http_request".to_string()),
            &[0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// Discovery Metrics
// ============================================================================

/// Record a discovery document request
///
/// Metric: `jwks_requests_total`, `jwks_keys_published`
pub fn record_jwks_request(keys_published: usize) {
    counter!("jwks_requests_total").increment(1);
    gauge!("jwks_keys_published").set(keys_published as f64);
}

// ============================================================================
// Issuance Metrics
// ============================================================================

/// Record token issuance duration and outcome
///
/// Metric: `jwks_token_issuance_duration_seconds`, `jwks_token_issuance_total`
/// Labels: `scenario`, `status`, `error_code`
pub fn record_token_issuance(
    scenario: &str,
    status: &str,
    error_code: Option<&str>,
    duration: Duration,
) {
    histogram!("jwks_token_issuance_duration_seconds", "scenario" => scenario.to_string(), "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("jwks_token_issuance_total",
        "scenario" => scenario.to_string(),
        "status" => status.to_string(),
        "error_code" => error_code.unwrap_or("none").to_string()
    )
    .increment(1);
}

// ============================================================================
// Key Management Metrics
// ============================================================================

/// Record a key generation attempt at startup
///
/// Metric: `jwks_key_generation_total`
/// Labels: `status`
pub fn record_key_generation(status: &str) {
    counter!("jwks_key_generation_total", "status" => status.to_string()).increment(1);
}

/// Update the number of keys held by the registry
///
/// Metric: `jwks_registry_keys`
pub fn set_registry_keys(count: usize) {
    gauge!("jwks_registry_keys").set(count as f64);
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `jwks_http_requests_total`, `jwks_http_request_duration_seconds`
/// Labels: `method`, `path`, `status_code`
///
/// Captures framework-level responses too (404, 405).
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let normalized_path = normalize_path(path);

    histogram!("jwks_http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => normalized_path,
        "status_code" => status_code.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("jwks_http_requests_total",
        "method" => method.to_string(),
        "path" => normalized_path,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Collapse unknown paths so scanners cannot blow up label cardinality
fn normalize_path(path: &str) -> &'static str {
    match path {
        "/.well-known/jwks.json" => "/.well-known/jwks.json",
        "/auth" => "/auth",
        "/health" => "/health",
        "/metrics" => "/metrics",
        _ => "/other",
    }
}
