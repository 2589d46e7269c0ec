//! Observability for the JWKS issuer.
//!
//! Handlers and middleware record through [`metrics`]; `main` installs the
//! Prometheus recorder and exposes it on `/metrics`.
//!
//! Instrumented functions use `#[instrument(skip_all)]` and list their fields
//! explicitly. Key material, DER bytes and issued tokens are never recorded.

pub mod metrics;

pub use self::metrics::{
    init_metrics_recorder, record_http_request, record_jwks_request, record_key_generation,
    record_token_issuance, set_registry_keys,
};
