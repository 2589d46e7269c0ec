//! HTTP request handlers for the JWKS issuer.

pub mod auth_handler;
pub mod health;
pub mod jwks_handler;
pub mod metrics;

pub use auth_handler::{handle_issue_token, AuthQuery};
pub use health::health_check;
pub use jwks_handler::handle_get_jwks;
pub use self::metrics::metrics_handler;
