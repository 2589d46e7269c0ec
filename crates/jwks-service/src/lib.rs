//! JWKS issuer library
//!
//! Generates RSA signing keys at startup, publishes the still-valid public
//! halves as a JSON Web Key Set, and issues RS256 tokens on demand. One key is
//! generated already expired so verifiers can be exercised against a token
//! whose `kid` is no longer published.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - Key generation and signing capabilities
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP middleware
//! - `models` - Wire types
//! - `observability` - Metrics
//! - `routes` - Router and shared state
//! - `services` - Key registry and issuance

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
