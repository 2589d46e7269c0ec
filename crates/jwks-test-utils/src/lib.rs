//! # JWKS Test Utilities
//!
//! Shared test utilities for the JWKS issuer.
//!
//! This crate provides:
//! - Deterministic crypto fixtures (seeded RSA keys for reproducible tests)
//! - Fault-injecting key generators and signers
//! - Server test harness (`TestJwksServer` for E2E tests)
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jwks_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestJwksServer::spawn().await?;
//!     let token = server.issue_token(false).await?;
//!
//!     token
//!         .assert_valid_jwt()
//!         .assert_signed_by(server.active_kid())
//!         .assert_for_subject("user123");
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod server_harness;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use server_harness::*;
