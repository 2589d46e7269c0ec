//! Common utilities and types shared by the JWKS issuer and its verifiers.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for JWT utilities (claims, size limits, key id extraction)
pub mod jwt;
