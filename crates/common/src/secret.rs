//! Secret types for protecting private key material from accidental logging.
//!
//! Re-exports the [`secrecy`] wrappers. `SecretBox<T>` and `SecretString`
//! implement `Debug` with redaction, so a struct that derives `Debug` while
//! holding one never prints the wrapped value. Wrapped values are zeroized
//! on drop.
//!
//! # Usage
//!
//! Use `SecretBox<Vec<u8>>` for DER-encoded private keys and `SecretString`
//! for anything textual (bearer tokens in test fixtures, API keys).
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretBox};
//!
//! #[derive(Debug)]
//! struct SigningMaterial {
//!     kid: String,
//!     private_key_der: SecretBox<Vec<u8>>,
//! }
//!
//! let material = SigningMaterial {
//!     kid: "key-1".to_string(),
//!     private_key_der: SecretBox::new(Box::new(vec![0x30, 0x82])),
//! };
//!
//! // Debug output shows the kid but not the key bytes
//! assert!(!format!("{material:?}").contains("48"));
//!
//! // Access requires an explicit call
//! let der: &[u8] = material.private_key_der.expose_secret();
//! assert_eq!(der, &[0x30, 0x82]);
//! ```

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
