use serde::{Deserialize, Serialize};

/// Key type published for every record.
pub const JWK_KEY_TYPE: &str = "RSA";

/// Intended use published for every record.
pub const JWK_USE_SIGNATURE: &str = "sig";

/// Algorithm name published for every record.
pub const JWK_ALGORITHM: &str = "RS256";

/// JSON Web Key (RFC 7517) for an RSA signing key
///
/// Field order and names are part of the wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    pub kty: String,
    pub kid: String,
    #[serde(rename = "use")]
    pub use_: String,
    pub alg: String,
    /// Modulus, base64url (no padding) of the minimal big-endian bytes
    pub n: String,
    /// Public exponent, same encoding as `n`
    pub e: String,
}

/// JSON Web Key Set (discovery document)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<JsonWebKey>,
}

impl Jwks {
    /// Look up a record by key id
    pub fn find(&self, kid: &str) -> Option<&JsonWebKey> {
        self.keys.iter().find(|key| key.kid == kid)
    }
}

/// Issuance response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
