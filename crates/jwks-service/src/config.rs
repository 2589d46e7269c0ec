use crate::crypto::{DEFAULT_RSA_KEY_BITS, MAX_RSA_KEY_BITS, MIN_RSA_KEY_BITS};
use crate::services::issuance_service::{
    IssuanceOptions, DEFAULT_TOKEN_SUBJECT, DEFAULT_TOKEN_TTL_SECONDS,
};
use crate::services::key_registry::{
    KeyLifetimes, DEFAULT_ACTIVE_KEY_TTL_SECONDS, DEFAULT_EXPIRED_KEY_AGE_SECONDS,
};
use chrono::Duration;
use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default listen address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Upper bound for every lifetime setting (10 years).
pub const MAX_TTL_SECONDS: i64 = 10 * 365 * 86_400;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub rsa_key_bits: usize,
    pub active_key_ttl_seconds: i64,
    pub expired_key_age_seconds: i64,
    pub token_ttl_seconds: i64,
    pub token_subject: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

fn parse_positive_seconds(
    vars: &HashMap<String, String>,
    name: &str,
    default: i64,
) -> Result<i64, ConfigError> {
    let Some(raw) = vars.get(name) else {
        return Ok(default);
    };

    let value: i64 = raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
        name: name.to_string(),
        reason: format!("{} is not an integer ({})", raw, e),
    })?;

    if value <= 0 {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("must be greater than 0, got {}", value),
        });
    }

    if value > MAX_TTL_SECONDS {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("must be at most {}, got {}", MAX_TTL_SECONDS, value),
        });
    }

    Ok(value)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let rsa_key_bits = match vars.get("RSA_KEY_BITS") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| ConfigError::InvalidValue {
                name: "RSA_KEY_BITS".to_string(),
                reason: format!("{} is not an integer ({})", raw, e),
            })?,
            None => DEFAULT_RSA_KEY_BITS,
        };

        if !(MIN_RSA_KEY_BITS..=MAX_RSA_KEY_BITS).contains(&rsa_key_bits) {
            return Err(ConfigError::InvalidValue {
                name: "RSA_KEY_BITS".to_string(),
                reason: format!(
                    "must be between {} and {}, got {}",
                    MIN_RSA_KEY_BITS, MAX_RSA_KEY_BITS, rsa_key_bits
                ),
            });
        }

        let active_key_ttl_seconds = parse_positive_seconds(
            vars,
            "ACTIVE_KEY_TTL_SECONDS",
            DEFAULT_ACTIVE_KEY_TTL_SECONDS,
        )?;
        let expired_key_age_seconds = parse_positive_seconds(
            vars,
            "EXPIRED_KEY_AGE_SECONDS",
            DEFAULT_EXPIRED_KEY_AGE_SECONDS,
        )?;
        let token_ttl_seconds =
            parse_positive_seconds(vars, "TOKEN_TTL_SECONDS", DEFAULT_TOKEN_TTL_SECONDS)?;

        let token_subject = vars
            .get("TOKEN_SUBJECT")
            .cloned()
            .unwrap_or_else(|| DEFAULT_TOKEN_SUBJECT.to_string());

        if token_subject.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "TOKEN_SUBJECT".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(Config {
            bind_address,
            rsa_key_bits,
            active_key_ttl_seconds,
            expired_key_age_seconds,
            token_ttl_seconds,
            token_subject,
        })
    }

    /// Validity windows for registry initialization
    pub fn key_lifetimes(&self) -> KeyLifetimes {
        KeyLifetimes {
            active_ttl: Duration::seconds(self.active_key_ttl_seconds),
            expired_age: Duration::seconds(self.expired_key_age_seconds),
        }
    }

    /// Claim settings for issuance
    pub fn issuance_options(&self) -> IssuanceOptions {
        IssuanceOptions {
            subject: self.token_subject.clone(),
            token_ttl: Duration::seconds(self.token_ttl_seconds),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            rsa_key_bits: DEFAULT_RSA_KEY_BITS,
            active_key_ttl_seconds: DEFAULT_ACTIVE_KEY_TTL_SECONDS,
            expired_key_age_seconds: DEFAULT_EXPIRED_KEY_AGE_SECONDS,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            token_subject: DEFAULT_TOKEN_SUBJECT.to_string(),
        }
    }
}
