//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::token::TokenAlgorithm;

/// Configuration for the token service.
///
/// The secret has no default: it must come from the config file or the
/// environment (e.g. `TASKLANE__AUTH__SECRET`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Server secret used to sign and verify tokens.
    #[serde(default)]
    pub secret: String,

    /// Signing algorithm (HS256, HS384 or HS512).
    #[serde(default)]
    pub algorithm: TokenAlgorithm,

    /// Token lifetime in seconds from issuance to expiry.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
}

fn default_token_ttl_secs() -> i64 {
    3600
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            algorithm: TokenAlgorithm::default(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.secret.is_empty() {
            return Err("auth.secret must be set".into());
        }
        if self.secret.len() < 16 {
            return Err("auth.secret must be at least 16 bytes".into());
        }
        if self.token_ttl_secs <= 0 {
            return Err("auth.token_ttl_secs must be > 0".into());
        }
        Ok(())
    }
}
