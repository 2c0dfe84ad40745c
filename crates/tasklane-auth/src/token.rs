//! Stateless JWT identity tokens.
//!
//! Tokens embed a snapshot of the user's public fields next to the
//! standard time claims, so validation never goes back to the store. The
//! snapshot may be stale relative to concurrent profile changes; that is
//! the accepted price of statelessness. There is no revocation list: a
//! token dies at expiry or on signature mismatch, never earlier.
//!
//! ## Token lifecycle
//!
//! `Issued → Valid (while now ∈ [nbf, exp] and the signature holds) →
//! Expired (terminal)`.

use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use tasklane_core::User;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::AuthResult;

// ============================================================================
// Signing Algorithm
// ============================================================================

/// Supported HMAC signing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TokenAlgorithm {
    /// HMAC with SHA-256 (default).
    #[default]
    HS256,
    /// HMAC with SHA-384.
    HS384,
    /// HMAC with SHA-512.
    HS512,
}

impl TokenAlgorithm {
    /// Converts to the `jsonwebtoken` Algorithm type.
    #[must_use]
    pub fn to_jwt_algorithm(self) -> Algorithm {
        match self {
            Self::HS256 => Algorithm::HS256,
            Self::HS384 => Algorithm::HS384,
            Self::HS512 => Algorithm::HS512,
        }
    }

    /// Returns the algorithm name as used in JWT headers.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
        }
    }
}

impl fmt::Display for TokenAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Claims
// ============================================================================

/// Claims carried by an identity token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentityClaims {
    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Not valid before (Unix timestamp). Equal to `iat`.
    pub nbf: i64,

    /// Expiration time (Unix timestamp): `iat` plus the configured TTL.
    pub exp: i64,

    /// Subject: the user id.
    pub sub: String,

    /// Embedded snapshot of the user's public fields.
    pub user: User,
}

/// A signed token as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedToken {
    /// The encoded JWT.
    pub access_token: String,

    /// Always `"bearer"`.
    pub token_type: String,
}

impl SignedToken {
    fn new(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".into(),
        }
    }
}

// ============================================================================
// Token Service
// ============================================================================

/// Issues and validates signed, time-bound identity tokens.
pub struct TokenService {
    algorithm: TokenAlgorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Creates a token service from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the config does not
    /// validate (missing secret, non-positive TTL).
    pub fn new(config: &AuthConfig) -> AuthResult<Self> {
        config.validate().map_err(AuthError::configuration)?;

        let mut validation = Validation::new(config.algorithm.to_jwt_algorithm());
        // Zero leeway: the expiry boundary is exact.
        validation.leeway = 0;
        validation.validate_nbf = true;

        Ok(Self {
            algorithm: config.algorithm,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl: Duration::seconds(config.token_ttl_secs),
        })
    }

    /// The configured token lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for the given user, valid from now until now + TTL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if encoding fails.
    pub fn issue(&self, user: &User) -> AuthResult<SignedToken> {
        self.issue_at(user, OffsetDateTime::now_utc())
    }

    fn issue_at(&self, user: &User, now: OffsetDateTime) -> AuthResult<SignedToken> {
        let iat = now.unix_timestamp();
        let claims = IdentityClaims {
            iat,
            nbf: iat,
            exp: (now + self.ttl).unix_timestamp(),
            sub: user.id.to_string(),
            user: user.clone(),
        };

        let token = encode(
            &Header::new(self.algorithm.to_jwt_algorithm()),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| AuthError::internal(format!("failed to encode token: {e}")))?;

        Ok(SignedToken::new(token))
    }

    /// Validates a token string and returns the embedded user snapshot.
    ///
    /// No store re-fetch happens here: the snapshot is trusted as long as
    /// the signature holds and the current time is inside `[nbf, exp]`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenExpired`] past the expiry instant and
    /// [`AuthError::InvalidToken`] for a malformed token, a signature
    /// mismatch, or a token used before its not-before instant.
    pub fn validate(&self, token: &str) -> AuthResult<User> {
        let data = decode::<IdentityClaims>(token, &self.decoding_key, &self.validation)
            .map_err(map_decode_error)?;
        Ok(data.claims.user)
    }
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::invalid_token("signature mismatch"),
        ErrorKind::ImmatureSignature => AuthError::invalid_token("token not yet valid"),
        _ => AuthError::invalid_token(err.to_string()),
    }
}
