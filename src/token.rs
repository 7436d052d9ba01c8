//! Token Codec
//!
//! Encodes and decodes signed, expiring bearer tokens. Tokens are compact
//! JWTs signed with HMAC-SHA256; the symmetric key is derived once from the
//! configured secret (UTF-8 bytes) and held for the process lifetime.
//!
//! Access and refresh tokens share one signing key and one encoding but are
//! namespace-separated by the `token_type` claim. This prevents a leaked
//! refresh token from being replayed as an access token (and vice versa)
//! without requiring two separate keys.
//!
//! # Usage
//!
//! ```ignore
//! use rosterd::token::{TokenCodec, TokenType};
//! use std::time::Duration;
//!
//! let codec = TokenCodec::new("a-sufficiently-long-signing-secret-value");
//! let token = codec.encode("admin", Duration::from_secs(3600), TokenType::Access)?;
//! let claims = codec.decode(&token)?;
//! assert_eq!(claims.sub, "admin");
//! ```

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{
    decode, encode, errors::ErrorKind as JwtErrorKind, Algorithm, DecodingKey, EncodingKey,
    Header, Validation,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Token Types and Claims
// ============================================================================

/// Token namespace tag: access tokens authorize API calls, refresh tokens
/// are exchangeable for a new pair. The two are never interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claim set carried by every issued token.
///
/// The subject is the principal's username at issuance time; there is no
/// claim mutation after signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (principal username)
    pub sub: String,
    /// Issued at (Unix timestamp, seconds)
    pub iat: u64,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: u64,
    /// Token namespace tag
    #[serde(rename = "token_type")]
    pub token_type: TokenType,
}

// ============================================================================
// Decode Failure Taxonomy
// ============================================================================

/// Token decode/validation failures, enumerated so callers must handle each
/// kind explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token's structural encoding cannot be parsed
    Malformed,
    /// Current time is past the token's expiry
    Expired,
    /// The signature does not verify against the configured key
    InvalidSignature,
    /// The `token_type` claim disagrees with what the caller expected
    TypeMismatch {
        expected: TokenType,
        actual: TokenType,
    },
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "token is malformed"),
            Self::Expired => write!(f, "token has expired"),
            Self::InvalidSignature => write!(f, "token signature is invalid"),
            Self::TypeMismatch { expected, actual } => {
                write!(f, "unexpected token type: expected {}, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for TokenError {}

// ============================================================================
// Codec
// ============================================================================

/// Signs and verifies tokens with a process-lifetime symmetric key.
///
/// Safe for unsynchronized concurrent use: encoding and decoding are pure
/// functions of (input, current time, static key).
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Derive the HMAC-SHA256 signing key from the secret's UTF-8 bytes.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is enforced exactly; a still-valid token one second before
        // expiry must flip to Expired one second after.
        validation.leeway = 0;
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Produce a signed, self-contained token for `subject` expiring `ttl`
    /// from now.
    pub fn encode(
        &self,
        subject: &str,
        ttl: Duration,
        token_type: TokenType,
    ) -> Result<String, TokenError> {
        let now = unix_now();
        // Lifetimes are configured in milliseconds; round a fractional
        // second up so expiry is strictly after issuance.
        let ttl_secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now + ttl_secs,
            token_type,
        };
        self.encode_claims(&claims)
    }

    /// Sign a fully specified claim set. Used by `encode` and by tests that
    /// need control over `iat`/`exp`.
    pub fn encode_claims(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|_| TokenError::Malformed)
    }

    /// Verify signature and expiry, returning the claim set.
    ///
    /// # Errors
    ///
    /// - [`TokenError::InvalidSignature`] if the signature does not verify
    /// - [`TokenError::Expired`] if current time is past `exp`
    /// - [`TokenError::Malformed`] for any structural parse failure,
    ///   including a missing or unknown `token_type` claim
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                JwtErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }
}

/// Current Unix time in whole seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
