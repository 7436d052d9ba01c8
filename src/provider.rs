//! Token Provider
//!
//! Issues access/refresh token pairs and answers validation questions for
//! the rest of the application. This is the only place that knows both the
//! codec and the configured lifetimes; callers deal in subjects and pairs.
//!
//! # Usage
//!
//! ```ignore
//! use rosterd::provider::TokenProvider;
//!
//! let provider = TokenProvider::new(&config.jwt);
//! let pair = provider.issue_pair("admin")?;
//! assert!(provider.validate_access_token(&pair.access_token));
//! assert!(!provider.validate_access_token(&pair.refresh_token));
//! ```

use std::time::Duration;

use crate::config::JwtSettings;
use crate::token::{TokenClaims, TokenCodec, TokenError, TokenType};

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and validates tokens with configured lifetimes.
pub struct TokenProvider {
    codec: TokenCodec,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenProvider {
    /// Build a provider from validated settings.
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            codec: TokenCodec::new(&settings.secret),
            access_ttl: settings.access_ttl,
            refresh_ttl: settings.refresh_ttl,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_ttls(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            codec: TokenCodec::new(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Issue a fresh access/refresh pair for `subject`.
    ///
    /// Both tokens carry the same subject and start their lifetimes now;
    /// they differ in `token_type` and expiry.
    pub fn issue_pair(&self, subject: &str) -> Result<TokenPair, TokenError> {
        let access_token = self.codec.encode(subject, self.access_ttl, TokenType::Access)?;
        let refresh_token = self
            .codec
            .encode(subject, self.refresh_ttl, TokenType::Refresh)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Decode a token and require it to carry the expected type.
    ///
    /// Signature and expiry failures surface as their own [`TokenError`]
    /// variants before the type check runs.
    pub fn decode_expecting(
        &self,
        token: &str,
        expected: TokenType,
    ) -> Result<TokenClaims, TokenError> {
        let claims = self.codec.decode(token)?;
        if claims.token_type != expected {
            return Err(TokenError::TypeMismatch {
                expected,
                actual: claims.token_type,
            });
        }
        Ok(claims)
    }

    /// Is this a currently valid access token?
    pub fn validate_access_token(&self, token: &str) -> bool {
        self.decode_expecting(token, TokenType::Access).is_ok()
    }

    /// Is this a currently valid refresh token?
    pub fn validate_refresh_token(&self, token: &str) -> bool {
        self.decode_expecting(token, TokenType::Refresh).is_ok()
    }

    /// Extract the subject from a valid token of the expected type.
    pub fn extract_principal(&self, token: &str, expected: TokenType) -> Result<String, TokenError> {
        self.decode_expecting(token, expected).map(|claims| claims.sub)
    }
}
