// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token codec: issuing and verifying signed tokens.
//!
//! Tokens are compact HS256 JWTs carrying the subject, issue/expiry
//! timestamps, and the custom claims `email`, `isPremium` and
//! `tokenType`. The signing secret is process-wide, loaded once at
//! startup; rotating it invalidates all outstanding tokens (there is no
//! key versioning).

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::{TokenClaims, TokenType};
use super::error::AuthError;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Encodes and decodes signed tokens with a symmetric key.
///
/// Cheap to clone; both keys are derived once from the configured
/// secret and shared read-only across requests.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_ms: u64,
    refresh_ttl_ms: u64,
}

impl TokenCodec {
    /// Create a codec from the service signing secret and configured TTLs.
    pub fn new(secret: &str, access_ttl_ms: u64, refresh_ttl_ms: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl_ms,
            refresh_ttl_ms,
        }
    }

    /// Configured access-token TTL in milliseconds.
    pub fn access_ttl_ms(&self) -> u64 {
        self.access_ttl_ms
    }

    /// Configured refresh-token TTL in milliseconds.
    pub fn refresh_ttl_ms(&self) -> u64 {
        self.refresh_ttl_ms
    }

    /// Issue an access token for a subject.
    pub fn issue_access(
        &self,
        subject: &str,
        email: &str,
        is_premium: bool,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now + (self.access_ttl_ms / 1000) as i64,
            email: Some(email.to_string()),
            is_premium,
            token_type: TokenType::Access,
        };
        self.sign(&claims)
    }

    /// Issue a refresh token for a subject.
    ///
    /// Refresh tokens carry no profile claims; they are only good for
    /// obtaining a new token pair.
    pub fn issue_refresh(&self, subject: &str) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now + (self.refresh_ttl_ms / 1000) as i64,
            email: None,
            is_premium: false,
            token_type: TokenType::Refresh,
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(map_jwt_error)
    }

    /// Verify signature and structural validity, returning the claims.
    ///
    /// Fails with a distinct error kind per failure mode (`Expired`,
    /// `Malformed`, `Unsupported`, `SignatureInvalid`) so callers can
    /// report why verification failed.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_aud = false;

        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(map_jwt_error)?;

        Ok(token_data.claims)
    }

    /// `decode` reduced to a yes/no gate.
    pub fn is_valid(&self, token: &str) -> bool {
        self.decode(token).is_ok()
    }

    /// Extract the subject of a verified token.
    pub fn subject_of(&self, token: &str) -> Result<String, AuthError> {
        Ok(self.decode(token)?.sub)
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidSignature => AuthError::SignatureInvalid,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => AuthError::Unsupported,
        _ => AuthError::Malformed,
    }
}
