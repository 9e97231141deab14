// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticator: decides whether a presented token is valid,
//! non-revoked and correctly typed, and produces the request principal.
//!
//! ## Failure policy
//!
//! Store reads on the authentication path (blacklist check, stored
//! token cross-check) are best-effort: if the store cannot be reached
//! the check is skipped and verification proceeds on the token's own
//! cryptographic validity. The store adds a revocation capability on
//! top of stateless verification; it is never the sole source of truth
//! for validity. Store writes (session establishment, refresh, logout)
//! are the opposite: a failed write surfaces to the caller as
//! `StoreUnavailable`, because "log this user out" cannot silently
//! no-op.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, warn};

use super::claims::{Principal, TokenType};
use super::error::AuthError;
use super::token::TokenCodec;
use crate::store::{AuthStore, StoreError};

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Read-side view of the persisted session record. The record is the
/// only place profile claims survive between issuances; refresh tokens
/// deliberately carry none.
#[derive(Debug, Default, Deserialize)]
struct SessionRecord {
    #[serde(default)]
    email: String,
    #[serde(default, rename = "isPremium")]
    is_premium: bool,
}

fn session_record(user_id: &str, email: &str, is_premium: bool) -> String {
    serde_json::json!({
        "user_id": user_id,
        "email": email,
        "isPremium": is_premium,
        "logged_in_at": Utc::now().to_rfc3339(),
    })
    .to_string()
}

/// Orchestrates the token codec and the revocation/session store.
#[derive(Clone)]
pub struct Authenticator {
    codec: TokenCodec,
    store: Arc<dyn AuthStore>,
    max_login_attempts: u32,
}

impl Authenticator {
    pub fn new(codec: TokenCodec, store: Arc<dyn AuthStore>, max_login_attempts: u32) -> Self {
        Self {
            codec,
            store,
            max_login_attempts,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Authenticate a presented bearer token for resource access.
    ///
    /// One attempt per request, no retries. Every failure is a typed
    /// `AuthError` value; no fault crosses this boundary.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.codec.decode(token)?;

        // Refresh tokens are never accepted for resource access.
        if claims.token_type != TokenType::Access {
            return Err(AuthError::TokenTypeMismatch);
        }

        // A token without a subject is a malformed issuance; untrusted.
        if claims.sub.trim().is_empty() {
            return Err(AuthError::SubjectMissing);
        }

        // Blacklist check, best-effort: an unreachable store cannot
        // confirm revocation and must not deny authentication.
        match self.store.is_blacklisted(token).await {
            Ok(true) => return Err(AuthError::Revoked),
            Ok(false) => {}
            Err(err) => {
                warn!(user_id = %claims.sub, error = %err, "blacklist check skipped, store unavailable");
            }
        }

        // Cross-check against the stored current token: a mismatch
        // means this token was superseded by a later issuance.
        match self.store.get_access_token(&claims.sub).await {
            Ok(Some(stored)) if stored != token => {
                debug!(user_id = %claims.sub, "presented token superseded by a newer issuance");
                return Err(AuthError::Revoked);
            }
            Ok(_) => {}
            Err(err) => {
                warn!(user_id = %claims.sub, error = %err, "stored-token cross-check skipped, store unavailable");
            }
        }

        Ok(Principal::from_claims(&claims))
    }

    /// Issue and persist a fresh token pair for a user (login/signup
    /// path). Fail-closed: a store write failure surfaces.
    pub async fn establish_session(
        &self,
        user_id: &str,
        email: &str,
        is_premium: bool,
    ) -> Result<TokenPair, AuthError> {
        let access_token = self.codec.issue_access(user_id, email, is_premium)?;
        let refresh_token = self.codec.issue_refresh(user_id)?;

        self.store
            .store_access_token(user_id, &access_token, self.codec.access_ttl_ms())
            .await
            .map_err(store_unavailable)?;
        self.store
            .store_refresh_token(user_id, &refresh_token, self.codec.refresh_ttl_ms())
            .await
            .map_err(store_unavailable)?;

        self.store
            .store_session(
                user_id,
                &session_record(user_id, email, is_premium),
                self.codec.refresh_ttl_ms(),
            )
            .await
            .map_err(store_unavailable)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new token pair (simple reissue).
    ///
    /// The stored-refresh cross-check is best-effort like the read path
    /// in `authenticate`; the replacement write is fail-closed.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.codec.decode(refresh_token)?;

        if claims.token_type != TokenType::Refresh {
            return Err(AuthError::TokenTypeMismatch);
        }
        if claims.sub.trim().is_empty() {
            return Err(AuthError::SubjectMissing);
        }

        match self.store.get_refresh_token(&claims.sub).await {
            Ok(Some(stored)) if stored != refresh_token => {
                debug!(user_id = %claims.sub, "presented refresh token superseded");
                return Err(AuthError::Revoked);
            }
            Ok(_) => {}
            Err(err) => {
                warn!(user_id = %claims.sub, error = %err, "stored-refresh cross-check skipped, store unavailable");
            }
        }

        // Refresh tokens carry no profile claims; recover them from the
        // session record so the reissued access token keeps the user's
        // email and tier. Best-effort like the cross-check above.
        let SessionRecord { email, is_premium } = match self.store.get_session(&claims.sub).await {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_default(),
            Ok(None) => SessionRecord::default(),
            Err(err) => {
                warn!(user_id = %claims.sub, error = %err, "session lookup skipped, store unavailable");
                SessionRecord::default()
            }
        };

        let access_token = self.codec.issue_access(&claims.sub, &email, is_premium)?;
        let new_refresh = self.codec.issue_refresh(&claims.sub)?;

        self.store
            .refresh_tokens(
                &claims.sub,
                &access_token,
                &new_refresh,
                self.codec.access_ttl_ms(),
                self.codec.refresh_ttl_ms(),
            )
            .await
            .map_err(store_unavailable)?;

        // The token swap clears the session record; write it back so the
        // next refresh can still recover the profile claims.
        self.store
            .store_session(
                &claims.sub,
                &session_record(&claims.sub, &email, is_premium),
                self.codec.refresh_ttl_ms(),
            )
            .await
            .map_err(store_unavailable)?;

        Ok(TokenPair {
            access_token,
            refresh_token: new_refresh,
        })
    }

    /// Revoke the presented access token and drop the user's session.
    /// Fail-closed: the caller must know if persistence failed.
    pub async fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        let claims = self.codec.decode(access_token)?;

        if claims.token_type != TokenType::Access {
            return Err(AuthError::TokenTypeMismatch);
        }

        // Blacklist only for the token's remaining natural lifetime;
        // there is no need to retain the entry longer.
        let remaining = claims.remaining_ttl_ms(Utc::now().timestamp());
        if remaining > 0 {
            self.store
                .add_to_blacklist(access_token, remaining)
                .await
                .map_err(store_unavailable)?;
        }

        self.store
            .delete_user_tokens(&claims.sub)
            .await
            .map_err(store_unavailable)?;

        Ok(())
    }

    /// Record a failed login for throttling (external login path).
    pub async fn record_failed_login(&self, identifier: &str) -> Result<(), AuthError> {
        self.store
            .increment_login_attempt(identifier)
            .await
            .map_err(store_unavailable)
    }

    /// Clear the failed-login counter after a successful login.
    pub async fn clear_login_attempts(&self, identifier: &str) -> Result<(), AuthError> {
        self.store
            .reset_login_attempt(identifier)
            .await
            .map_err(store_unavailable)
    }

    /// Whether further login attempts for this identifier should be
    /// rejected.
    pub async fn is_login_limited(&self, identifier: &str) -> Result<bool, AuthError> {
        self.store
            .is_login_attempt_limited(identifier, self.max_login_attempts)
            .await
            .map_err(store_unavailable)
    }
}

fn store_unavailable(err: StoreError) -> AuthError {
    AuthError::StoreUnavailable(err.to_string())
}
