// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Revocation/session store.
//!
//! A key-value store indexed by user identifier and by raw token,
//! holding the current access/refresh token per user, opaque session
//! metadata, login-attempt counters, and a blacklist of explicitly
//! revoked tokens. Every entry carries its own expiry.
//!
//! ## Failure policy
//!
//! Every operation returns `Result<_, StoreError>`; the store itself
//! never decides authentication policy. Callers apply the policy:
//! reads on the authentication path are fail-open (an unavailable store
//! cannot confirm revocation, so verification proceeds on the token's
//! own cryptographic validity), writes on the login/logout/refresh
//! paths are fail-closed (the caller must know persistence failed).

mod memory;
mod redis;

pub use memory::MemoryAuthStore;
pub use redis::RedisAuthStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::TokenType;

/// Key prefix for the current access token per user.
pub const ACCESS_TOKEN_KEY: &str = "auth:access_token:";
/// Key prefix for the current refresh token per user.
pub const REFRESH_TOKEN_KEY: &str = "auth:refresh_token:";
/// Key prefix for opaque session metadata per user.
pub const USER_SESSION_KEY: &str = "auth:user_session:";
/// Key prefix for failed-login counters per login identifier.
pub const LOGIN_ATTEMPT_KEY: &str = "auth:login_attempt:";
/// Key prefix for revoked tokens, keyed by the raw token string.
pub const BLACKLIST_KEY: &str = "auth:blacklist:";

/// Store failure. `Timeout` is produced by the bounded per-command
/// timeout so a slow store cannot stall the request pipeline.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
    #[error("session store command timed out")]
    Timeout,
}

/// Token/session store operations.
///
/// Implemented by [`RedisAuthStore`] (production) and
/// [`MemoryAuthStore`] (dev mode and tests). Per-key atomicity is the
/// store's own; no cross-key locking is layered on top.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Store the current access token for a user, replacing any
    /// previous one.
    async fn store_access_token(
        &self,
        user_id: &str,
        token: &str,
        ttl_ms: u64,
    ) -> Result<(), StoreError>;

    /// Store the current refresh token for a user, replacing any
    /// previous one.
    async fn store_refresh_token(
        &self,
        user_id: &str,
        token: &str,
        ttl_ms: u64,
    ) -> Result<(), StoreError>;

    /// Store opaque session metadata for a user.
    async fn store_session(
        &self,
        user_id: &str,
        session: &str,
        ttl_ms: u64,
    ) -> Result<(), StoreError>;

    /// The user's current access token, if one is tracked.
    async fn get_access_token(&self, user_id: &str) -> Result<Option<String>, StoreError>;

    /// The user's current refresh token, if one is tracked.
    async fn get_refresh_token(&self, user_id: &str) -> Result<Option<String>, StoreError>;

    /// The user's session metadata, if present.
    async fn get_session(&self, user_id: &str) -> Result<Option<String>, StoreError>;

    /// Whether a token of the given type is tracked for the user.
    async fn token_exists(&self, user_id: &str, token_type: TokenType)
        -> Result<bool, StoreError>;

    /// Remove access token, refresh token, and session for a user
    /// (logout).
    async fn delete_user_tokens(&self, user_id: &str) -> Result<(), StoreError>;

    /// Blacklist a token until its natural expiry.
    async fn add_to_blacklist(&self, token: &str, ttl_ms: u64) -> Result<(), StoreError>;

    /// Whether a token has been explicitly revoked.
    async fn is_blacklisted(&self, token: &str) -> Result<bool, StoreError>;

    /// Record a failed login for an identifier; the counter expires
    /// after the configured window.
    async fn increment_login_attempt(&self, identifier: &str) -> Result<(), StoreError>;

    /// Current failed-login count for an identifier.
    async fn get_login_attempt_count(&self, identifier: &str) -> Result<u32, StoreError>;

    /// Clear the failed-login counter (successful login).
    async fn reset_login_attempt(&self, identifier: &str) -> Result<(), StoreError>;

    /// Whether the identifier has reached the attempt limit.
    async fn is_login_attempt_limited(
        &self,
        identifier: &str,
        max_attempts: u32,
    ) -> Result<bool, StoreError> {
        Ok(self.get_login_attempt_count(identifier).await? >= max_attempts)
    }

    /// Replace the user's token pair: old tokens are deleted first so
    /// stale values cannot outlive the swap, then the new pair is
    /// stored. Not a single transaction; the invariant is only that at
    /// most the new pair is live afterwards.
    async fn refresh_tokens(
        &self,
        user_id: &str,
        new_access: &str,
        new_refresh: &str,
        access_ttl_ms: u64,
        refresh_ttl_ms: u64,
    ) -> Result<(), StoreError> {
        self.delete_user_tokens(user_id).await?;
        self.store_access_token(user_id, new_access, access_ttl_ms).await?;
        self.store_refresh_token(user_id, new_refresh, refresh_ttl_ms).await?;
        Ok(())
    }
}
