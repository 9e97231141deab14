// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory session/revocation store.
//!
//! Mirrors the Redis store's semantics (per-key TTLs, overwrite on
//! store, counter expiry) with `tokio::time::Instant` deadlines. Used
//! when no `REDIS_URL` is configured and throughout the test suite;
//! single-process only.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

use super::{
    AuthStore, StoreError, ACCESS_TOKEN_KEY, BLACKLIST_KEY, LOGIN_ATTEMPT_KEY, REFRESH_TOKEN_KEY,
    USER_SESSION_KEY,
};
use crate::auth::TokenType;

struct Entry {
    value: String,
    deadline: Instant,
}

impl Entry {
    fn expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

/// Session store held in process memory.
pub struct MemoryAuthStore {
    entries: RwLock<HashMap<String, Entry>>,
    login_attempt_window_ms: u64,
}

impl MemoryAuthStore {
    pub fn new(login_attempt_window_ms: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            login_attempt_window_ms,
        }
    }

    async fn set(&self, key: String, value: String, ttl_ms: u64) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            Entry {
                value,
                deadline: Instant::now() + Duration::from_millis(ttl_ms),
            },
        );
    }

    async fn get(&self, key: &str) -> Option<String> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.expired(Instant::now()) => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Lazily drop the expired entry. Re-check under the write lock:
        // another task may have stored a fresh value for this key since
        // the read lock was released, and that value must survive.
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if !entry.expired(Instant::now()) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

impl Default for MemoryAuthStore {
    fn default() -> Self {
        // 15 minute window, matching the production default
        Self::new(15 * 60 * 1000)
    }
}

#[async_trait]
impl AuthStore for MemoryAuthStore {
    async fn store_access_token(
        &self,
        user_id: &str,
        token: &str,
        ttl_ms: u64,
    ) -> Result<(), StoreError> {
        self.set(format!("{ACCESS_TOKEN_KEY}{user_id}"), token.to_string(), ttl_ms)
            .await;
        Ok(())
    }

    async fn store_refresh_token(
        &self,
        user_id: &str,
        token: &str,
        ttl_ms: u64,
    ) -> Result<(), StoreError> {
        self.set(format!("{REFRESH_TOKEN_KEY}{user_id}"), token.to_string(), ttl_ms)
            .await;
        Ok(())
    }

    async fn store_session(
        &self,
        user_id: &str,
        session: &str,
        ttl_ms: u64,
    ) -> Result<(), StoreError> {
        self.set(format!("{USER_SESSION_KEY}{user_id}"), session.to_string(), ttl_ms)
            .await;
        Ok(())
    }

    async fn get_access_token(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(&format!("{ACCESS_TOKEN_KEY}{user_id}")).await)
    }

    async fn get_refresh_token(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(&format!("{REFRESH_TOKEN_KEY}{user_id}")).await)
    }

    async fn get_session(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(&format!("{USER_SESSION_KEY}{user_id}")).await)
    }

    async fn token_exists(
        &self,
        user_id: &str,
        token_type: TokenType,
    ) -> Result<bool, StoreError> {
        let key = match token_type {
            TokenType::Access => format!("{ACCESS_TOKEN_KEY}{user_id}"),
            TokenType::Refresh => format!("{REFRESH_TOKEN_KEY}{user_id}"),
        };
        Ok(self.get(&key).await.is_some())
    }

    async fn delete_user_tokens(&self, user_id: &str) -> Result<(), StoreError> {
        self.remove(&format!("{ACCESS_TOKEN_KEY}{user_id}")).await;
        self.remove(&format!("{REFRESH_TOKEN_KEY}{user_id}")).await;
        self.remove(&format!("{USER_SESSION_KEY}{user_id}")).await;
        Ok(())
    }

    async fn add_to_blacklist(&self, token: &str, ttl_ms: u64) -> Result<(), StoreError> {
        self.set(format!("{BLACKLIST_KEY}{token}"), "BLACKLISTED".to_string(), ttl_ms)
            .await;
        Ok(())
    }

    async fn is_blacklisted(&self, token: &str) -> Result<bool, StoreError> {
        Ok(self.get(&format!("{BLACKLIST_KEY}{token}")).await.is_some())
    }

    async fn increment_login_attempt(&self, identifier: &str) -> Result<(), StoreError> {
        let key = format!("{LOGIN_ATTEMPT_KEY}{identifier}");
        let current: u32 = self
            .get(&key)
            .await
            .and_then(|c| c.parse().ok())
            .unwrap_or(0);
        self.set(key, (current + 1).to_string(), self.login_attempt_window_ms)
            .await;
        Ok(())
    }

    async fn get_login_attempt_count(&self, identifier: &str) -> Result<u32, StoreError> {
        let count = self.get(&format!("{LOGIN_ATTEMPT_KEY}{identifier}")).await;
        Ok(count.and_then(|c| c.parse().ok()).unwrap_or(0))
    }

    async fn reset_login_attempt(&self, identifier: &str) -> Result<(), StoreError> {
        self.remove(&format!("{LOGIN_ATTEMPT_KEY}{identifier}")).await;
        Ok(())
    }
}
