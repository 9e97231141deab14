// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Redis-backed session/revocation store.
//!
//! Uses a multiplexed `ConnectionManager`, cloned per call, so many
//! requests can authenticate concurrently over the same connection.
//! Every command runs under a bounded timeout; the timeout (not the
//! caller) is what keeps a slow Redis from stalling the pipeline.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use super::{
    AuthStore, StoreError, ACCESS_TOKEN_KEY, BLACKLIST_KEY, LOGIN_ATTEMPT_KEY, REFRESH_TOKEN_KEY,
    USER_SESSION_KEY,
};
use crate::auth::TokenType;

/// Per-command timeout. On expiry the call reports
/// `StoreError::Timeout` and the caller applies its read/write policy.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Session store backed by a single Redis instance.
#[derive(Clone)]
pub struct RedisAuthStore {
    manager: ConnectionManager,
    login_attempt_window_ms: u64,
}

impl RedisAuthStore {
    /// Connect to Redis and build the store.
    pub async fn connect(redis_url: &str, login_attempt_window_ms: u64) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self {
            manager,
            login_attempt_window_ms,
        })
    }

    /// Build from an existing connection manager.
    pub fn new(manager: ConnectionManager, login_attempt_window_ms: u64) -> Self {
        Self {
            manager,
            login_attempt_window_ms,
        }
    }

    fn conn(&self) -> ConnectionManager {
        self.manager.clone()
    }

    async fn set_with_ttl(&self, key: String, value: &str, ttl_ms: u64) -> Result<(), StoreError> {
        let mut conn = self.conn();
        let value = value.to_string();
        with_timeout(async move {
            redis::cmd("SET")
                .arg(&key)
                .arg(&value)
                .arg("PX")
                .arg(ttl_ms)
                .query_async::<_, ()>(&mut conn)
                .await
        })
        .await
    }

    async fn get_value(&self, key: String) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn();
        with_timeout(async move {
            redis::cmd("GET")
                .arg(&key)
                .query_async::<_, Option<String>>(&mut conn)
                .await
        })
        .await
    }

    async fn key_exists(&self, key: String) -> Result<bool, StoreError> {
        let mut conn = self.conn();
        with_timeout(async move {
            redis::cmd("EXISTS")
                .arg(&key)
                .query_async::<_, bool>(&mut conn)
                .await
        })
        .await
    }
}

async fn with_timeout<T, F>(fut: F) -> Result<T, StoreError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(COMMAND_TIMEOUT, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(StoreError::Unavailable(err.to_string())),
        Err(_) => Err(StoreError::Timeout),
    }
}

#[async_trait]
impl AuthStore for RedisAuthStore {
    async fn store_access_token(
        &self,
        user_id: &str,
        token: &str,
        ttl_ms: u64,
    ) -> Result<(), StoreError> {
        self.set_with_ttl(format!("{ACCESS_TOKEN_KEY}{user_id}"), token, ttl_ms)
            .await
    }

    async fn store_refresh_token(
        &self,
        user_id: &str,
        token: &str,
        ttl_ms: u64,
    ) -> Result<(), StoreError> {
        self.set_with_ttl(format!("{REFRESH_TOKEN_KEY}{user_id}"), token, ttl_ms)
            .await
    }

    async fn store_session(
        &self,
        user_id: &str,
        session: &str,
        ttl_ms: u64,
    ) -> Result<(), StoreError> {
        self.set_with_ttl(format!("{USER_SESSION_KEY}{user_id}"), session, ttl_ms)
            .await
    }

    async fn get_access_token(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        self.get_value(format!("{ACCESS_TOKEN_KEY}{user_id}")).await
    }

    async fn get_refresh_token(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        self.get_value(format!("{REFRESH_TOKEN_KEY}{user_id}")).await
    }

    async fn get_session(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        self.get_value(format!("{USER_SESSION_KEY}{user_id}")).await
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
        self.key_exists(key).await
    }

    async fn delete_user_tokens(&self, user_id: &str) -> Result<(), StoreError> {
        let mut conn = self.conn();
        let access = format!("{ACCESS_TOKEN_KEY}{user_id}");
        let refresh = format!("{REFRESH_TOKEN_KEY}{user_id}");
        let session = format!("{USER_SESSION_KEY}{user_id}");
        with_timeout(async move {
            redis::cmd("DEL")
                .arg(&access)
                .arg(&refresh)
                .arg(&session)
                .query_async::<_, ()>(&mut conn)
                .await
        })
        .await
    }

    async fn add_to_blacklist(&self, token: &str, ttl_ms: u64) -> Result<(), StoreError> {
        self.set_with_ttl(format!("{BLACKLIST_KEY}{token}"), "BLACKLISTED", ttl_ms)
            .await
    }

    async fn is_blacklisted(&self, token: &str) -> Result<bool, StoreError> {
        self.key_exists(format!("{BLACKLIST_KEY}{token}")).await
    }

    async fn increment_login_attempt(&self, identifier: &str) -> Result<(), StoreError> {
        let mut conn = self.conn();
        let key = format!("{LOGIN_ATTEMPT_KEY}{identifier}");
        let window_ms = self.login_attempt_window_ms;
        with_timeout(async move {
            redis::cmd("INCR")
                .arg(&key)
                .query_async::<_, i64>(&mut conn)
                .await?;
            redis::cmd("PEXPIRE")
                .arg(&key)
                .arg(window_ms)
                .query_async::<_, ()>(&mut conn)
                .await
        })
        .await
    }

    async fn get_login_attempt_count(&self, identifier: &str) -> Result<u32, StoreError> {
        let count = self
            .get_value(format!("{LOGIN_ATTEMPT_KEY}{identifier}"))
            .await?;
        Ok(count.and_then(|c| c.parse().ok()).unwrap_or(0))
    }

    async fn reset_login_attempt(&self, identifier: &str) -> Result<(), StoreError> {
        let mut conn = self.conn();
        let key = format!("{LOGIN_ATTEMPT_KEY}{identifier}");
        with_timeout(async move {
            redis::cmd("DEL")
                .arg(&key)
                .query_async::<_, ()>(&mut conn)
                .await
        })
        .await
    }
}
