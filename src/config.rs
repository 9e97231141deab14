// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup into an
//! immutable [`Config`] that is passed explicitly to the components
//! that need it; there is no ambient global lookup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HS256 signing secret | dev-only fallback (warned) |
//! | `JWT_ACCESS_TTL_MS` | Access-token lifetime (ms) | `3600000` (1 hour) |
//! | `JWT_REFRESH_TTL_MS` | Refresh-token lifetime (ms) | `604800000` (7 days) |
//! | `LOGIN_ATTEMPT_WINDOW_SECS` | Failed-login counter window | `900` (15 minutes) |
//! | `MAX_LOGIN_ATTEMPTS` | Attempts before throttling | `5` |
//! | `REDIS_URL` | Session store; unset runs the in-memory store | unset |
//! | `UPLOAD_DIR` | Root directory for stored files | `/data/uploads` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::path::PathBuf;

/// Signing secret used when `JWT_SECRET` is unset. Development only;
/// startup logs a warning when this fallback is in effect.
pub const DEV_FALLBACK_SECRET: &str = "dev-only-signing-secret-do-not-use-in-production";

/// Default access-token lifetime: 1 hour.
pub const DEFAULT_ACCESS_TTL_MS: u64 = 3_600_000;

/// Default refresh-token lifetime: 7 days.
pub const DEFAULT_REFRESH_TTL_MS: u64 = 604_800_000;

/// Default failed-login counter window: 15 minutes.
pub const DEFAULT_LOGIN_ATTEMPT_WINDOW_SECS: u64 = 900;

/// Default number of failed logins before throttling.
pub const DEFAULT_MAX_LOGIN_ATTEMPTS: u32 = 5;

/// Process-wide configuration, constructed once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Whether `jwt_secret` is the development fallback.
    pub using_fallback_secret: bool,
    pub access_ttl_ms: u64,
    pub refresh_ttl_ms: u64,
    pub login_attempt_window_ms: u64,
    pub max_login_attempts: u32,
    /// Session store address; `None` selects the in-memory store.
    pub redis_url: Option<String>,
    pub upload_dir: PathBuf,
}

impl Config {
    /// Load configuration from the environment, applying defaults.
    pub fn from_env() -> Self {
        let (jwt_secret, using_fallback_secret) = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => (secret, false),
            _ => (DEV_FALLBACK_SECRET.to_string(), true),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret,
            using_fallback_secret,
            access_ttl_ms: parse_env("JWT_ACCESS_TTL_MS", DEFAULT_ACCESS_TTL_MS),
            refresh_ttl_ms: parse_env("JWT_REFRESH_TTL_MS", DEFAULT_REFRESH_TTL_MS),
            login_attempt_window_ms: parse_env(
                "LOGIN_ATTEMPT_WINDOW_SECS",
                DEFAULT_LOGIN_ATTEMPT_WINDOW_SECS,
            ) * 1000,
            max_login_attempts: parse_env("MAX_LOGIN_ATTEMPTS", DEFAULT_MAX_LOGIN_ATTEMPTS),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/data/uploads")),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        assert_eq!(DEFAULT_ACCESS_TTL_MS, 60 * 60 * 1000);
        assert_eq!(DEFAULT_REFRESH_TTL_MS, 7 * 24 * 60 * 60 * 1000);
        assert_eq!(DEFAULT_LOGIN_ATTEMPT_WINDOW_SECS, 15 * 60);
    }
}
