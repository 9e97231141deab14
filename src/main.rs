// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, sync::Arc};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use relational_file_server::{
    api::router,
    auth::{Authenticator, TokenCodec},
    config::Config,
    files::FileStore,
    state::AppState,
    store::{AuthStore, MemoryAuthStore, RedisAuthStore},
};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::from_env();
    if config.using_fallback_secret {
        warn!("JWT_SECRET is unset, using the development fallback secret");
    }

    let store: Arc<dyn AuthStore> = match &config.redis_url {
        Some(url) => {
            let store = RedisAuthStore::connect(url, config.login_attempt_window_ms)
                .await
                .expect("Failed to connect to the Redis session store");
            info!("connected to Redis session store");
            Arc::new(store)
        }
        None => {
            warn!("REDIS_URL is unset, sessions are held in process memory");
            Arc::new(MemoryAuthStore::new(config.login_attempt_window_ms))
        }
    };

    let codec = TokenCodec::new(
        &config.jwt_secret,
        config.access_ttl_ms,
        config.refresh_ttl_ms,
    );
    let authenticator = Authenticator::new(codec, store, config.max_login_attempts);
    let state = AppState::new(authenticator, FileStore::new(&config.upload_dir));
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");

    info!("file server listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    match env::var("LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}
