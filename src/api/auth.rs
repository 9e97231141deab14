// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use tracing::info;

use crate::{
    auth::{middleware::extract_bearer, AuthError},
    models::{RefreshRequest, TokenPairResponse},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    request_body = RefreshRequest,
    tag = "Auth",
    responses(
        (status = 200, body = TokenPairResponse),
        (status = 401, description = "Refresh token invalid, expired or superseded"),
        (status = 503, description = "Session store unavailable")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenPairResponse>, AuthError> {
    let pair = state
        .authenticator
        .refresh_session(&request.refresh_token)
        .await?;
    Ok(Json(pair.into()))
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    responses(
        (status = 204),
        (status = 401, description = "Missing or invalid access token"),
        (status = 503, description = "Session store unavailable")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AuthError> {
    let token = extract_bearer(&headers).ok_or(AuthError::MissingToken)?;
    state.authenticator.logout(&token).await?;
    info!("session terminated");
    Ok(StatusCode::NO_CONTENT)
}
