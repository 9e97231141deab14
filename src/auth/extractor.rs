// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the authenticated principal.
//!
//! This is the downstream-authorization seam: the middleware only binds
//! (or does not bind) a principal; handlers that require one use the
//! `Auth` extractor, which turns "no principal" into a 401.
//!
//! ```rust,ignore
//! async fn upload(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal.user_id, principal.role
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::claims::Principal;
use super::error::AuthError;

/// Extractor requiring an authenticated principal.
pub struct Auth(pub Principal);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::MissingToken)
    }
}

/// Extractor yielding the principal if present, without rejecting.
///
/// For endpoints that serve both anonymous and authenticated callers.
pub struct OptionalAuth(pub Option<Principal>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(parts.extensions.get::<Principal>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use axum::http::Request;

    fn parts_with_principal(principal: Option<Principal>) -> Parts {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        if let Some(p) = principal {
            parts.extensions.insert(p);
        }
        parts
    }

    #[tokio::test]
    async fn auth_rejects_without_principal() {
        let mut parts = parts_with_principal(None);
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[tokio::test]
    async fn auth_yields_bound_principal() {
        let mut parts = parts_with_principal(Some(Principal {
            user_id: "u1".to_string(),
            role: Role::User,
        }));

        let Auth(principal) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(principal.user_id, "u1");
    }

    #[tokio::test]
    async fn optional_auth_never_rejects() {
        let mut parts = parts_with_principal(None);
        let OptionalAuth(principal) =
            OptionalAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(principal.is_none());
    }
}
