// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request authentication filter.
//!
//! Runs once per inbound request, before any handler. Extracts the
//! bearer token (tolerant of absent or malformed `Authorization`
//! headers - both are "no token", not an error), delegates to the
//! authenticator, and binds the resulting [`Principal`] to the
//! request's extensions.
//!
//! The filter never rejects a request: on any authentication failure
//! the request simply continues without a principal, and downstream
//! authorization (the [`Auth`](super::extractor::Auth) extractor)
//! decides whether that becomes a 401.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::claims::Principal;
use crate::state::AppState;

/// Authentication middleware. Apply with
/// `axum::middleware::from_fn_with_state(state, auth_middleware)`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Drop any principal a caller may have smuggled in; only this
    // filter is allowed to bind one.
    request.extensions_mut().remove::<Principal>();

    if let Some(token) = extract_bearer(request.headers()) {
        match state.authenticator.authenticate(&token).await {
            Ok(principal) => {
                debug!(user_id = %principal.user_id, role = %principal.role, "request authenticated");
                request.extensions_mut().insert(principal);
            }
            Err(err) => {
                debug!(
                    error_code = err.error_code(),
                    uri = %request.uri(),
                    "authentication failed, continuing unauthenticated"
                );
            }
        }
    }

    next.run(request).await
}

/// Pull the bearer token out of the `Authorization` header.
///
/// Absent header, non-UTF-8 value, non-Bearer scheme, and empty token
/// all collapse to `None`.
pub(crate) fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let token = headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_header_is_no_token() {
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }

    #[test]
    fn non_bearer_scheme_is_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn empty_token_is_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer    "));
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn non_utf8_header_is_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap());
        assert_eq!(extract_bearer(&headers), None);
    }
}
