// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// Each failure mode is a distinct kind from the codec boundary
/// outward; nothing downstream wraps or re-matches these. The
/// middleware absorbs all of them into "unauthenticated" - the
/// `IntoResponse` impl is only exercised where a handler (logout,
/// refresh) surfaces the error directly.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// No bearer token presented (a malformed `Authorization` header
    /// counts as no token)
    MissingToken,
    /// Token is structurally malformed
    Malformed,
    /// Token uses an unsupported format or algorithm
    Unsupported,
    /// Token signature does not verify against the signing key
    SignatureInvalid,
    /// Token has expired
    Expired,
    /// A refresh token was presented where an access token is required
    /// (or vice versa)
    TokenTypeMismatch,
    /// Token carries no usable subject
    SubjectMissing,
    /// Token was blacklisted or superseded by a later issuance
    Revoked,
    /// Session store write failed; only surfaced from write paths
    /// (login/logout/refresh), never from authentication reads
    StoreUnavailable(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::Malformed => "malformed_token",
            AuthError::Unsupported => "unsupported_token",
            AuthError::SignatureInvalid => "invalid_signature",
            AuthError::Expired => "token_expired",
            AuthError::TokenTypeMismatch => "token_type_mismatch",
            AuthError::SubjectMissing => "subject_missing",
            AuthError::Revoked => "token_revoked",
            AuthError::StoreUnavailable(_) => "store_unavailable",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::Malformed
            | AuthError::Unsupported
            | AuthError::SignatureInvalid
            | AuthError::Expired
            | AuthError::TokenTypeMismatch
            | AuthError::SubjectMissing
            | AuthError::Revoked => StatusCode::UNAUTHORIZED,
            AuthError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Bearer token is required"),
            AuthError::Malformed => write!(f, "Token is malformed"),
            AuthError::Unsupported => write!(f, "Token format or algorithm is not supported"),
            AuthError::SignatureInvalid => write!(f, "Token signature is invalid"),
            AuthError::Expired => write!(f, "Token has expired"),
            AuthError::TokenTypeMismatch => {
                write!(f, "Token type is not valid for this operation")
            }
            AuthError::SubjectMissing => write!(f, "Token carries no subject"),
            AuthError::Revoked => write!(f, "Token has been revoked"),
            AuthError::StoreUnavailable(msg) => write!(f, "Session store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
