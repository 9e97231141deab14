// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and the authenticated principal.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Token type discriminator carried in the `tokenType` claim.
///
/// Refresh tokens are never accepted for resource access; the
/// authenticator rejects them with `TokenTypeMismatch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenType {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Access => write!(f, "ACCESS"),
            TokenType::Refresh => write!(f, "REFRESH"),
        }
    }
}

/// Claims embedded in a signed token.
///
/// `sub` is deserialized with a default so that a token missing its
/// subject still decodes structurally; the authenticator rejects the
/// empty subject with `SubjectMissing` rather than the codec reporting
/// a generic parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user identifier)
    #[serde(default)]
    pub sub: String,

    /// Issued at (Unix seconds)
    pub iat: i64,

    /// Expiration (Unix seconds)
    pub exp: i64,

    /// User's email (access tokens only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Premium subscription flag (access tokens only)
    #[serde(default, rename = "isPremium")]
    pub is_premium: bool,

    /// Token type (`ACCESS` or `REFRESH`)
    #[serde(rename = "tokenType")]
    pub token_type: TokenType,
}

impl TokenClaims {
    /// Remaining lifetime of the token in milliseconds, zero if already
    /// past expiry. Used to size blacklist entries on logout.
    pub fn remaining_ttl_ms(&self, now_secs: i64) -> u64 {
        if self.exp > now_secs {
            (self.exp - now_secs) as u64 * 1000
        } else {
            0
        }
    }
}

/// The authenticator's output: who is making this request.
///
/// Created fresh per request and attached to the request's extensions
/// by the authentication middleware; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    /// Canonical user identifier (`sub` claim)
    pub user_id: String,

    /// Derived role tier
    pub role: Role,
}

impl Principal {
    /// Build a principal from verified access-token claims.
    pub fn from_claims(claims: &TokenClaims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            role: Role::from_premium_flag(claims.is_premium),
        }
    }

    /// Check if this principal has the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }
}
