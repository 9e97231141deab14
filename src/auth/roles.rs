// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role tiers derived from token claims.
///
/// ## Role Hierarchy
///
/// - `Premium` - Paying user, unlocks premium-only endpoints
/// - `User` - Normal authenticated user
///
/// The wire names follow the upstream identity service convention
/// (`ROLE_USER` / `ROLE_PREMIUM_USER`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    /// Premium subscriber
    #[serde(rename = "ROLE_PREMIUM_USER")]
    Premium,
    /// Normal authenticated user
    #[serde(rename = "ROLE_USER")]
    User,
}

impl Role {
    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        match (self, required) {
            // Premium users can do everything a normal user can
            (Role::Premium, _) => true,
            (Role::User, Role::User) => true,
            _ => false,
        }
    }

    /// Derive the role from the token's premium flag.
    pub fn from_premium_flag(is_premium: bool) -> Role {
        if is_premium {
            Role::Premium
        } else {
            Role::User
        }
    }
}

impl Default for Role {
    /// Default role is User (least privilege for authenticated users).
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Premium => write!(f, "ROLE_PREMIUM_USER"),
            Role::User => write!(f, "ROLE_USER"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premium_has_all_privileges() {
        assert!(Role::Premium.has_privilege(Role::Premium));
        assert!(Role::Premium.has_privilege(Role::User));
    }

    #[test]
    fn user_only_has_user_privilege() {
        assert!(!Role::User.has_privilege(Role::Premium));
        assert!(Role::User.has_privilege(Role::User));
    }

    #[test]
    fn premium_flag_maps_to_role() {
        assert_eq!(Role::from_premium_flag(true), Role::Premium);
        assert_eq!(Role::from_premium_flag(false), Role::User);
    }

    #[test]
    fn default_role_is_user() {
        assert_eq!(Role::default(), Role::User);
    }
}
