// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! JWT bearer authentication with a Redis-backed revocation layer.
//!
//! ## Auth Flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. The per-request filter ([`middleware`]) extracts the token and
//!    delegates to the [`Authenticator`]:
//!    - signature + expiry verification (HS256, [`TokenCodec`])
//!    - `tokenType` must be `ACCESS`
//!    - best-effort blacklist and stored-token checks against the
//!      session store (fail-open on store outage)
//! 3. On success a [`Principal`] is bound to the request; on any
//!    failure the request continues unauthenticated and the [`Auth`]
//!    extractor produces the 401 where a principal is required.
//!
//! ## Security
//!
//! - The signing secret is loaded once at startup; rotation invalidates
//!   all outstanding tokens
//! - Revocation (logout) blacklists the token for its remaining
//!   lifetime; the blacklist never outlives the token it shadows
//! - Store unavailability degrades to stateless verification, it never
//!   widens access beyond cryptographically valid tokens

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod roles;
pub mod service;
pub mod token;

pub use claims::{Principal, TokenClaims, TokenType};
pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth};
pub use middleware::auth_middleware;
pub use roles::Role;
pub use service::{Authenticator, TokenPair};
pub use token::TokenCodec;
