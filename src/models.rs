// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response data structures for the REST API. All types
//! derive `Serialize`/`Deserialize` and `ToSchema` for automatic JSON
//! handling and OpenAPI documentation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Files
// =============================================================================

/// Response returned after a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Location of the stored file, relative to the upload root.
    /// Present this back verbatim to delete or fetch the file.
    pub file_location: String,
}

/// Request to delete a previously uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileRequest {
    pub file_location: String,
}

// =============================================================================
// Auth
// =============================================================================

/// Request to exchange a refresh token for a new token pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// A freshly issued token pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<crate::auth::TokenPair> for TokenPairResponse {
    fn from(pair: crate::auth::TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}
