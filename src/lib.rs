// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational File Server - Authenticated File Upload Service
//!
//! This crate provides a JWT-authenticated file upload and delivery
//! service with a Redis-backed session and revocation store.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token issuance, verification and the per-request filter
//! - `store` - Session store (Redis, with an in-memory fallback)
//! - `files` - On-disk file persistence
//! - `classifier` - Optional content screening for image uploads

pub mod api;
pub mod auth;
pub mod classifier;
pub mod config;
pub mod error;
pub mod files;
pub mod models;
pub mod state;
pub mod store;
