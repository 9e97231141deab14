// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Content classification seam.
//!
//! The upload path optionally consults a black-box classifier before
//! persisting image uploads. Classification is advisory: a classifier
//! error must not block the upload (fail-open), only a positive
//! flagged verdict rejects it.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("content classification failed: {0}")]
pub struct ClassifierError(pub String);

/// Boolean content classifier invoked from the upload path.
#[async_trait]
pub trait ContentClassifier: Send + Sync {
    /// Whether the given content should be refused.
    async fn is_flagged(&self, bytes: &[u8]) -> Result<bool, ClassifierError>;
}

/// Whether an upload should be screened at all.
pub fn is_image(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.starts_with("image/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_image_content_types_are_screened() {
        assert!(is_image(Some("image/png")));
        assert!(is_image(Some("image/jpeg")));
        assert!(!is_image(Some("application/pdf")));
        assert!(!is_image(None));
    }
}
