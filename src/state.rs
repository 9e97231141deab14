// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::Authenticator;
use crate::classifier::ContentClassifier;
use crate::files::FileStore;

#[derive(Clone)]
pub struct AppState {
    pub authenticator: Authenticator,
    pub files: FileStore,
    /// Optional content classifier consulted on image uploads.
    pub classifier: Option<Arc<dyn ContentClassifier>>,
}

impl AppState {
    pub fn new(authenticator: Authenticator, files: FileStore) -> Self {
        Self {
            authenticator,
            files,
            classifier: None,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ContentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }
}
