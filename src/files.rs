// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! On-disk file persistence.
//!
//! Files are stored under `<root>/<user>/<division>/<prefix><name>`
//! where `prefix` is a random identifier to avoid collisions between
//! uploads of the same file name. The returned location is the path
//! relative to the root; callers present it back verbatim to delete or
//! serve the file.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("invalid path component")]
    InvalidPath,
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

/// File persistence rooted at the configured upload directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist an uploaded file and return its relative location.
    pub async fn save(
        &self,
        user_id: &str,
        division: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, FileStoreError> {
        let user = sanitize_component(user_id)?;
        let division = sanitize_component(division)?;
        let name = clean_file_name(original_name)?;

        let dir = self.root.join(user).join(division);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!("{}-{}", Uuid::new_v4().simple(), name);
        tokio::fs::write(dir.join(&file_name), bytes).await?;

        Ok(format!("{user}/{division}/{file_name}"))
    }

    /// Delete a previously stored file by its relative location.
    pub async fn delete(&self, location: &str) -> Result<(), FileStoreError> {
        let path = self.resolve(location)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(FileStoreError::NotFound(location.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Read a previously stored file by its relative location.
    pub async fn load(&self, location: &str) -> Result<Vec<u8>, FileStoreError> {
        let path = self.resolve(location)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(FileStoreError::NotFound(location.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Turn a relative location into an absolute path under the root,
    /// refusing traversal outside it.
    fn resolve(&self, location: &str) -> Result<PathBuf, FileStoreError> {
        let mut path = self.root.clone();
        for component in location.split('/') {
            path.push(sanitize_component(component)?);
        }
        Ok(path)
    }
}

/// A single path component: non-empty, no separators, no dot-dirs.
fn sanitize_component(component: &str) -> Result<&str, FileStoreError> {
    if component.is_empty()
        || component == "."
        || component == ".."
        || component.contains('/')
        || component.contains('\\')
        || component.contains('\0')
    {
        return Err(FileStoreError::InvalidPath);
    }
    Ok(component)
}

/// Strip any directory part a client put into the file name.
fn clean_file_name(original: &str) -> Result<&str, FileStoreError> {
    let name = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    sanitize_component(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (FileStore, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        (FileStore::new(dir.path()), dir)
    }

    #[tokio::test]
    async fn save_load_delete_round_trip() {
        let (store, _dir) = store();
        let location = store
            .save("u1", "avatars", "photo.png", b"png-bytes")
            .await
            .unwrap();

        assert!(location.starts_with("u1/avatars/"));
        assert!(location.ends_with("-photo.png"));

        assert_eq!(store.load(&location).await.unwrap(), b"png-bytes");
        store.delete(&location).await.unwrap();
        assert!(matches!(
            store.load(&location).await,
            Err(FileStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn client_supplied_directory_part_is_stripped() {
        let (store, _dir) = store();
        let location = store
            .save("u1", "docs", "../../etc/passwd", b"data")
            .await
            .unwrap();
        assert!(location.ends_with("-passwd"));
        assert!(location.starts_with("u1/docs/"));
    }

    #[tokio::test]
    async fn traversal_locations_are_refused() {
        let (store, _dir) = store();
        assert!(matches!(
            store.load("u1/../../etc/passwd").await,
            Err(FileStoreError::InvalidPath)
        ));
        assert!(matches!(
            store.delete("..").await,
            Err(FileStoreError::InvalidPath)
        ));
    }

    #[tokio::test]
    async fn invalid_user_or_division_is_refused() {
        let (store, _dir) = store();
        assert!(matches!(
            store.save("", "docs", "a.txt", b"x").await,
            Err(FileStoreError::InvalidPath)
        ));
        assert!(matches!(
            store.save("u1", "a/b", "a.txt", b"x").await,
            Err(FileStoreError::InvalidPath)
        ));
    }

    #[tokio::test]
    async fn delete_missing_file_reports_not_found() {
        let (store, _dir) = store();
        assert!(matches!(
            store.delete("u1/docs/nope.txt").await,
            Err(FileStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn same_name_uploads_do_not_collide() {
        let (store, _dir) = store();
        let a = store.save("u1", "docs", "a.txt", b"one").await.unwrap();
        let b = store.save("u1", "docs", "a.txt", b"two").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.load(&a).await.unwrap(), b"one");
        assert_eq!(store.load(&b).await.unwrap(), b"two");
    }
}
