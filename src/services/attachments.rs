// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local storage for todo image attachments.
//!
//! Each todo owns one directory, `{upload_dir}/{todo_id}/`, holding at most
//! one image. Files are served back under `/uploads`.

use crate::error::{AppError, Result};
use crate::middleware::security::UPLOADS_PREFIX;
use anyhow::anyhow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Largest accepted image, in bytes (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Accepted content types and the extension used on disk.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// File extension for an accepted image content type.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// An image written to disk but not necessarily attached yet.
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Public URL under `/uploads`
    pub url: String,
    todo_id: String,
    file_name: String,
}

/// Filesystem-backed attachment store.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` as a new image for the todo. Earlier images are left
    /// alone until the caller commits to this one with [`Self::prune`].
    ///
    /// `todo_id` must already be in canonical UUID form.
    pub async fn store(&self, todo_id: &str, content_type: &str, bytes: &[u8]) -> Result<StoredImage> {
        let ext = image_extension(content_type).ok_or_else(|| {
            AppError::Validation("Only JPEG, PNG, GIF and WebP images are accepted".to_string())
        })?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Image file is empty".to_string()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::PayloadTooLarge(MAX_IMAGE_BYTES));
        }

        let dir = self.root.join(todo_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(anyhow!("Failed to create {:?}: {}", dir, e)))?;

        let file_name = format!("{}.{}", uuid::Uuid::new_v4(), ext);
        let path = dir.join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Internal(anyhow!("Failed to write {:?}: {}", path, e)))?;

        tracing::debug!(todo_id, size = bytes.len(), file = %file_name, "Stored image");

        Ok(StoredImage {
            url: format!("{}/{}/{}", UPLOADS_PREFIX, todo_id, file_name),
            todo_id: todo_id.to_string(),
            file_name,
        })
    }

    /// Delete every image of the todo except `keep`.
    pub async fn prune(&self, keep: &StoredImage) -> Result<()> {
        let dir = self.root.join(&keep.todo_id);
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| AppError::Internal(anyhow!("Failed to read {:?}: {}", dir, e)))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::Internal(anyhow!("Failed to read {:?}: {}", dir, e)))?
        {
            if entry.file_name().to_str() == Some(keep.file_name.as_str()) {
                continue;
            }
            let path = entry.path();
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Internal(anyhow!("Failed to remove {:?}: {}", path, e)))?;
        }
        Ok(())
    }

    /// Undo [`Self::store`] for an image that never got attached.
    pub async fn discard(&self, image: &StoredImage) -> Result<()> {
        let path = self.root.join(&image.todo_id).join(&image.file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(AppError::Internal(anyhow!(
                    "Failed to remove {:?}: {}",
                    path,
                    e
                )))
            }
        }

        // Leaves the directory in place if an earlier image still lives there.
        let _ = tokio::fs::remove_dir(self.root.join(&image.todo_id)).await;
        Ok(())
    }

    /// Delete everything stored for a todo. Missing files are not an error.
    pub async fn remove(&self, todo_id: &str) -> Result<()> {
        let dir = self.root.join(todo_id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(anyhow!(
                "Failed to remove {:?}: {}",
                dir,
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TODO_ID: &str = "0b6c3f8e-5d7a-4c1e-9f2b-1a2b3c4d5e6f";

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("image/png"), Some("png"));
        assert_eq!(image_extension("IMAGE/JPEG; charset=binary"), Some("jpg"));
        assert_eq!(image_extension("image/svg+xml"), None);
        assert_eq!(image_extension("text/plain"), None);
    }

    #[tokio::test]
    async fn test_prune_keeps_only_committed_image() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path());

        let first = store.store(TODO_ID, "image/png", b"one").await.unwrap();
        let second = store.store(TODO_ID, "image/gif", b"two").await.unwrap();
        assert_ne!(first.url, second.url);
        assert!(second.url.starts_with(&format!("/uploads/{}/", TODO_ID)));
        assert!(second.url.ends_with(".gif"));

        // Both exist until the second is committed.
        assert_eq!(std::fs::read_dir(dir.path().join(TODO_ID)).unwrap().count(), 2);

        store.prune(&second).await.unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path().join(TODO_ID))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, [second.file_name.clone()]);
    }

    #[tokio::test]
    async fn test_discard_leaves_previous_image() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path());

        let kept = store.store(TODO_ID, "image/png", b"one").await.unwrap();
        let dropped = store.store(TODO_ID, "image/png", b"two").await.unwrap();
        store.discard(&dropped).await.unwrap();

        let todo_dir = dir.path().join(TODO_ID);
        assert!(todo_dir.join(&kept.file_name).exists());
        assert!(!todo_dir.join(&dropped.file_name).exists());

        // The last image going also removes the directory.
        store.discard(&kept).await.unwrap();
        assert!(!todo_dir.exists());
    }

    #[tokio::test]
    async fn test_rejects_bad_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path());

        assert!(matches!(
            store.store(TODO_ID, "text/plain", b"hi").await.unwrap_err(),
            AppError::Validation(_)
        ));
        assert!(matches!(
            store.store(TODO_ID, "image/png", b"").await.unwrap_err(),
            AppError::Validation(_)
        ));
        let big = vec![0u8; MAX_IMAGE_BYTES + 1];
        assert!(matches!(
            store.store(TODO_ID, "image/png", &big).await.unwrap_err(),
            AppError::PayloadTooLarge(_)
        ));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path());

        store.store(TODO_ID, "image/webp", b"x").await.unwrap();
        store.remove(TODO_ID).await.unwrap();
        store.remove(TODO_ID).await.unwrap();
        assert!(!dir.path().join(TODO_ID).exists());
    }
}
