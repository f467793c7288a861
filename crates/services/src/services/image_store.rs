//! Disk-backed store for uploaded images. Files are grouped per logical kind
//! and named by uuid; the server serves the root statically under `/images`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("empty upload")]
    Empty,
    #[error("invalid image path")]
    InvalidPath,
    #[error("image not found")]
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UploadedImage {
    /// Path relative to the store root, persisted on entity rows.
    pub path: String,
    /// Public URL the storefront can load the image from.
    pub url: String,
}

const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub async fn new(root: PathBuf) -> Result<Self, ImageStoreError> {
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub async fn save(
        &self,
        kind: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<UploadedImage, ImageStoreError> {
        if bytes.is_empty() {
            return Err(ImageStoreError::Empty);
        }
        let extension = ALLOWED_TYPES
            .iter()
            .find(|(mime, _)| *mime == content_type)
            .map(|(_, ext)| *ext)
            .ok_or_else(|| ImageStoreError::UnsupportedType(content_type.to_string()))?;
        let kind = Self::sanitize_kind(kind)?;

        let dir = self.root.join(&kind);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        tokio::fs::write(dir.join(&file_name), bytes).await?;

        let path = format!("{kind}/{file_name}");
        info!(path = %path, size = bytes.len(), "stored image");

        Ok(UploadedImage {
            url: format!("/images/{path}"),
            path,
        })
    }

    pub async fn delete(&self, rel_path: &str) -> Result<(), ImageStoreError> {
        if rel_path.is_empty()
            || rel_path
                .split('/')
                .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(ImageStoreError::InvalidPath);
        }

        match tokio::fs::remove_file(self.root.join(rel_path)).await {
            Ok(()) => {
                info!(path = %rel_path, "deleted image");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ImageStoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    fn sanitize_kind(kind: &str) -> Result<String, ImageStoreError> {
        let kind = kind.trim().to_ascii_lowercase();
        if kind.is_empty()
            || !kind
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ImageStoreError::InvalidPath);
        }
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().to_path_buf()).await.unwrap();

        let stored = store
            .save("products", "image/png", b"not-really-a-png")
            .await
            .unwrap();
        assert!(stored.path.starts_with("products/"));
        assert!(stored.path.ends_with(".png"));
        assert_eq!(stored.url, format!("/images/{}", stored.path));
        assert!(dir.path().join(&stored.path).exists());

        store.delete(&stored.path).await.unwrap();
        assert!(!dir.path().join(&stored.path).exists());

        let missing = store.delete(&stored.path).await;
        assert!(matches!(missing, Err(ImageStoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_rejects_unsupported_type_and_empty_body() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().to_path_buf()).await.unwrap();

        let svg = store.save("products", "image/svg+xml", b"<svg/>").await;
        assert!(matches!(svg, Err(ImageStoreError::UnsupportedType(_))));

        let empty = store.save("products", "image/png", b"").await;
        assert!(matches!(empty, Err(ImageStoreError::Empty)));
    }

    #[tokio::test]
    async fn test_delete_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().to_path_buf()).await.unwrap();

        let escape = store.delete("../etc/passwd").await;
        assert!(matches!(escape, Err(ImageStoreError::InvalidPath)));
    }

    #[tokio::test]
    async fn test_kind_is_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().to_path_buf()).await.unwrap();

        let bad = store.save("../sneaky", "image/png", b"data").await;
        assert!(matches!(bad, Err(ImageStoreError::InvalidPath)));
    }
}
