//! Media storage for uploaded image files.
//!
//! Image rows in the store hold metadata only; the bytes go through a
//! [`MediaStore`]. The disk implementation writes under a root directory
//! with a generated filename. Anything fancier (object storage, a CDN)
//! implements the same trait.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Media storage error
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Failed to store media file: {0}")]
    Write(String),

    #[error("Invalid media root: {0}")]
    InvalidRoot(String),
}

/// An image upload in flight: the client's filename plus the bytes.
#[derive(Clone, Debug)]
pub struct ImageUpload {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Where uploaded files physically land.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist the upload, returning the stored filename.
    async fn save(&self, upload: ImageUpload) -> Result<String, MediaError>;
}

/// Media store writing files under a local directory.
pub struct DiskMediaStore {
    root: PathBuf,
}

impl DiskMediaStore {
    /// Open a disk media store, creating the root directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, MediaError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| MediaError::InvalidRoot(e.to_string()))?;
        Ok(Self { root })
    }

    /// Path of a stored file under the root.
    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }
}

#[async_trait]
impl MediaStore for DiskMediaStore {
    async fn save(&self, upload: ImageUpload) -> Result<String, MediaError> {
        // The stored name is generated; the upload's own name only
        // contributes its extension.
        let ext = Path::new(&upload.filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let filename = format!("{}.{}", Uuid::now_v7(), ext);
        tokio::fs::write(self.root.join(&filename), &upload.content)
            .await
            .map_err(|e| MediaError::Write(e.to_string()))?;
        Ok(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disk_store_roundtrips_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskMediaStore::open(dir.path()).await.unwrap();

        let filename = store
            .save(ImageUpload {
                filename: "banner.png".into(),
                content: vec![0x89, 0x50, 0x4e, 0x47],
            })
            .await
            .unwrap();

        assert!(filename.ends_with(".png"));
        let bytes = tokio::fs::read(store.path_of(&filename)).await.unwrap();
        assert_eq!(bytes, vec![0x89, 0x50, 0x4e, 0x47]);
    }

    #[tokio::test]
    async fn stored_filenames_are_unique_per_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskMediaStore::open(dir.path()).await.unwrap();

        let upload = ImageUpload {
            filename: "photo.jpg".into(),
            content: b"jpeg bytes".to_vec(),
        };
        let first = store.save(upload.clone()).await.unwrap();
        let second = store.save(upload).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn extension_falls_back_when_upload_has_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskMediaStore::open(dir.path()).await.unwrap();

        let filename = store
            .save(ImageUpload {
                filename: "upload".into(),
                content: vec![1, 2, 3],
            })
            .await
            .unwrap();
        assert!(filename.ends_with(".bin"));
    }

    #[tokio::test]
    async fn open_creates_nested_root() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("media").join("images");
        let store = DiskMediaStore::open(&nested).await.unwrap();

        store
            .save(ImageUpload {
                filename: "a.webp".into(),
                content: vec![0],
            })
            .await
            .unwrap();
        assert!(nested.exists());
    }
}
