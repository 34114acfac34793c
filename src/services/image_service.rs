//! src/services/image_service.rs
//!
//! ImageService — validated image uploads beneath the `images/` prefix.
//! Uploads are immutable; nothing in the document lifecycle deletes them, so
//! orphaned images stay in the store until removed explicitly.

use crate::models::image::ImageInfo;
use crate::services::blob_store::{BlobStore, StoreError};
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Store prefix all image objects live under.
pub const IMAGE_PREFIX: &str = "images/";

/// Upload size cap: 5 MB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Outcome of a successful upload.
#[derive(Debug)]
pub struct SavedImage {
    pub url: String,
    pub path: String,
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("unsupported image type `{0}` (JPEG, PNG, GIF, and WebP are accepted)")]
    InvalidType(String),
    #[error("image is {0} bytes, the limit is 5MB")]
    TooLarge(usize),
    #[error("no image file was provided")]
    MissingFile,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ImageResult<T> = Result<T, ImageError>;

/// Upload repository for image assets.
#[derive(Clone)]
pub struct ImageService {
    store: Arc<dyn BlobStore>,
}

impl ImageService {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Validate and store an uploaded image.
    ///
    /// Validation happens before any store call: a rejected upload performs
    /// no write. The object path is `images/<timestamp>_<sanitized-name>`,
    /// collision-resistant through the millisecond upload timestamp.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> ImageResult<SavedImage> {
        if !ALLOWED_IMAGE_TYPES
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
        {
            return Err(ImageError::InvalidType(content_type.to_string()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge(bytes.len()));
        }

        let path = format!(
            "{}{}_{}",
            IMAGE_PREFIX,
            Utc::now().timestamp_millis(),
            sanitize_file_name(file_name)
        );
        let put = self.store.put(&path, bytes).await?;
        debug!("uploaded image {}", put.path);

        Ok(SavedImage {
            url: put.url,
            path: put.path,
        })
    }

    /// List every uploaded image.
    pub async fn list(&self) -> ImageResult<Vec<ImageInfo>> {
        let objects = self.store.list(IMAGE_PREFIX).await?;
        Ok(objects
            .into_iter()
            .map(|object| ImageInfo {
                url: object.url,
                filename: object
                    .path
                    .strip_prefix(IMAGE_PREFIX)
                    .unwrap_or(&object.path)
                    .to_string(),
                uploaded_at: object.uploaded_at,
            })
            .collect())
    }

    /// Remove an image by its public URL.
    pub async fn delete(&self, url: &str) -> ImageResult<()> {
        self.store.delete(url).await?;
        debug!("deleted image {}", url);
        Ok(())
    }
}

/// Keep ASCII alphanumerics, dots, and hyphens; everything else becomes `_`.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
