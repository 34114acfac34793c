//! src/services/blob_store.rs
//!
//! Path-keyed blob storage behind the [`BlobStore`] trait. The service treats
//! the store as an opaque remote dependency: no retry or backoff is layered on
//! top, a failed call surfaces immediately as a failed operation.
//!
//! Two implementations live here: [`FsBlobStore`] keeps payloads on local disk
//! and hands out public URLs served through the `/blobs/` route, and an
//! in-memory store backs the unit tests.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::{
    io::{self, ErrorKind},
    path::PathBuf,
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

/// A stored object as reported by `list`.
#[derive(Clone, Debug)]
pub struct StoredObject {
    /// Store path, e.g. `md/hello-world.md`.
    pub path: String,
    /// Public URL the payload can be fetched from.
    pub url: String,
    /// When the object was last written.
    pub uploaded_at: DateTime<Utc>,
}

/// Result of a successful `put`.
#[derive(Clone, Debug)]
pub struct PutResult {
    pub path: String,
    pub url: String,
    /// MD5 of the payload.
    pub etag: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object `{0}` not found")]
    ObjectNotFound(String),
    #[error("invalid object path")]
    InvalidPath,
    #[error("url `{0}` does not belong to this store")]
    ForeignUrl(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

const MAX_OBJECT_PATH_LEN: usize = 1024;

/// Path-keyed object storage: list by prefix, fetch and write by path,
/// delete by public URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// List all objects whose path starts with `prefix`. Order is unspecified.
    async fn list(&self, prefix: &str) -> StoreResult<Vec<StoredObject>>;

    /// Fetch an object's payload.
    async fn get(&self, path: &str) -> StoreResult<Bytes>;

    /// Write an object, replacing any existing payload at `path`.
    async fn put(&self, path: &str, bytes: Bytes) -> StoreResult<PutResult>;

    /// Remove the object a previously returned URL points at.
    async fn delete(&self, url: &str) -> StoreResult<()>;
}

/// Basic path validation to avoid trivial traversal vectors.
///
/// Rejects paths that begin with `/` or contain `..`, control bytes,
/// backslashes, or NUL.
fn ensure_path_safe(path: &str) -> StoreResult<()> {
    if path.is_empty() || path.len() > MAX_OBJECT_PATH_LEN {
        return Err(StoreError::InvalidPath);
    }
    if path.starts_with('/') || path.contains("..") {
        return Err(StoreError::InvalidPath);
    }
    if path
        .bytes()
        .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
    {
        return Err(StoreError::InvalidPath);
    }
    Ok(())
}

/// Disk-backed blob store.
///
/// Objects live at `base_path/<path>` and are reachable publicly at
/// `<public_base>/<path>`. Writes go through a temp file and rename so a
/// half-written payload is never visible under its final path.
#[derive(Clone)]
pub struct FsBlobStore {
    base_path: PathBuf,
    public_base: String,
}

impl FsBlobStore {
    /// `public_base` is the URL prefix objects are served from,
    /// e.g. `http://localhost:3000/blobs`.
    pub fn new(base_path: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.public_base, path)
    }

    fn path_from_url<'a>(&self, url: &'a str) -> StoreResult<&'a str> {
        url.strip_prefix(&self.public_base)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|path| !path.is_empty())
            .ok_or_else(|| StoreError::ForeignUrl(url.to_string()))
    }

    fn disk_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn list(&self, prefix: &str) -> StoreResult<Vec<StoredObject>> {
        if !prefix.is_empty() {
            ensure_path_safe(prefix)?;
        }

        // Prefixes are directory-shaped (`md/`, `images/`) with an optional
        // filename fragment after the last slash.
        let (dir, name_prefix) = match prefix.rfind('/') {
            Some(pos) => (&prefix[..pos], &prefix[pos + 1..]),
            None => ("", prefix),
        };

        let mut entries = match fs::read_dir(self.base_path.join(dir)).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::Io(err)),
        };

        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(name_prefix) || name.starts_with(".tmp-") {
                continue;
            }
            let path = if dir.is_empty() {
                name
            } else {
                format!("{}/{}", dir, name)
            };
            let uploaded_at = meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            objects.push(StoredObject {
                url: self.url_for(&path),
                path,
                uploaded_at,
            });
        }
        Ok(objects)
    }

    async fn get(&self, path: &str) -> StoreResult<Bytes> {
        ensure_path_safe(path)?;
        match fs::read(self.disk_path(path)).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StoreError::ObjectNotFound(path.to_string()))
            }
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    async fn put(&self, path: &str, bytes: Bytes) -> StoreResult<PutResult> {
        ensure_path_safe(path)?;
        let file_path = self.disk_path(path);
        let parent = file_path
            .parent()
            .map(std::path::Path::to_path_buf)
            .ok_or(StoreError::InvalidPath)?;
        fs::create_dir_all(&parent).await?;

        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;
        if let Err(err) = file.write_all(&bytes).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&file_path).await?;
                fs::rename(&tmp_path, &file_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StoreError::Io(err));
            }
        }

        debug!("wrote object {} ({} bytes)", path, bytes.len());
        Ok(PutResult {
            path: path.to_string(),
            url: self.url_for(path),
            etag: format!("{:x}", md5::compute(&bytes)),
        })
    }

    async fn delete(&self, url: &str) -> StoreResult<()> {
        let path = self.path_from_url(url)?.to_string();
        ensure_path_safe(&path)?;
        match fs::remove_file(self.disk_path(&path)).await {
            Ok(()) => {
                debug!("removed object {}", path);
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StoreError::ObjectNotFound(path)),
            Err(err) => Err(StoreError::Io(err)),
        }
    }
}

/// In-memory store used by unit tests.
#[cfg(test)]
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    const MEMORY_BASE: &str = "memory://blob";

    #[derive(Clone, Default)]
    pub struct MemoryBlobStore {
        objects: Arc<Mutex<HashMap<String, (Bytes, DateTime<Utc>)>>>,
    }

    impl MemoryBlobStore {
        pub fn new() -> Self {
            Self::default()
        }

        fn url_for(path: &str) -> String {
            format!("{}/{}", MEMORY_BASE, path)
        }
    }

    #[async_trait]
    impl BlobStore for MemoryBlobStore {
        async fn list(&self, prefix: &str) -> StoreResult<Vec<StoredObject>> {
            let objects = self.objects.lock().unwrap();
            Ok(objects
                .iter()
                .filter(|(path, _)| path.starts_with(prefix))
                .map(|(path, (_, uploaded_at))| StoredObject {
                    path: path.clone(),
                    url: Self::url_for(path),
                    uploaded_at: *uploaded_at,
                })
                .collect())
        }

        async fn get(&self, path: &str) -> StoreResult<Bytes> {
            ensure_path_safe(path)?;
            let objects = self.objects.lock().unwrap();
            objects
                .get(path)
                .map(|(bytes, _)| bytes.clone())
                .ok_or_else(|| StoreError::ObjectNotFound(path.to_string()))
        }

        async fn put(&self, path: &str, bytes: Bytes) -> StoreResult<PutResult> {
            ensure_path_safe(path)?;
            let etag = format!("{:x}", md5::compute(&bytes));
            let mut objects = self.objects.lock().unwrap();
            objects.insert(path.to_string(), (bytes, Utc::now()));
            Ok(PutResult {
                path: path.to_string(),
                url: Self::url_for(path),
                etag,
            })
        }

        async fn delete(&self, url: &str) -> StoreResult<()> {
            let path = url
                .strip_prefix(MEMORY_BASE)
                .and_then(|rest| rest.strip_prefix('/'))
                .ok_or_else(|| StoreError::ForeignUrl(url.to_string()))?;
            let mut objects = self.objects.lock().unwrap();
            objects
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| StoreError::ObjectNotFound(path.to_string()))
        }
    }
}
