//! src/services/document_service.rs
//!
//! DocumentService — CRUD over markdown documents stored beneath the `md/`
//! prefix of a [`BlobStore`]. The store is the sole source of truth: there is
//! no cache or secondary index, every operation re-lists the prefix and
//! re-parses what it finds.
//!
//! Create, update, and delete are check-then-act sequences of independent
//! store calls with no transactional guarantee; concurrent requests targeting
//! the same code can race. Update in particular is delete-then-put, so a
//! failure between the two calls leaves the document absent.

use crate::models::document::{DocMeta, Document};
use crate::services::blob_store::{BlobStore, StoreError};
use crate::services::frontmatter;
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Store prefix all document objects live under.
pub const DOCUMENT_PREFIX: &str = "md/";

/// Input for create and update operations.
#[derive(Clone, Debug)]
pub struct NewDocument {
    pub title: String,
    pub description: String,
    pub code: String,
    pub content: String,
    pub image: Option<String>,
}

/// Outcome of a successful create or update.
#[derive(Debug)]
pub struct SavedDocument {
    /// Object filename beneath the document prefix, e.g. `hello-world.md`.
    pub file_name: String,
    pub code: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("no document found for code `{0}`")]
    NotFound(String),
    #[error("code `{0}` is already in use")]
    CodeTaken(String),
    #[error("`{0}` is not a valid document code")]
    InvalidCode(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type DocumentResult<T> = Result<T, DocumentError>;

/// CRUD repository for markdown documents.
#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn BlobStore>,
}

impl DocumentService {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// List every document, most recently modified first.
    ///
    /// A failed store listing propagates. An object that cannot be fetched or
    /// decoded is logged and skipped so one corrupt file cannot take down the
    /// whole listing.
    pub async fn list(&self) -> DocumentResult<Vec<Document>> {
        let objects = self.store.list(DOCUMENT_PREFIX).await?;

        let mut documents = Vec::with_capacity(objects.len());
        for object in objects {
            let bytes = match self.store.get(&object.path).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!("skipping unreadable object {}: {}", object.path, err);
                    continue;
                }
            };
            let text = String::from_utf8_lossy(&bytes);
            let (meta, body) = frontmatter::decode(&text);

            documents.push(Document {
                title: if meta.title.is_empty() {
                    "Untitled".to_string()
                } else {
                    meta.title
                },
                description: meta.description,
                code: if meta.code.is_empty() {
                    code_from_path(&object.path).to_string()
                } else {
                    meta.code
                },
                image: meta.image,
                date: meta.date,
                last_modified: object.uploaded_at,
                content: body,
                url: object.url,
                path: object.path,
            });
        }

        documents.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        Ok(documents)
    }

    /// Find a document by its code. O(n) over the full listing, acceptable
    /// while the document count stays small.
    pub async fn get_by_code(&self, code: &str) -> DocumentResult<Document> {
        self.list()
            .await?
            .into_iter()
            .find(|doc| doc.code == code)
            .ok_or_else(|| DocumentError::NotFound(code.to_string()))
    }

    /// Create a new document. Fails if the code is malformed or already taken.
    pub async fn create(&self, new: NewDocument) -> DocumentResult<SavedDocument> {
        ensure_code_valid(&new.code)?;

        let existing = self.list().await?;
        if existing.iter().any(|doc| doc.code == new.code) {
            return Err(DocumentError::CodeTaken(new.code));
        }

        self.write(&new, Some(Utc::now())).await
    }

    /// Replace the document identified by `original_code` with `new`.
    ///
    /// A changed code must not collide with a different existing document.
    /// The creation date of the original is preserved. The old object is
    /// deleted before the new one is written.
    pub async fn update(
        &self,
        original_code: &str,
        new: NewDocument,
    ) -> DocumentResult<SavedDocument> {
        ensure_code_valid(&new.code)?;

        let documents = self.list().await?;
        let existing = documents
            .iter()
            .find(|doc| doc.code == original_code)
            .ok_or_else(|| DocumentError::NotFound(original_code.to_string()))?;

        if new.code != original_code
            && documents
                .iter()
                .any(|doc| doc.code == new.code && doc.code != original_code)
        {
            return Err(DocumentError::CodeTaken(new.code));
        }

        let date = existing.date.or_else(|| Some(Utc::now()));
        self.store.delete(&existing.url).await?;
        self.write(&new, date).await
    }

    /// Permanently remove the document identified by `code`.
    pub async fn delete(&self, code: &str) -> DocumentResult<()> {
        let documents = self.list().await?;
        let existing = documents
            .iter()
            .find(|doc| doc.code == code)
            .ok_or_else(|| DocumentError::NotFound(code.to_string()))?;

        self.store.delete(&existing.url).await?;
        debug!("deleted document {}", code);
        Ok(())
    }

    async fn write(
        &self,
        new: &NewDocument,
        date: Option<chrono::DateTime<Utc>>,
    ) -> DocumentResult<SavedDocument> {
        let meta = DocMeta {
            title: new.title.clone(),
            description: new.description.clone(),
            code: new.code.clone(),
            image: new.image.clone(),
            date,
        };
        let text = frontmatter::encode(&meta, &new.content);

        let file_name = format!("{}.md", new.code);
        let path = format!("{}{}", DOCUMENT_PREFIX, file_name);
        let put = self.store.put(&path, Bytes::from(text)).await?;
        debug!("saved document {} at {}", new.code, put.path);

        Ok(SavedDocument {
            file_name,
            code: new.code.clone(),
            url: put.url,
        })
    }
}

/// Codes are user-chosen URL path segments: lowercase letters (any script),
/// digits, and hyphens.
fn ensure_code_valid(code: &str) -> DocumentResult<()> {
    let valid = !code.is_empty()
        && code.chars().all(|c| {
            c == '-'
                || c.is_ascii_lowercase()
                || c.is_ascii_digit()
                || (!c.is_ascii() && c.is_alphanumeric() && !c.is_uppercase())
        });
    if valid {
        Ok(())
    } else {
        Err(DocumentError::InvalidCode(code.to_string()))
    }
}

fn code_from_path(path: &str) -> &str {
    path.strip_prefix(DOCUMENT_PREFIX)
        .unwrap_or(path)
        .strip_suffix(".md")
        .unwrap_or(path)
}
