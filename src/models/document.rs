//! Represents a markdown document stored as a blob object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata carried in a document's frontmatter block.
///
/// Every field is optional on the wire: a file with a missing or malformed
/// block decodes to the defaults here, and display fallbacks (`Untitled`, the
/// path-derived code) are applied by the repository when it builds a
/// [`Document`].
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DocMeta {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub code: String,

    /// Optional header image URL.
    #[serde(default)]
    pub image: Option<String>,

    /// Creation timestamp. Written once at create time, preserved by updates.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// A fully materialized document: frontmatter metadata, markdown body, and
/// the store-level attributes of its backing object.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Document title. Falls back to `Untitled` when the frontmatter has none.
    pub title: String,

    /// Short description, empty string when absent.
    pub description: String,

    /// Unique short code identifying this document. Used in URLs and as the
    /// storage key (`md/<code>.md`).
    pub code: String,

    /// Optional header image URL.
    pub image: Option<String>,

    /// Creation timestamp from the frontmatter.
    pub date: Option<DateTime<Utc>>,

    /// When the backing object was last written, per the store's metadata.
    /// Not stored in the file itself.
    pub last_modified: DateTime<Utc>,

    /// Raw markdown body.
    pub content: String,

    /// Public URL of the backing object.
    pub url: String,

    /// Store path of the backing object.
    pub path: String,
}

/// Listing view of a document: everything except the body.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub title: String,
    pub description: String,
    pub code: String,
    pub image: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub last_modified: DateTime<Utc>,
    pub url: String,
    pub path: String,
}

impl From<Document> for DocumentSummary {
    fn from(doc: Document) -> Self {
        Self {
            title: doc.title,
            description: doc.description,
            code: doc.code,
            image: doc.image,
            date: doc.date,
            last_modified: doc.last_modified,
            url: doc.url,
            path: doc.path,
        }
    }
}
