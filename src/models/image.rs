//! Represents an uploaded image asset.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Listing view of a stored image.
///
/// Images are immutable once uploaded; the filename embeds the upload
/// timestamp, so two uploads of the same file never collide.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    /// Public URL of the image object.
    pub url: String,

    /// Object filename beneath the image prefix
    /// (`<timestamp>_<sanitized-original-name>`).
    pub filename: String,

    /// When the image was uploaded.
    pub uploaded_at: DateTime<Utc>,
}
