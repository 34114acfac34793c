//! Frontmatter codec.
//!
//! Documents are stored as a delimited metadata block followed by the raw
//! markdown body:
//!
//! ```text
//! ---
//! title: "Hello"
//! description: ""
//! code: "hello-world"
//! date: "2025-08-06T12:00:00.000Z"
//! ---
//!
//! # Hi
//! ```
//!
//! `encode` emits the block in a fixed key order with double-quoted values;
//! optional keys with no value are omitted. `decode` is lenient: a missing,
//! unclosed, or unparseable block degrades to default metadata and the body
//! is recovered as-is.

use crate::models::document::DocMeta;
use chrono::SecondsFormat;

const DELIMITER: &str = "---";

/// Serialize metadata and body into storable text.
///
/// `decode(encode(meta, body))` reproduces both exactly.
pub fn encode(meta: &DocMeta, body: &str) -> String {
    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push('\n');
    push_field(&mut out, "title", &meta.title);
    push_field(&mut out, "description", &meta.description);
    push_field(&mut out, "code", &meta.code);
    if let Some(image) = &meta.image {
        push_field(&mut out, "image", image);
    }
    if let Some(date) = meta.date {
        push_field(
            &mut out,
            "date",
            &date.to_rfc3339_opts(SecondsFormat::Millis, true),
        );
    }
    out.push_str(DELIMITER);
    out.push_str("\n\n");
    out.push_str(body);
    out
}

/// Split leading frontmatter from the body.
///
/// Never fails: text without a well-formed block comes back with default
/// metadata and the best body recovery available.
pub fn decode(text: &str) -> (DocMeta, String) {
    let Some(rest) = text.strip_prefix("---\n") else {
        return (DocMeta::default(), text.to_string());
    };
    let Some(end) = rest.find("\n---") else {
        return (DocMeta::default(), text.to_string());
    };

    let block = &rest[..end];
    let mut body = &rest[end + "\n---".len()..];
    // Consume the newline terminating the closing delimiter line, then the
    // single blank line `encode` writes before the body.
    body = body.strip_prefix('\n').unwrap_or(body);
    body = body.strip_prefix('\n').unwrap_or(body);

    let meta = serde_yml::from_str::<DocMeta>(block).unwrap_or_default();
    (meta, body.to_string())
}

fn push_field(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": \"");
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push_str("\"\n");
}
