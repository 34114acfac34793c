//! Core data models for the markdown document service.
//!
//! These entities describe documents and image assets as they exist in the
//! blob store. They serialize naturally as JSON via `serde`.

pub mod document;
pub mod image;
