//! HTTP handlers, grouped by surface.

pub mod blob_handlers;
pub mod document_handlers;
pub mod health_handlers;
pub mod image_handlers;
pub mod page_handlers;
