//! Content store module
//!
//! This module handles persisting fetched documents:
//! - The [`ContentStore`] trait (namespace + key object storage)
//! - A SQLite-backed store and an in-memory store
//! - Document classification and deterministic key derivation

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryContentStore;
pub use sqlite::SqliteContentStore;
pub use traits::{ContentStore, StoreError, StoreResult, StoredObject};

use std::fmt;

/// Document classification used to pick a storage key extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Pdf,
    Html,
}

impl ContentType {
    /// Classifies a declared `Content-Type` header value
    ///
    /// Anything mentioning "pdf" (case-insensitively) is a PDF; everything
    /// else, including a missing header, is treated as HTML.
    pub fn classify(declared: &str) -> Self {
        if declared.to_ascii_lowercase().contains("pdf") {
            Self::Pdf
        } else {
            Self::Html
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Html => ".html",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => f.write_str("pdf"),
            Self::Html => f.write_str("html"),
        }
    }
}

/// Derives the storage key for a record's document
///
/// Every space in `identifier` becomes `_`, then the classification's
/// extension is appended. Pure: the same inputs always give the same key.
///
/// # Example
///
/// ```
/// use wrc_harvest::storage::derive_key;
///
/// assert_eq!(derive_key("WRC 2021 001", "application/pdf"), "WRC_2021_001.pdf");
/// assert_eq!(derive_key("ADJ-00012345", "text/html; charset=utf-8"), "ADJ-00012345.html");
/// ```
pub fn derive_key(identifier: &str, declared_content_type: &str) -> String {
    let content_type = ContentType::classify(declared_content_type);
    format!("{}{}", identifier.replace(' ', "_"), content_type.extension())
}

/// A document ready to be written to the store
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub key: String,
    pub bucket: String,
    pub content_type: ContentType,
    /// Content type as declared by the server, lowercased
    pub declared_type: String,
    pub body: Vec<u8>,
}

impl StoredDocument {
    pub fn new(identifier: &str, bucket: &str, declared_type: &str, body: Vec<u8>) -> Self {
        let declared_type = declared_type.to_ascii_lowercase();
        Self {
            key: derive_key(identifier, &declared_type),
            bucket: bucket.to_string(),
            content_type: ContentType::classify(&declared_type),
            declared_type,
            body,
        }
    }

    /// Writes this document to `store`
    pub async fn write_to(&self, store: &dyn ContentStore) -> StoreResult<()> {
        store
            .put(&self.bucket, &self.key, &self.body, &self.declared_type)
            .await
    }
}
