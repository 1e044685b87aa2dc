//! Content store trait and error types

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during content store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or refused the operation
    #[error("Content store unavailable: {0}")]
    Unavailable(String),

    /// The namespace exists and belongs to someone else
    #[error("Namespace '{namespace}' is owned by '{owner}'")]
    NamespaceConflict { namespace: String, owner: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for content store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A stored object as read back from a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Key/value object store addressed by namespace + key
///
/// Implementations must tolerate concurrent `put` calls to distinct keys
/// without coordination. Two puts to the same key resolve last-writer-wins.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Creates a namespace if it does not exist
    ///
    /// Succeeds silently when the namespace already exists and is owned by
    /// this store's principal; fails with [`StoreError::NamespaceConflict`]
    /// when another principal owns it.
    async fn ensure_namespace(&self, name: &str) -> StoreResult<()>;

    /// Writes an object, replacing any existing object under the same key
    ///
    /// The write is atomic from the caller's point of view: readers see
    /// either the previous object or the new one, never a mix.
    async fn put(
        &self,
        namespace: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> StoreResult<()>;

    /// Reads an object back, if present
    async fn get(&self, namespace: &str, key: &str) -> StoreResult<Option<StoredObject>>;

    /// Lists all keys in a namespace, sorted
    async fn list_keys(&self, namespace: &str) -> StoreResult<Vec<String>>;
}
