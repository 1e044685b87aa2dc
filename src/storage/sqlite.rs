//! SQLite content store implementation

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ContentStore, StoreError, StoreResult, StoredObject};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite-backed content store
///
/// Each namespace is a row in `namespaces`; objects live in `objects` keyed
/// by `(namespace, key)`. Every `put` runs in its own transaction.
pub struct SqliteContentStore {
    conn: Mutex<Connection>,
    principal: String,
}

impl SqliteContentStore {
    /// Opens (or creates) a store database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `principal` - Identity that owns namespaces created through this handle
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteContentStore)` - Successfully opened store
    /// * `Err(StoreError::Unavailable)` - The database could not be opened
    pub fn open(path: &Path, principal: &str) -> StoreResult<Self> {
        let conn = Connection::open(path).map_err(|e| {
            StoreError::Unavailable(format!("cannot open {}: {}", path.display(), e))
        })?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
        ",
        )
        .map_err(|e| StoreError::Unavailable(format!("cannot configure {}: {}", path.display(), e)))?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            principal: principal.to_string(),
        })
    }

    /// Creates an in-memory store (for testing)
    pub fn open_in_memory(principal: &str) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            principal: principal.to_string(),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("store connection poisoned".to_string()))
    }
}

fn namespace_owner(conn: &Connection, name: &str) -> StoreResult<Option<String>> {
    let owner = conn
        .query_row(
            "SELECT owner FROM namespaces WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(owner)
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn ensure_namespace(&self, name: &str) -> StoreResult<()> {
        let conn = self.lock()?;

        match namespace_owner(&conn, name)? {
            Some(owner) if owner == self.principal => Ok(()),
            Some(owner) => Err(StoreError::NamespaceConflict {
                namespace: name.to_string(),
                owner,
            }),
            None => {
                conn.execute(
                    "INSERT INTO namespaces (name, owner, created_at) VALUES (?1, ?2, ?3)",
                    params![name, self.principal, Utc::now().to_rfc3339()],
                )?;
                tracing::info!("Created namespace {}", name);
                Ok(())
            }
        }
    }

    async fn put(
        &self,
        namespace: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if namespace_owner(&tx, namespace)?.is_none() {
            return Err(StoreError::Unavailable(format!(
                "namespace '{}' does not exist",
                namespace
            )));
        }

        tx.execute(
            "INSERT INTO objects (namespace, key, content_type, body, size, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(namespace, key) DO UPDATE SET
                content_type = excluded.content_type,
                body = excluded.body,
                size = excluded.size,
                stored_at = excluded.stored_at",
            params![
                namespace,
                key,
                content_type,
                body,
                body.len() as i64,
                Utc::now().to_rfc3339()
            ],
        )?;
        tx.commit()?;

        Ok(())
    }

    async fn get(&self, namespace: &str, key: &str) -> StoreResult<Option<StoredObject>> {
        let conn = self.lock()?;
        let object = conn
            .query_row(
                "SELECT key, content_type, body FROM objects WHERE namespace = ?1 AND key = ?2",
                params![namespace, key],
                |row| {
                    Ok(StoredObject {
                        key: row.get(0)?,
                        content_type: row.get(1)?,
                        body: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(object)
    }

    async fn list_keys(&self, namespace: &str) -> StoreResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT key FROM objects WHERE namespace = ?1 ORDER BY key")?;
        let keys = stmt
            .query_map(params![namespace], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_ensure_namespace_is_idempotent() {
        let store = SqliteContentStore::open_in_memory("harvester").unwrap();
        store.ensure_namespace("legal").await.unwrap();
        store.ensure_namespace("legal").await.unwrap();
    }

    #[tokio::test]
    async fn test_namespace_conflict() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.db");

        let ours = SqliteContentStore::open(&path, "harvester").unwrap();
        ours.ensure_namespace("legal").await.unwrap();

        let theirs = SqliteContentStore::open(&path, "someone-else").unwrap();
        let err = theirs.ensure_namespace("legal").await.unwrap_err();
        match err {
            StoreError::NamespaceConflict { namespace, owner } => {
                assert_eq!(namespace, "legal");
                assert_eq!(owner, "harvester");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = SqliteContentStore::open_in_memory("harvester").unwrap();
        store.ensure_namespace("legal").await.unwrap();

        store.put("legal", "A.html", b"first", "text/html").await.unwrap();
        store
            .put("legal", "A.html", b"second", "application/pdf")
            .await
            .unwrap();

        let object = store.get("legal", "A.html").await.unwrap().unwrap();
        assert_eq!(object.body, b"second");
        assert_eq!(object.content_type, "application/pdf");
        assert_eq!(store.list_keys("legal").await.unwrap(), vec!["A.html"]);
    }

    #[tokio::test]
    async fn test_put_into_missing_namespace() {
        let store = SqliteContentStore::open_in_memory("harvester").unwrap();
        let err = store.put("nope", "A.html", b"x", "text/html").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_open_unreachable_path() {
        let result = SqliteContentStore::open(Path::new("/nonexistent/dir/store.db"), "harvester");
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_persists_across_handles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.db");

        {
            let store = SqliteContentStore::open(&path, "harvester").unwrap();
            store.ensure_namespace("legal").await.unwrap();
            store.put("legal", "B.pdf", b"%PDF", "application/pdf").await.unwrap();
        }

        let store = SqliteContentStore::open(&path, "harvester").unwrap();
        assert_eq!(store.list_keys("legal").await.unwrap(), vec!["B.pdf"]);
    }
}
