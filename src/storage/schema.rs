//! Database schema for the SQLite content store

/// SQL schema for the content store
pub const SCHEMA_SQL: &str = r#"
-- Namespaces (buckets) and the principal that owns each one
CREATE TABLE IF NOT EXISTS namespaces (
    name TEXT PRIMARY KEY,
    owner TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Stored objects, one row per (namespace, key)
CREATE TABLE IF NOT EXISTS objects (
    namespace TEXT NOT NULL REFERENCES namespaces(name),
    key TEXT NOT NULL,
    content_type TEXT NOT NULL,
    body BLOB NOT NULL,
    size INTEGER NOT NULL,
    stored_at TEXT NOT NULL,
    PRIMARY KEY (namespace, key)
);

CREATE INDEX IF NOT EXISTS idx_objects_namespace ON objects(namespace);
"#;

/// Initializes the store schema
///
/// Safe to call on every open; all statements are `IF NOT EXISTS`.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
