use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DataRef, DocumentStore, StoreError, checksum};
use crate::context::ActivityContext;

/// SQLite-backed store keeping each collection as one JSON blob row
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub ref_count: u32,
    pub document_count: u64,
    pub payload_bytes: u64,
}

impl SqliteStore {
    /// Create a new in-memory database
    pub fn new_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn()?.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS refs (
                key TEXT PRIMARY KEY,
                schema TEXT NOT NULL,
                count INTEGER NOT NULL,
                checksum TEXT NOT NULL,
                payload BLOB NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_refs_schema ON refs(schema);
            "#,
        )?;
        Ok(())
    }

    /// Look up a stored reference by key
    pub fn find_ref(&self, key: &str) -> Result<Option<DataRef>, StoreError> {
        let conn = self.conn()?;
        let data_ref = conn
            .query_row(
                "SELECT key, schema, count, checksum FROM refs WHERE key = ?1",
                params![key],
                row_to_ref,
            )
            .optional()?;
        Ok(data_ref)
    }

    /// All stored references, oldest first
    pub fn list_refs(&self) -> Result<Vec<DataRef>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT key, schema, count, checksum FROM refs ORDER BY rowid")?;

        let refs = stmt
            .query_map([], row_to_ref)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(refs)
    }

    /// Get statistics
    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        let conn = self.conn()?;
        let stats = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(count), 0), COALESCE(SUM(LENGTH(payload)), 0) FROM refs",
            [],
            |row| {
                Ok(StoreStats {
                    ref_count: row.get(0)?,
                    document_count: row.get::<_, i64>(1)? as u64,
                    payload_bytes: row.get::<_, i64>(2)? as u64,
                })
            },
        )?;
        Ok(stats)
    }

    /// Save database to file
    pub fn save_to_file(&self, path: &str) -> Result<(), StoreError> {
        // VACUUM INTO refuses to overwrite an existing file
        let _ = std::fs::remove_file(path);
        let safe_path = path.replace('\'', "''");
        self.conn()?
            .execute_batch(&format!("VACUUM INTO '{}'", safe_path))?;
        Ok(())
    }
}

fn row_to_ref(row: &Row<'_>) -> rusqlite::Result<DataRef> {
    Ok(DataRef {
        key: row.get(0)?,
        schema: row.get(1)?,
        count: row.get::<_, i64>(2)? as usize,
        checksum: row.get(3)?,
    })
}

impl DocumentStore for SqliteStore {
    fn put(
        &self,
        ctx: &ActivityContext,
        schema: &str,
        count: usize,
        payload: Vec<u8>,
    ) -> Result<DataRef, StoreError> {
        ctx.ensure_active()?;

        let data_ref = DataRef {
            key: Uuid::new_v4().to_string(),
            schema: schema.to_string(),
            count,
            checksum: checksum(&payload),
        };

        self.conn()?.execute(
            "INSERT INTO refs (key, schema, count, checksum, payload, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                data_ref.key,
                data_ref.schema,
                data_ref.count as i64,
                data_ref.checksum,
                payload,
                Utc::now().to_rfc3339()
            ],
        )?;

        Ok(data_ref)
    }

    fn get(&self, ctx: &ActivityContext, data_ref: &DataRef) -> Result<Vec<u8>, StoreError> {
        ctx.ensure_active()?;

        self.conn()?
            .query_row(
                "SELECT payload FROM refs WHERE key = ?1",
                params![data_ref.key],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(data_ref.key.clone()))
    }
}
