//! SQLite-backed document backend.
//! One row per document; multi-document writes share a transaction, so
//! Members and History for a run land together or not at all.

use chrono::Utc;
use parkalloc_core::error::{ParkError, Result};
use parkalloc_core::traits::{DocumentBackend, Entity};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open or create the document database. `:memory:` works for tests.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| ParkError::Storage(format!("DB open error: {e}")))?;

        // WAL lets the CLI read while a daemon writes.
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| ParkError::Storage(format!("DB pragma error: {e}")))?;

        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS documents (
                entity TEXT PRIMARY KEY,        -- 'members', 'requests', 'history'
                body TEXT NOT NULL,             -- whole JSON document
                updated_at TEXT NOT NULL
            );
         ",
            )
            .map_err(|e| ParkError::Storage(format!("Migration: {e}")))?;
        Ok(())
    }

    /// When a document was last written.
    pub fn updated_at(&self, entity: Entity) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT updated_at FROM documents WHERE entity = ?1",
                params![entity.key()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| ParkError::Storage(format!("Query: {e}")))
    }
}

const UPSERT: &str = "INSERT OR REPLACE INTO documents (entity, body, updated_at) VALUES (?1, ?2, ?3)";

impl DocumentBackend for SqliteBackend {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn read(&self, entity: Entity) -> Result<Option<Vec<u8>>> {
        self.conn
            .query_row(
                "SELECT body FROM documents WHERE entity = ?1",
                params![entity.key()],
                |row| {
                    let body = row.get_ref(0)?;
                    body.as_bytes().map(<[u8]>::to_vec).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(0, body.data_type(), Box::new(e))
                    })
                },
            )
            .optional()
            .map_err(|e| ParkError::Storage(format!("Load {entity}: {e}")))
    }

    fn write(&self, entity: Entity, body: &str) -> Result<()> {
        self.conn
            .execute(UPSERT, params![entity.key(), body, Utc::now().to_rfc3339()])
            .map_err(|e| ParkError::Storage(format!("Save {entity}: {e}")))?;
        Ok(())
    }

    fn write_all(&self, docs: &[(Entity, String)]) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| ParkError::Storage(format!("Begin: {e}")))?;
        let now = Utc::now().to_rfc3339();
        for (entity, body) in docs {
            tx.execute(UPSERT, params![entity.key(), body, now])
                .map_err(|e| ParkError::Storage(format!("Save {entity}: {e}")))?;
        }
        tx.commit()
            .map_err(|e| ParkError::Storage(format!("Commit: {e}")))?;
        Ok(())
    }
}
