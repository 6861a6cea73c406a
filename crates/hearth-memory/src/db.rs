//! Database connection management.
//!
//! Wraps a single rusqlite Connection in a Mutex for thread-safe access.
//! Configures WAL mode on initialization and runs schema migrations.
//! Writes are serialized by the Mutex; WAL keeps concurrent OS-level reads
//! safe.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use crate::error::MemoryError;

/// Schema migrations, applied in order. `user_version` tracks progress.
const MIGRATIONS: &[&str] = &["CREATE TABLE IF NOT EXISTS memories (
        id          TEXT PRIMARY KEY,
        content     TEXT NOT NULL,
        category    TEXT NOT NULL,
        subject     TEXT,
        confidence  REAL NOT NULL,
        created_at  TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_memories_created_at ON memories(created_at);"];

/// Thread-safe SQLite database wrapper.
///
/// The connection is wrapped in a Mutex since rusqlite Connection is not
/// Sync.
#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database at the given path.
    pub fn open(path: &Path) -> Result<Self, MemoryError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MemoryError::Storage(format!("Failed to create data dir: {}", e)))?;
        }

        let conn = Connection::open(path)
            .map_err(|e| MemoryError::Storage(format!("Failed to open database: {}", e)))?;

        configure(&conn)?;
        info!("Memory database opened at {}", path.display());

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(run_migrations)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, MemoryError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| MemoryError::Storage(format!("Failed to open in-memory db: {}", e)))?;
        configure(&conn)?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(run_migrations)?;
        Ok(db)
    }

    /// Execute a closure with a reference to the underlying connection.
    ///
    /// This is the primary way to interact with the database. The mutex is
    /// held for the duration of the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, MemoryError>
    where
        F: FnOnce(&Connection) -> Result<T, MemoryError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| MemoryError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

fn configure(conn: &Connection) -> Result<(), MemoryError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;",
    )
    .map_err(|e| MemoryError::Storage(format!("Failed to set pragmas: {}", e)))?;
    Ok(())
}

fn run_migrations(conn: &Connection) -> Result<(), MemoryError> {
    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(MemoryError::from)?;

    for (i, migration) in MIGRATIONS.iter().enumerate().skip(version as usize) {
        conn.execute_batch(migration)
            .map_err(|e| MemoryError::Storage(format!("Migration {} failed: {}", i + 1, e)))?;
        conn.pragma_update(None, "user_version", i as i64 + 1)
            .map_err(MemoryError::from)?;
        info!("Applied memory schema migration {}", i + 1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_database() {
        let db = Database::in_memory().unwrap();
        let count: i64 = db
            .with_conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))
                    .map_err(MemoryError::from)
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("memory.db");
        let db = Database::open(&path).unwrap();
        drop(db);
        assert!(path.exists());
    }

    #[test]
    fn test_migrations_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.db");
        {
            let _db = Database::open(&path).unwrap();
        }
        // Re-opening must not re-run or fail migrations.
        let db = Database::open(&path).unwrap();
        let version: i64 = db
            .with_conn(|conn| {
                conn.query_row("PRAGMA user_version", [], |row| row.get(0))
                    .map_err(MemoryError::from)
            })
            .unwrap();
        assert_eq!(version, MIGRATIONS.len() as i64);
    }
}
