//! SQLite-backed record of packages that have already been reported
//!
//! Acts as the dedup gate: a (name, version) pair is reported at most once.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

#[cfg(test)]
use mockall::automock;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::version::error::StoreError;

/// Trait for the persistence side of the dedup gate
#[cfg_attr(test, automock)]
pub trait PackageStore: Send + Sync + 'static {
    /// Check whether a (name, version) pair was already recorded
    fn exists(&self, name: &str, version: &str) -> Result<bool, StoreError>;

    /// Record a (name, version) pair.
    ///
    /// Returns `false` when the pair was already present; nothing is written then.
    fn save(
        &self,
        name: &str,
        version: &str,
        published_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(db_path: &Path) -> Result<Self, StoreError> {
        info!("Initializing package database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self {
            conn: Mutex::new(conn),
        };

        store.create_schema()?;
        info!("Package database initialized successfully");

        Ok(store)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn create_schema(&self) -> Result<(), StoreError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS npm_packages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                version TEXT NOT NULL,
                published_at TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                UNIQUE(name, version)
            )
            "#,
            [],
        )?;

        debug!("Database schema created successfully");
        Ok(())
    }

    /// Number of recorded versions for a package
    pub fn count_versions(&self, name: &str) -> Result<usize, StoreError> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM npm_packages WHERE name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl PackageStore for SqliteStore {
    fn exists(&self, name: &str, version: &str) -> Result<bool, StoreError> {
        let conn = self.lock_conn()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM npm_packages WHERE name = ?1 AND version = ?2)",
            (name, version),
            |row| row.get(0),
        )?;

        Ok(exists)
    }

    fn save(
        &self,
        name: &str,
        version: &str,
        published_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let conn = self.lock_conn()?;

        // INSERT OR IGNORE with UNIQUE(name, version) keeps concurrent consumers idempotent
        let rows_inserted = conn.execute(
            r#"
            INSERT OR IGNORE INTO npm_packages (name, version, published_at, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            (
                name,
                version,
                published_at.to_rfc3339(),
                Utc::now().timestamp_millis(),
            ),
        )?;

        debug!("Saved {}@{} (inserted: {})", name, version, rows_inserted);
        Ok(rows_inserted > 0)
    }
}
