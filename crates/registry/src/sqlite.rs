//! SQLite backend for sequence counters.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{params, Connection};

use crate::counter::CounterStore;
use crate::error::CounterStoreError;

/// SQLite-based counter store.
///
/// Stores one row per counter name. The increment is a single upsert
/// statement, so concurrent callers serialize inside the database and no
/// read-modify-write window exists in application code.
/// Uses WAL mode for better concurrent read performance.
pub struct SqliteCounterStore {
    /// Database connection (protected by mutex for thread safety).
    conn: Mutex<Connection>,
    /// Table name (versioned for schema migrations).
    table_name: String,
}

impl SqliteCounterStore {
    /// Database schema version.
    const COUNTER_DB_VERSION: u32 = 1;

    /// Create or open a SQLite counter store at the given path.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or initialized.
    pub fn open(db_path: &Path) -> Result<Self, CounterStoreError> {
        let conn: Connection = Connection::open(db_path).map_err(to_store_error)?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(to_store_error)?;

        // Set busy timeout to handle concurrent access
        conn.busy_timeout(std::time::Duration::from_secs(5))
            .map_err(to_store_error)?;

        let table_name: String = format!("sequence_counters_v{}", Self::COUNTER_DB_VERSION);

        // Create table if it doesn't exist
        let create_sql: String = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                name TEXT NOT NULL PRIMARY KEY,
                sequence INTEGER NOT NULL DEFAULT 0
            )",
            table_name
        );
        conn.execute(&create_sql, []).map_err(to_store_error)?;

        Ok(Self {
            conn: Mutex::new(conn),
            table_name,
        })
    }

    /// Read the current value of a counter without incrementing it.
    ///
    /// # Returns
    /// The last allocated sequence, or 0 for a counter that has never been
    /// incremented.
    pub fn current(&self, name: &str) -> Result<u64, CounterStoreError> {
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row(
            &format!("SELECT sequence FROM {} WHERE name = ?", self.table_name),
            params![name],
            |row| row.get::<_, i64>(0),
        );

        match result {
            Ok(sequence) => Ok(sequence.max(0) as u64),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(to_store_error(e)),
        }
    }

    /// Get the number of counters in the store.
    pub fn count(&self) -> Result<usize, CounterStoreError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", self.table_name),
                [],
                |row| row.get(0),
            )
            .map_err(to_store_error)?;
        Ok(count as usize)
    }
}

#[async_trait]
impl CounterStore for SqliteCounterStore {
    async fn atomic_increment(&self, name: &str) -> Result<u64, CounterStoreError> {
        let conn = self.conn.lock().unwrap();

        // Upsert and return in one statement: find by name, increment,
        // create at 1 if absent. The database serializes concurrent
        // callers, so returned values never repeat.
        let sequence: i64 = conn
            .query_row(
                &format!(
                    "INSERT INTO {} (name, sequence) VALUES (?, 1)
                     ON CONFLICT(name) DO UPDATE SET sequence = sequence + 1
                     RETURNING sequence",
                    self.table_name
                ),
                params![name],
                |row| row.get(0),
            )
            .map_err(to_store_error)?;

        if sequence <= 0 {
            return Err(CounterStoreError::InvalidSequence {
                name: name.to_string(),
                value: sequence,
            });
        }

        Ok(sequence as u64)
    }
}

fn to_store_error(err: rusqlite::Error) -> CounterStoreError {
    CounterStoreError::Unavailable {
        message: err.to_string(),
    }
}
