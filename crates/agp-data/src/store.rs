//! Embedded record store backing the editable table.
//!
//! A single SQLite table `editable_data(id, name, age, email)` that is
//! replaced wholesale on save and read back in `id` order.

use std::path::{Path, PathBuf};

use agp_core::error::{AgpError, Result};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS editable_data (
    id INTEGER,
    name TEXT,
    age INTEGER,
    email TEXT
)";

/// One row of the editable table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub email: String,
}

impl Record {
    pub fn new(id: i64, name: impl Into<String>, age: i64, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            email: email.into(),
        }
    }
}

/// Rows shown before anything has been loaded from the store.
pub fn seed_records() -> Vec<Record> {
    vec![
        Record::new(1, "Alice", 30, "alice@example.com"),
        Record::new(2, "Bob", 25, "bob@example.com"),
        Record::new(3, "Charlie", 35, "charlie@example.com"),
    ]
}

fn store_err(err: rusqlite::Error) -> AgpError {
    AgpError::Store(err.to_string())
}

fn row_to_record(row: &Row) -> rusqlite::Result<Record> {
    Ok(Record {
        id: row.get("id")?,
        name: row.get::<_, Option<String>>("name")?.unwrap_or_default(),
        age: row.get::<_, Option<i64>>("age")?.unwrap_or_default(),
        email: row.get::<_, Option<String>>("email")?.unwrap_or_default(),
    })
}

// ── RecordStore ───────────────────────────────────────────────────────────────

pub struct RecordStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl RecordStore {
    /// Open (or create) the database file at `path`, creating parent
    /// directories as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(store_err)?;
        info!("Opened record store at {}", path.display());
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// A private store that lives only as long as the value.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute(CREATE_TABLE, []).map_err(store_err)?;
        Ok(Self { conn, path })
    }

    /// Database file location, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Delete every row and insert `records` in a single transaction.
    ///
    /// Returns the number of rows written.
    pub fn replace_all(&mut self, records: &[Record]) -> Result<usize> {
        let tx = self.conn.transaction().map_err(store_err)?;
        tx.execute(CREATE_TABLE, []).map_err(store_err)?;
        tx.execute("DELETE FROM editable_data", []).map_err(store_err)?;
        {
            let mut stmt = tx
                .prepare("INSERT INTO editable_data (id, name, age, email) VALUES (?1, ?2, ?3, ?4)")
                .map_err(store_err)?;
            for record in records {
                stmt.execute(params![record.id, record.name, record.age, record.email])
                    .map_err(store_err)?;
            }
        }
        tx.commit().map_err(store_err)?;

        debug!("Saved {} records", records.len());
        Ok(records.len())
    }

    /// Every row, ordered by `id`.
    pub fn load_all(&self) -> Result<Vec<Record>> {
        self.conn.execute(CREATE_TABLE, []).map_err(store_err)?;
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, age, email FROM editable_data ORDER BY id")
            .map_err(store_err)?;
        let records = stmt
            .query_map([], row_to_record)
            .map_err(store_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(store_err)?;

        debug!("Loaded {} records", records.len());
        Ok(records)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
