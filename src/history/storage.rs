//! Download history storage and retrieval using SQLite.
//!
//! Records are insert-only: there is no update or delete path. The store
//! assigns both the id and the creation timestamp.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

/// One completed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRecord {
    /// Store-assigned identifier; increases with every insert
    pub id: i64,
    /// The URL exactly as the user submitted it
    pub source_url: String,
    /// Title derived from the delivered filename
    pub title: String,
    /// uid of the identity that created the record
    pub owner_id: String,
    /// Assigned by the store at insert time
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller when recording a submission.
#[derive(Debug, Clone)]
pub struct NewDownloadRecord {
    pub source_url: String,
    pub title: String,
    pub owner_id: String,
}

/// Persistence seam used by the submission workflow and the history commands.
pub trait DownloadStore {
    /// Inserts a record, stamping id and creation time.
    fn insert(&self, record: NewDownloadRecord) -> Result<DownloadRecord>;

    /// All records owned by `owner_id`, newest first.
    fn list_for_owner(&self, owner_id: &str) -> Result<Vec<DownloadRecord>>;
}

/// SQLite-backed download history.
pub struct HistoryStore {
    connection: Connection,
}

impl HistoryStore {
    /// Opens (or creates) the history database at `database_path`.
    ///
    /// # Errors
    /// - If the database file cannot be opened
    /// - If table creation fails
    pub fn open(database_path: &Path) -> Result<Self> {
        let connection = Connection::open(database_path)?;
        Self::with_connection(connection)
    }

    /// In-memory store, used by tests.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(connection: Connection) -> Result<Self> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS downloads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_url TEXT NOT NULL,
                title TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                created_at_us INTEGER NOT NULL
            )",
            [],
        )?;
        connection.execute(
            "CREATE INDEX IF NOT EXISTS downloads_owner_created
                ON downloads (owner_id, created_at_us DESC, id DESC)",
            [],
        )?;
        Ok(Self { connection })
    }

    /// Inserts with an explicit timestamp. The public path always uses "now".
    fn insert_at(&self, record: NewDownloadRecord, created_at: DateTime<Utc>) -> Result<DownloadRecord> {
        self.connection.execute(
            "INSERT INTO downloads (source_url, title, owner_id, created_at_us)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.source_url,
                record.title,
                record.owner_id,
                created_at.timestamp_micros()
            ],
        )?;
        let id = self.connection.last_insert_rowid();

        tracing::debug!("Download record {} saved to history", id);

        Ok(DownloadRecord {
            id,
            source_url: record.source_url,
            title: record.title,
            owner_id: record.owner_id,
            // round-trip through the stored precision
            created_at: from_micros(created_at.timestamp_micros())
                .map_err(|_| anyhow!("Invalid timestamp"))?,
        })
    }
}

fn from_micros(micros: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Integer,
            format!("Invalid timestamp: {micros}").into(),
        )
    })
}

impl DownloadStore for HistoryStore {
    fn insert(&self, record: NewDownloadRecord) -> Result<DownloadRecord> {
        self.insert_at(record, Utc::now())
    }

    fn list_for_owner(&self, owner_id: &str) -> Result<Vec<DownloadRecord>> {
        let mut statement = self.connection.prepare(
            "SELECT id, source_url, title, owner_id, created_at_us
             FROM downloads
             WHERE owner_id = ?1
             ORDER BY created_at_us DESC, id DESC",
        )?;

        let records = statement
            .query_map(params![owner_id], |row| {
                Ok(DownloadRecord {
                    id: row.get(0)?,
                    source_url: row.get(1)?,
                    title: row.get(2)?,
                    owner_id: row.get(3)?,
                    created_at: from_micros(row.get(4)?)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}
