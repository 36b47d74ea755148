//! Local memo store: connection setup and schema versioning.
//!
//! # Responsibility
//! - Hand out SQLite connections whose `memos` schema is current.
//! - Describe every way opening the store can fail.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - No memo row is touched before the schema is current.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening, migrating or querying the memo store.
#[derive(Debug)]
pub enum DbError {
    /// Directory for the store file could not be created.
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    Sqlite(rusqlite::Error),
    /// One migration step failed; the whole upgrade was rolled back.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// Store was written by a newer client.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateDir { path, source } => write!(
                f,
                "cannot create memo store directory `{}`: {source}",
                path.display()
            ),
            Self::Sqlite(err) => write!(f, "memo store error: {err}"),
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "memo store migration {version} ({name}) failed: {source}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "memo store schema {found} is newer than this client supports ({supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::Migration { source, .. } => Some(source),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
