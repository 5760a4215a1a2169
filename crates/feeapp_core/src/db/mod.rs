//! SQLite storage behind the student store.
//!
//! # Responsibility
//! - Open the database file (or an in-memory one for tests) and bring its
//!   `students` schema up to date.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - No student row is read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Storage failure: the database is unavailable, unwritable or was written
/// by a newer build.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "student storage unavailable: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "student database is at schema version {found}; this build supports up to {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
