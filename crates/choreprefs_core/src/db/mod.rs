//! SQLite storage for chores, roommates and preferences.
//!
//! Repositories only receive connections from `open_db`/`open_db_in_memory`,
//! which have the schema at `schema::schema_version()` and every store table
//! present.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::{schema_version, SchemaReport, STORE_TABLES};

pub type DbResult<T> = Result<T, DbError>;

/// Failure to open or prepare the preference store.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Store was written by a newer build.
    SchemaTooNew { found: u32, supported: u32 },
    /// Version says migrated but a store table is gone.
    MissingTable(&'static str),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "preference store error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "preference store uses schema {found}; this build only understands up to {supported}"
            ),
            Self::MissingTable(table) => {
                write!(f, "preference store is missing the `{table}` table")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } | Self::MissingTable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
