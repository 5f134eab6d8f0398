//! Storage contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the three collections consumed by the core: chores, roommates
//!   and preferences.
//! - Keep SQL details behind traits so services can run against any store.
//!
//! # Invariants
//! - Repository APIs report "no row" as `Ok(None)`/empty, never as an error.
//! - Unique-key violations surface as `RepoError::Conflict`.

use crate::db::DbError;
use crate::model::preference::ScoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod chore_repo;
pub mod preference_repo;
pub mod roommate_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all collections.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A unique key (roommate name, chore name) already exists.
    Conflict(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Conflict(message) => write!(f, "conflicting row: {message}"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Conflict(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ScoreError> for RepoError {
    fn from(value: ScoreError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
