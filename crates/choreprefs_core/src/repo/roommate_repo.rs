//! Roommate identity repository.
//!
//! # Responsibility
//! - Point lookup by exact (already trimmed) name.
//! - Insert with a storage-generated id, returning the stored row.
//!
//! # Invariants
//! - `roommates.name` is UNIQUE; a duplicate insert is `RepoError::Conflict`.
//! - Lookups return at most one row.

use super::{is_constraint_violation, parse_uuid, RepoError, RepoResult};
use crate::model::roommate::Roommate;
use rusqlite::{params, Connection};
use uuid::Uuid;

/// Repository interface for roommate identities.
pub trait RoommateRepository {
    /// Finds the roommate whose stored name equals `name` exactly.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Roommate>>;
    /// Inserts a new roommate and returns it with its generated id.
    fn insert(&self, name: &str) -> RepoResult<Roommate>;
}

/// SQLite-backed roommate repository.
pub struct SqliteRoommateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRoommateRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RoommateRepository for SqliteRoommateRepository<'_> {
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Roommate>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM roommates WHERE name = ?1;")?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            let id_text: String = row.get("id")?;
            return Ok(Some(Roommate {
                id: parse_uuid(&id_text, "roommates.id")?,
                name: row.get("name")?,
            }));
        }

        Ok(None)
    }

    fn insert(&self, name: &str) -> RepoResult<Roommate> {
        let roommate = Roommate::new(Uuid::new_v4(), name);
        let inserted = self.conn.execute(
            "INSERT INTO roommates (id, name) VALUES (?1, ?2);",
            params![roommate.id.to_string(), roommate.name.as_str()],
        );

        match inserted {
            Ok(_) => Ok(roommate),
            Err(err) if is_constraint_violation(&err) => Err(RepoError::Conflict(
                "roommate name already exists".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }
}
