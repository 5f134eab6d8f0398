//! Chore catalog repository.
//!
//! # Invariants
//! - Catalog reads are ordered by `id ASC` so sessions render a stable list.

use super::{is_constraint_violation, RepoError, RepoResult};
use crate::model::chore::Chore;
use rusqlite::Connection;

/// Read access to the chore catalog plus seeding for tooling.
pub trait ChoreRepository {
    /// Returns every chore, no filters.
    fn list_chores(&self) -> RepoResult<Vec<Chore>>;
    /// Adds one chore to the catalog and returns the stored row.
    fn create_chore(&self, name: &str) -> RepoResult<Chore>;
}

/// SQLite-backed chore catalog.
pub struct SqliteChoreRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteChoreRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ChoreRepository for SqliteChoreRepository<'_> {
    fn list_chores(&self) -> RepoResult<Vec<Chore>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM chores ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut chores = Vec::new();
        while let Some(row) = rows.next()? {
            chores.push(Chore {
                id: row.get("id")?,
                name: row.get("name")?,
            });
        }
        Ok(chores)
    }

    fn create_chore(&self, name: &str) -> RepoResult<Chore> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RepoError::InvalidData(
                "chore name cannot be empty".to_string(),
            ));
        }

        match self
            .conn
            .execute("INSERT INTO chores (name) VALUES (?1);", [trimmed])
        {
            Ok(_) => Ok(Chore::new(self.conn.last_insert_rowid(), trimmed)),
            Err(err) if is_constraint_violation(&err) => Err(RepoError::Conflict(format!(
                "chore `{trimmed}` already exists"
            ))),
            Err(err) => Err(err.into()),
        }
    }
}
