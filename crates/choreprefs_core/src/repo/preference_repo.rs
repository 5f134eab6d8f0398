//! Preference repository with batched upsert.
//!
//! # Responsibility
//! - Read all preference rows for one roommate.
//! - Write a batch of rows keyed on `(roommate_id, chore_id)`.
//!
//! # Invariants
//! - `upsert_batch` runs in one immediate transaction: either every row is
//!   written or none is.
//! - A conflicting key updates `preference_score`; it never duplicates.

use super::{parse_uuid, RepoResult};
use crate::model::preference::{Preference, Score};
use crate::model::roommate::RoommateId;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

const UPSERT_SQL: &str = "INSERT INTO preferences (
        roommate_id,
        chore_id,
        preference_score,
        updated_at
    ) VALUES (?1, ?2, ?3, (strftime('%s', 'now') * 1000))
    ON CONFLICT (roommate_id, chore_id) DO UPDATE SET
        preference_score = excluded.preference_score,
        updated_at = excluded.updated_at;";

/// Repository interface for preference rows.
pub trait PreferenceRepository {
    /// Returns every stored preference of `roommate_id`, ordered by chore id.
    fn list_for_roommate(&self, roommate_id: RoommateId) -> RepoResult<Vec<Preference>>;
    /// Inserts or updates all rows atomically; returns the number written.
    fn upsert_batch(&self, rows: &[Preference]) -> RepoResult<usize>;
}

/// SQLite-backed preference repository.
pub struct SqlitePreferenceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePreferenceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PreferenceRepository for SqlitePreferenceRepository<'_> {
    fn list_for_roommate(&self, roommate_id: RoommateId) -> RepoResult<Vec<Preference>> {
        let mut stmt = self.conn.prepare(
            "SELECT roommate_id, chore_id, preference_score
             FROM preferences
             WHERE roommate_id = ?1
             ORDER BY chore_id ASC;",
        )?;
        let mut rows = stmt.query([roommate_id.to_string()])?;
        let mut preferences = Vec::new();
        while let Some(row) = rows.next()? {
            let roommate_text: String = row.get("roommate_id")?;
            let stored_score: i64 = row.get("preference_score")?;
            preferences.push(Preference {
                roommate_id: parse_uuid(&roommate_text, "preferences.roommate_id")?,
                chore_id: row.get("chore_id")?,
                preference_score: Score::try_from(stored_score)?,
            });
        }
        Ok(preferences)
    }

    fn upsert_batch(&self, rows: &[Preference]) -> RepoResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        // Requires that no other transaction is open on the shared connection.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare_cached(UPSERT_SQL)?;
            for row in rows {
                stmt.execute(params![
                    row.roommate_id.to_string(),
                    row.chore_id,
                    i64::from(row.preference_score.get()),
                ])?;
            }
        }
        tx.commit()?;

        Ok(rows.len())
    }
}
