//! Preference load/save adapter.
//!
//! # Responsibility
//! - Load the stored score map of one roommate.
//! - Save a full score set for the whole catalog with one batched upsert.
//!
//! # Invariants
//! - A save writes exactly one row per catalog chore.
//! - Chores missing from the local map are saved with `default_score()`.
//! - Local entries for chores outside the catalog are ignored.

use super::ServiceError;
use crate::model::chore::Chore;
use crate::model::preference::{default_score, Preference, ScoreMap};
use crate::model::roommate::RoommateId;
use crate::repo::preference_repo::PreferenceRepository;
use log::{debug, error, info, warn};
use std::time::Instant;

/// Outcome of a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    pub roommate_id: RoommateId,
    pub rows_written: usize,
}

/// Adapter between session score maps and stored preference rows.
pub struct PreferenceStore<P: PreferenceRepository> {
    repo: P,
}

impl<P: PreferenceRepository> PreferenceStore<P> {
    pub fn new(repo: P) -> Self {
        Self { repo }
    }

    /// Loads the score map for `roommate_id`.
    ///
    /// Returns an empty map when there is no identity or no stored rows.
    pub fn load_preferences(
        &self,
        roommate_id: Option<RoommateId>,
    ) -> Result<ScoreMap, ServiceError> {
        let Some(roommate_id) = roommate_id else {
            return Ok(ScoreMap::new());
        };

        let started_at = Instant::now();
        let rows = self.repo.list_for_roommate(roommate_id).map_err(|err| {
            warn!(
                "event=preferences_load module=service status=error roommate_id={roommate_id} error={err}"
            );
            ServiceError::Lookup(err)
        })?;

        let scores: ScoreMap = rows
            .into_iter()
            .map(|row| (row.chore_id, row.preference_score))
            .collect();
        debug!(
            "event=preferences_load module=service status=ok roommate_id={roommate_id} rows={} duration_ms={}",
            scores.len(),
            started_at.elapsed().as_millis()
        );
        Ok(scores)
    }

    /// Upserts one row per catalog chore for `roommate_id`.
    ///
    /// # Errors
    /// - `ServiceError::Write` when the batch fails; nothing is committed.
    pub fn save_preferences(
        &self,
        roommate_id: RoommateId,
        catalog: &[Chore],
        local: &ScoreMap,
    ) -> Result<SaveReport, ServiceError> {
        let started_at = Instant::now();
        let rows = build_rows(roommate_id, catalog, local);

        match self.repo.upsert_batch(&rows) {
            Ok(rows_written) => {
                info!(
                    "event=preferences_save module=service status=ok roommate_id={roommate_id} rows={rows_written} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(SaveReport {
                    roommate_id,
                    rows_written,
                })
            }
            Err(err) => {
                error!(
                    "event=preferences_save module=service status=error roommate_id={roommate_id} rows={} duration_ms={} error={err}",
                    rows.len(),
                    started_at.elapsed().as_millis()
                );
                Err(ServiceError::Write(err))
            }
        }
    }
}

/// Builds the full row set saved for one roommate.
pub fn build_rows(roommate_id: RoommateId, catalog: &[Chore], local: &ScoreMap) -> Vec<Preference> {
    catalog
        .iter()
        .map(|chore| Preference {
            roommate_id,
            chore_id: chore.id,
            preference_score: local.get(&chore.id).copied().unwrap_or_else(default_score),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::build_rows;
    use crate::model::chore::Chore;
    use crate::model::preference::{Score, ScoreMap};
    use uuid::Uuid;

    #[test]
    fn build_rows_covers_catalog_and_fills_defaults() {
        let roommate_id = Uuid::new_v4();
        let catalog = vec![Chore::new(1, "Dishes"), Chore::new(2, "Trash")];
        let mut local = ScoreMap::new();
        local.insert(1, Score::new(4).unwrap());

        let rows = build_rows(roommate_id, &catalog, &local);
        let pairs: Vec<(i64, u8)> = rows
            .iter()
            .map(|row| (row.chore_id, row.preference_score.get()))
            .collect();
        assert_eq!(pairs, vec![(1, 4), (2, 1)]);
        assert!(rows.iter().all(|row| row.roommate_id == roommate_id));
    }

    #[test]
    fn build_rows_ignores_scores_outside_catalog() {
        let catalog = vec![Chore::new(1, "Dishes")];
        let mut local = ScoreMap::new();
        local.insert(99, Score::new(5).unwrap());

        let rows = build_rows(Uuid::new_v4(), &catalog, &local);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].chore_id, 1);
        assert_eq!(rows[0].preference_score.get(), 1);
    }

    #[test]
    fn build_rows_for_empty_catalog_is_empty() {
        let mut local = ScoreMap::new();
        local.insert(1, Score::new(3).unwrap());
        assert!(build_rows(Uuid::new_v4(), &[], &local).is_empty());
    }
}
