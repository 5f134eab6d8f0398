//! Identity resolution and submit-time creation.
//!
//! # Responsibility
//! - Turn a display name into a stored roommate or a definitive "not found".
//! - Create identities at submit time without inserting duplicate names.
//!
//! # Invariants
//! - Names are trimmed before every lookup and insert.
//! - An empty name never reaches storage.
//! - `get_or_create` always looks up again right before inserting.

use super::ServiceError;
use crate::model::roommate::{normalize_name, Roommate};
use crate::repo::roommate_repo::RoommateRepository;
use crate::repo::RepoError;
use log::{debug, info, warn};
use std::time::Instant;

/// Result of resolving one name field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Input was blank; no lookup was performed.
    EmptyName,
    NotFound,
    Found(Roommate),
}

impl Resolution {
    pub fn roommate(&self) -> Option<&Roommate> {
        match self {
            Self::Found(roommate) => Some(roommate),
            Self::EmptyName | Self::NotFound => None,
        }
    }
}

/// Resolves names against an injected roommate repository.
pub struct IdentityResolver<R: RoommateRepository> {
    repo: R,
}

impl<R: RoommateRepository> IdentityResolver<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Looks up the identity for `name` by exact match on its trimmed form.
    ///
    /// # Errors
    /// - `ServiceError::Lookup` when the backend fails. A missing roommate is
    ///   `Ok(Resolution::NotFound)`.
    pub fn resolve(&self, name: &str) -> Result<Resolution, ServiceError> {
        let Some(trimmed) = normalize_name(name) else {
            debug!("event=identity_resolve module=service status=skipped reason=empty_name");
            return Ok(Resolution::EmptyName);
        };

        let started_at = Instant::now();
        match self.repo.find_by_name(trimmed) {
            Ok(Some(roommate)) => {
                debug!(
                    "event=identity_resolve module=service status=found name_len={} duration_ms={}",
                    trimmed.chars().count(),
                    started_at.elapsed().as_millis()
                );
                Ok(Resolution::Found(roommate))
            }
            Ok(None) => {
                debug!(
                    "event=identity_resolve module=service status=not_found name_len={} duration_ms={}",
                    trimmed.chars().count(),
                    started_at.elapsed().as_millis()
                );
                Ok(Resolution::NotFound)
            }
            Err(err) => {
                warn!(
                    "event=identity_resolve module=service status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(ServiceError::Lookup(err))
            }
        }
    }

    /// Returns the identity stored under `name`, inserting it when absent.
    ///
    /// The existence check runs again here even when the caller resolved the
    /// name earlier, since that result may be stale. If another writer
    /// inserts the same name between the check and the insert, the winner's
    /// row is returned.
    ///
    /// # Errors
    /// - `ServiceError::EmptyName` for blank input.
    /// - `ServiceError::Write` for any backend failure.
    pub fn get_or_create(&self, name: &str) -> Result<Roommate, ServiceError> {
        let trimmed = normalize_name(name).ok_or(ServiceError::EmptyName)?;
        let started_at = Instant::now();

        if let Some(existing) = self.repo.find_by_name(trimmed).map_err(ServiceError::Write)? {
            debug!(
                "event=identity_create module=service status=reused duration_ms={}",
                started_at.elapsed().as_millis()
            );
            return Ok(existing);
        }

        let created = match self.repo.insert(trimmed) {
            Ok(created) => created,
            Err(RepoError::Conflict(_)) => self
                .repo
                .find_by_name(trimmed)
                .map_err(ServiceError::Write)?
                .ok_or_else(|| {
                    ServiceError::Write(RepoError::InvalidData(
                        "roommate conflict reported but no row found".to_string(),
                    ))
                })?,
            Err(err) => {
                warn!(
                    "event=identity_create module=service status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                return Err(ServiceError::Write(err));
            }
        };

        info!(
            "event=identity_create module=service status=ok roommate_id={} duration_ms={}",
            created.id,
            started_at.elapsed().as_millis()
        );
        Ok(created)
    }
}
