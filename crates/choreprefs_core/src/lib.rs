//! Core logic for household chore preferences.
//! This crate is the single source of truth for identity and preference
//! invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use config::{SessionConfig, DEFAULT_DEBOUNCE};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::chore::{Chore, ChoreId};
pub use model::preference::{default_score, Preference, Score, ScoreError, ScoreMap};
pub use model::roommate::{normalize_name, Roommate, RoommateId};
pub use repo::chore_repo::{ChoreRepository, SqliteChoreRepository};
pub use repo::preference_repo::{PreferenceRepository, SqlitePreferenceRepository};
pub use repo::roommate_repo::{RoommateRepository, SqliteRoommateRepository};
pub use repo::{RepoError, RepoResult};
pub use service::identity_resolver::{IdentityResolver, Resolution};
pub use service::preference_store::{build_rows, PreferenceStore, SaveReport};
pub use service::ServiceError;
pub use session::{
    Applied, Debouncer, FormSession, Notice, ResolveOutcome, ResolveRequest, SessionError,
    SessionPhase, SubmitReceipt, SubmitRequest,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
