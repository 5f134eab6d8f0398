//! Form session state machine.
//!
//! # Responsibility
//! - Track the name field, resolved identity and edited score map.
//! - Issue resolution and submit requests, and apply their results.
//!
//! # Invariants
//! - `generation` increases on every name edit and every issued resolution;
//!   only a result tagged with the current generation mutates state.
//! - Clearing the name clears identity and scores before anything else can
//!   observe them.
//! - A failed submit leaves identity and scores untouched and re-enables
//!   submitting.
//!
//! # Phases
//! `Idle → NameEntered → Resolving → Resolved | Unresolved → Submitting →
//! Submitted | SubmitFailed`. While `Submitting`, name edits and resolution
//! results still update data; the phase they ask for is parked and
//! `finish_submit` lands on it when it leaves the name empty, unresolved or
//! still resolving.

use super::debounce::Debouncer;
use crate::config::SessionConfig;
use crate::model::chore::{Chore, ChoreId};
use crate::model::preference::{default_score, Score, ScoreMap};
use crate::model::roommate::{normalize_name, Roommate};
use crate::repo::chore_repo::ChoreRepository;
use crate::repo::preference_repo::PreferenceRepository;
use crate::repo::roommate_repo::RoommateRepository;
use crate::service::identity_resolver::{IdentityResolver, Resolution};
use crate::service::preference_store::PreferenceStore;
use crate::service::ServiceError;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Name field is empty.
    Idle,
    /// Name edited, resolution not yet requested.
    NameEntered,
    Resolving,
    Resolved,
    Unresolved,
    Submitting,
    Submitted,
    SubmitFailed,
}

/// Rejected session operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    SubmitInFlight,
    EmptyName,
    UnknownChore(ChoreId),
    /// Scores are locked while a submit is in flight.
    NotEditable,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SubmitInFlight => write!(f, "a submit is already in progress"),
            Self::EmptyName => write!(f, "enter a name before submitting"),
            Self::UnknownChore(chore_id) => write!(f, "chore {chore_id} is not in the catalog"),
            Self::NotEditable => write!(f, "scores cannot be edited while saving"),
        }
    }
}

impl Error for SessionError {}

/// User-visible result of the last submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved { name: String, rows_written: usize },
    Failed { message: String },
}

impl Notice {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Saved { name, rows_written } => {
                write!(f, "Preferences saved for {name} ({rows_written} chores).")
            }
            Self::Failed { message } => write!(f, "Could not save preferences: {message}"),
        }
    }
}

/// Identity lookup requested for one generation of the name field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    generation: u64,
    name: String,
}

impl ResolveRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Trimmed name to resolve.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolves the name and loads the matching score map.
    pub fn run<R, P>(
        &self,
        resolver: &IdentityResolver<R>,
        store: &PreferenceStore<P>,
    ) -> ResolveOutcome
    where
        R: RoommateRepository,
        P: PreferenceRepository,
    {
        match resolver.resolve(&self.name) {
            Ok(Resolution::Found(roommate)) => match store.load_preferences(Some(roommate.id)) {
                Ok(preferences) => ResolveOutcome::Found {
                    roommate,
                    preferences,
                },
                Err(err) => ResolveOutcome::Failed(err),
            },
            Ok(Resolution::NotFound | Resolution::EmptyName) => ResolveOutcome::NotFound,
            Err(err) => ResolveOutcome::Failed(err),
        }
    }
}

/// Result of running a `ResolveRequest`.
#[derive(Debug)]
pub enum ResolveOutcome {
    NotFound,
    Found {
        roommate: Roommate,
        preferences: ScoreMap,
    },
    Failed(ServiceError),
}

/// What `apply_resolution` did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Resolved,
    Unresolved,
    /// Backend error; state left as it was.
    LookupFailed,
    /// Outcome belonged to a superseded generation and was dropped.
    Stale,
}

/// Snapshot of the form taken when submit starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    name: String,
    catalog: Vec<Chore>,
    scores: ScoreMap,
}

impl SubmitRequest {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scores(&self) -> &ScoreMap {
        &self.scores
    }

    /// Resolves or creates the identity, then saves the full score set.
    ///
    /// Stops at the first failure; nothing after it runs.
    pub fn run<R, P>(
        &self,
        resolver: &IdentityResolver<R>,
        store: &PreferenceStore<P>,
    ) -> Result<SubmitReceipt, ServiceError>
    where
        R: RoommateRepository,
        P: PreferenceRepository,
    {
        let roommate = resolver.get_or_create(&self.name)?;
        let report = store.save_preferences(roommate.id, &self.catalog, &self.scores)?;
        Ok(SubmitReceipt {
            roommate,
            rows_written: report.rows_written,
        })
    }
}

/// Confirmed result of a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub roommate: Roommate,
    pub rows_written: usize,
}

/// In-memory state of one preference form.
#[derive(Debug)]
pub struct FormSession {
    catalog: Vec<Chore>,
    name: String,
    identity: Option<Roommate>,
    preferences: ScoreMap,
    phase: SessionPhase,
    generation: u64,
    /// Phase requested while `Submitting`.
    parked: Option<SessionPhase>,
    debouncer: Debouncer,
    notice: Option<Notice>,
}

impl FormSession {
    pub fn new(catalog: Vec<Chore>, config: SessionConfig) -> Self {
        Self {
            catalog,
            name: String::new(),
            identity: None,
            preferences: ScoreMap::new(),
            phase: SessionPhase::Idle,
            generation: 0,
            parked: None,
            debouncer: Debouncer::new(config.debounce),
            notice: None,
        }
    }

    /// Starts a session with the catalog read from `chores`.
    ///
    /// A failed catalog read is logged and yields an empty catalog.
    pub fn load<C: ChoreRepository>(chores: &C, config: SessionConfig) -> Self {
        let catalog = match chores.list_chores() {
            Ok(catalog) => {
                debug!(
                    "event=catalog_load module=session status=ok chores={}",
                    catalog.len()
                );
                catalog
            }
            Err(err) => {
                warn!("event=catalog_load module=session status=error error={err}");
                Vec::new()
            }
        };
        Self::new(catalog, config)
    }

    pub fn catalog(&self) -> &[Chore] {
        &self.catalog
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identity(&self) -> Option<&Roommate> {
        self.identity.as_ref()
    }

    /// Explicitly chosen scores; chores without an entry use the default.
    pub fn preferences(&self) -> &ScoreMap {
        &self.preferences
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Score displayed for `chore_id`.
    pub fn score_for(&self, chore_id: ChoreId) -> Score {
        self.preferences
            .get(&chore_id)
            .copied()
            .unwrap_or_else(default_score)
    }

    /// Catalog rows paired with their displayed scores.
    pub fn display_scores(&self) -> Vec<(&Chore, Score)> {
        self.catalog
            .iter()
            .map(|chore| (chore, self.score_for(chore.id)))
            .collect()
    }

    /// Updates the name field at time `now`.
    ///
    /// A blank name returns the form to `Idle` immediately. Any other change
    /// restarts the debounce timer and invalidates in-flight resolutions.
    pub fn set_name(&mut self, raw: impl Into<String>, now: Instant) {
        let raw = raw.into();
        if raw == self.name {
            return;
        }
        self.name = raw;
        self.generation += 1;

        if normalize_name(&self.name).is_none() {
            self.debouncer.cancel();
            self.identity = None;
            self.preferences.clear();
            self.enter(SessionPhase::Idle);
        } else {
            self.debouncer.touch(now);
            self.enter(SessionPhase::NameEntered);
        }
    }

    /// Issues a resolution once the name has been quiet long enough.
    pub fn poll(&mut self, now: Instant) -> Option<ResolveRequest> {
        if self.debouncer.fire(now) {
            self.issue_request()
        } else {
            None
        }
    }

    /// Issues a resolution immediately when the field loses focus.
    ///
    /// Returns `None` when nothing changed since the last resolution.
    pub fn settle(&mut self) -> Option<ResolveRequest> {
        if self.debouncer.is_pending() || self.phase == SessionPhase::NameEntered {
            self.issue_request()
        } else {
            None
        }
    }

    /// Applies a resolution outcome if `request` is still current.
    pub fn apply_resolution(
        &mut self,
        request: ResolveRequest,
        outcome: ResolveOutcome,
    ) -> Applied {
        if request.generation != self.generation {
            debug!(
                "event=resolution_apply module=session status=stale generation={} current={}",
                request.generation, self.generation
            );
            return Applied::Stale;
        }

        match outcome {
            ResolveOutcome::Found {
                roommate,
                preferences,
            } => {
                debug!(
                    "event=resolution_apply module=session status=resolved roommate_id={} scores={}",
                    roommate.id,
                    preferences.len()
                );
                self.identity = Some(roommate);
                self.preferences = preferences;
                self.enter(SessionPhase::Resolved);
                Applied::Resolved
            }
            ResolveOutcome::NotFound => {
                debug!(
                    "event=resolution_apply module=session status=unresolved name_len={}",
                    request.name.chars().count()
                );
                self.identity = None;
                self.preferences.clear();
                self.enter(SessionPhase::Unresolved);
                Applied::Unresolved
            }
            ResolveOutcome::Failed(err) => {
                warn!("event=resolution_apply module=session status=lookup_failed error={err}");
                self.enter(SessionPhase::NameEntered);
                Applied::LookupFailed
            }
        }
    }

    /// Sets the score for one catalog chore.
    pub fn set_score(&mut self, chore_id: ChoreId, score: Score) -> Result<(), SessionError> {
        if self.phase == SessionPhase::Submitting {
            return Err(SessionError::NotEditable);
        }
        if !self.catalog.iter().any(|chore| chore.id == chore_id) {
            return Err(SessionError::UnknownChore(chore_id));
        }
        self.preferences.insert(chore_id, score);
        Ok(())
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        self.phase != SessionPhase::Submitting && normalize_name(&self.name).is_some()
    }

    /// Enters `Submitting` and snapshots what will be saved.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, SessionError> {
        if self.phase == SessionPhase::Submitting {
            return Err(SessionError::SubmitInFlight);
        }
        let name = normalize_name(&self.name)
            .ok_or(SessionError::EmptyName)?
            .to_string();

        self.phase = SessionPhase::Submitting;
        self.parked = None;
        self.notice = None;
        info!(
            "event=submit module=session status=start chores={} explicit_scores={}",
            self.catalog.len(),
            self.preferences.len()
        );
        Ok(SubmitRequest {
            name,
            catalog: self.catalog.clone(),
            scores: self.preferences.clone(),
        })
    }

    /// Leaves `Submitting` with the outcome of `request`.
    pub fn finish_submit(
        &mut self,
        request: SubmitRequest,
        result: Result<SubmitReceipt, ServiceError>,
    ) {
        if self.phase != SessionPhase::Submitting {
            warn!("event=submit module=session status=ignored reason=not_submitting");
            return;
        }

        let parked = self.parked.take();
        let (outcome, parked) = match result {
            Ok(receipt) => {
                info!(
                    "event=submit module=session status=ok roommate_id={} rows={}",
                    receipt.roommate.id, receipt.rows_written
                );
                let adopted = normalize_name(&self.name) == Some(request.name.as_str());
                if adopted {
                    self.identity = Some(receipt.roommate);
                    self.debouncer.cancel();
                    // Lookups issued before the write may report "not found".
                    self.generation += 1;
                }
                self.notice = Some(Notice::Saved {
                    name: request.name,
                    rows_written: receipt.rows_written,
                });
                (SessionPhase::Submitted, if adopted { None } else { parked })
            }
            Err(err) => {
                error!("event=submit module=session status=error error={err}");
                self.notice = Some(Notice::Failed {
                    message: err.to_string(),
                });
                (SessionPhase::SubmitFailed, parked)
            }
        };

        // Empty, unresolved or still-resolving names keep their own phase.
        self.phase = match parked {
            Some(
                phase @ (SessionPhase::Idle | SessionPhase::NameEntered | SessionPhase::Resolving),
            ) => phase,
            _ => outcome,
        };
    }

    fn issue_request(&mut self) -> Option<ResolveRequest> {
        let name = normalize_name(&self.name)?.to_string();
        self.debouncer.cancel();
        self.generation += 1;
        self.enter(SessionPhase::Resolving);
        Some(ResolveRequest {
            generation: self.generation,
            name,
        })
    }

    fn enter(&mut self, phase: SessionPhase) {
        if self.phase == SessionPhase::Submitting {
            self.parked = Some(phase);
        } else {
            self.phase = phase;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Applied, FormSession, ResolveOutcome, SessionError, SessionPhase, SubmitReceipt,
    };
    use crate::config::SessionConfig;
    use crate::model::chore::Chore;
    use crate::model::preference::{Score, ScoreMap};
    use crate::model::roommate::Roommate;
    use crate::repo::RepoError;
    use crate::service::ServiceError;
    use std::time::{Duration, Instant};
    use uuid::Uuid;

    fn session() -> FormSession {
        FormSession::new(
            vec![Chore::new(1, "Dishes"), Chore::new(2, "Trash")],
            SessionConfig::with_debounce(Duration::from_millis(500)),
        )
    }

    #[test]
    fn debounced_poll_issues_one_request_after_quiet_period() {
        let start = Instant::now();
        let mut form = session();
        form.set_name("Al", start);
        form.set_name("Alex", start + Duration::from_millis(200));

        assert!(form.poll(start + Duration::from_millis(600)).is_none());
        let request = form
            .poll(start + Duration::from_millis(700))
            .expect("quiet period elapsed");
        assert_eq!(request.name(), "Alex");
        assert_eq!(form.phase(), SessionPhase::Resolving);
        assert!(form.poll(start + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn settle_resolves_without_waiting_and_only_once() {
        let mut form = session();
        form.set_name("  Alex ", Instant::now());
        let request = form.settle().expect("blur resolves pending name");
        assert_eq!(request.name(), "Alex");
        assert!(form.settle().is_none());
    }

    #[test]
    fn stale_outcome_is_dropped() {
        let now = Instant::now();
        let mut form = session();
        form.set_name("Alex", now);
        let first = form.settle().unwrap();
        form.set_name("Bob", now);
        let second = form.settle().unwrap();

        let alex = Roommate::new(Uuid::new_v4(), "Alex");
        let applied = form.apply_resolution(
            first,
            ResolveOutcome::Found {
                roommate: alex,
                preferences: ScoreMap::new(),
            },
        );
        assert_eq!(applied, Applied::Stale);
        assert!(form.identity().is_none());

        assert_eq!(
            form.apply_resolution(second, ResolveOutcome::NotFound),
            Applied::Unresolved
        );
        assert_eq!(form.phase(), SessionPhase::Unresolved);
    }

    #[test]
    fn scores_default_and_reject_unknown_chores() {
        let mut form = session();
        assert_eq!(form.score_for(2).get(), 1);
        form.set_score(1, Score::new(4).unwrap()).unwrap();
        assert_eq!(form.score_for(1).get(), 4);
        assert_eq!(
            form.set_score(9, Score::new(2).unwrap()),
            Err(SessionError::UnknownChore(9))
        );
    }

    #[test]
    fn submit_requires_name_and_blocks_second_submit() {
        let mut form = session();
        assert!(!form.can_submit());
        assert_eq!(form.begin_submit(), Err(SessionError::EmptyName));

        form.set_name("Alex", Instant::now());
        assert!(form.can_submit());
        let _request = form.begin_submit().unwrap();
        assert!(!form.can_submit());
        assert_eq!(form.begin_submit(), Err(SessionError::SubmitInFlight));
        assert_eq!(
            form.set_score(1, Score::new(3).unwrap()),
            Err(SessionError::NotEditable)
        );
    }

    #[test]
    fn clearing_name_while_submitting_lands_in_idle() {
        let mut form = session();
        form.set_name("Alex", Instant::now());
        let request = form.begin_submit().unwrap();
        form.set_name("", Instant::now());

        let receipt = SubmitReceipt {
            roommate: Roommate::new(Uuid::new_v4(), "Alex"),
            rows_written: 2,
        };
        form.finish_submit(request, Ok(receipt));

        assert_eq!(form.phase(), SessionPhase::Idle);
        assert!(form.identity().is_none());
        assert!(form.notice().is_some());
        assert!(!form.can_submit());
    }

    #[test]
    fn lookup_failed_during_submit_can_be_retried_on_blur() {
        let mut form = session();
        form.set_name("Alex", Instant::now());
        let request = form.begin_submit().unwrap();

        form.set_name("Bob", Instant::now());
        let lookup = form.settle().unwrap();
        let failure = ServiceError::Lookup(RepoError::InvalidData("offline".to_string()));
        assert_eq!(
            form.apply_resolution(lookup, ResolveOutcome::Failed(failure)),
            Applied::LookupFailed
        );
        assert_eq!(form.phase(), SessionPhase::Submitting);

        let write = ServiceError::Write(RepoError::InvalidData("offline".to_string()));
        form.finish_submit(request, Err(write));

        assert_eq!(form.phase(), SessionPhase::NameEntered);
        assert!(form.notice().unwrap().is_error());
        let retry = form.settle().expect("failed lookup is retried");
        assert_eq!(retry.name(), "Bob");
    }

    #[test]
    fn lookup_resolved_during_submit_settles_on_submit_outcome() {
        let mut form = session();
        form.set_name("Alex", Instant::now());
        let request = form.begin_submit().unwrap();

        form.set_name("Bob", Instant::now());
        let lookup = form.settle().unwrap();
        form.apply_resolution(lookup, ResolveOutcome::NotFound);
        let write = ServiceError::Write(RepoError::InvalidData("offline".to_string()));
        form.finish_submit(request, Err(write));

        assert_eq!(form.phase(), SessionPhase::SubmitFailed);
        assert!(form.settle().is_none());
    }
}
