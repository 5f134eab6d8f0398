//! Domain model for chore catalogs, roommates and preference scores.
//!
//! # Responsibility
//! - Define the records exchanged between storage, services and the session.
//! - Own the score range and the default-score policy.
//!
//! # Invariants
//! - A roommate name is unique after trimming.
//! - A preference is unique per `(roommate_id, chore_id)`.
//! - Scores are always within `1..=5`.

pub mod chore;
pub mod preference;
pub mod roommate;
