//! Roommate identity record.
//!
//! # Invariants
//! - `id` is generated by storage on insert and never reused.
//! - `name` is stored trimmed; lookups compare the trimmed form exactly.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a household member.
pub type RoommateId = Uuid;

/// Durable identity resolved from a free-text display name.
///
/// Two values describe the same roommate when their `id`s are equal; callers
/// must not rely on receiving the same instance twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roommate {
    pub id: RoommateId,
    pub name: String,
}

impl Roommate {
    pub fn new(id: RoommateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Returns whether `other` refers to the same stored identity.
    pub fn same_identity(&self, other: &Roommate) -> bool {
        self.id == other.id
    }
}

/// Normalizes a raw name field value for lookup and insert.
///
/// Returns `None` for empty or whitespace-only input.
pub fn normalize_name(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
