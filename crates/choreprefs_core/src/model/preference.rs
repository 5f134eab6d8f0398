//! Preference score model.
//!
//! # Responsibility
//! - Validate the `1..=5` score range at construction time.
//! - Provide the single default-score policy used by display and save paths.
//!
//! # Invariants
//! - A `Score` value can never hold an out-of-range number.
//! - `default_score()` is the only source of the implicit score.

use crate::model::chore::ChoreId;
use crate::model::roommate::RoommateId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Sparse chore → score mapping held by a session.
///
/// Absent entries mean `default_score()`.
pub type ScoreMap = BTreeMap<ChoreId, Score>;

/// Validation error for out-of-range preference scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreError {
    pub value: i64,
}

impl Display for ScoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "preference score {} is outside {}..={}",
            self.value,
            Score::MIN,
            Score::MAX
        )
    }
}

impl Error for ScoreError {}

/// Preference score in the closed range `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, ScoreError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ScoreError {
                value: i64::from(value),
            })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Score {
    fn default() -> Self {
        default_score()
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Score {
    type Error = ScoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Score {
    type Error = ScoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| ScoreError { value })
            .and_then(Self::new)
    }
}

impl From<Score> for u8 {
    fn from(value: Score) -> Self {
        value.0
    }
}

/// Score assumed for every chore without an explicit choice.
pub fn default_score() -> Score {
    Score(Score::MIN)
}

/// Persisted `(roommate, chore) → score` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub roommate_id: RoommateId,
    pub chore_id: ChoreId,
    pub preference_score: Score,
}
