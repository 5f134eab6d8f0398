//! Chore catalog record.

use serde::{Deserialize, Serialize};

/// Identifier assigned by storage to each catalog chore.
pub type ChoreId = i64;

/// One item of the household chore catalog.
///
/// The catalog is read once per session and never mutated by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chore {
    pub id: ChoreId,
    pub name: String,
}

impl Chore {
    pub fn new(id: ChoreId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
