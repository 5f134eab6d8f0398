//! Use-case services over the storage contracts.
//!
//! # Responsibility
//! - Resolve free-text names to durable identities.
//! - Reconcile a local score map with stored preference rows.
//!
//! # Invariants
//! - Services receive their repositories through constructors.
//! - Read failures are `ServiceError::Lookup`; failures on the submit path
//!   are `ServiceError::Write`. "Not found" is never an error.

use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod identity_resolver;
pub mod preference_store;

/// Error taxonomy shared by the identity and preference services.
#[derive(Debug)]
pub enum ServiceError {
    /// Name was empty after trimming where an identity is required.
    EmptyName,
    /// Backend failure while reading.
    Lookup(RepoError),
    /// Backend failure while creating an identity or saving preferences.
    Write(RepoError),
}

impl ServiceError {
    /// Returns whether this failure happened on the write path.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write(_))
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name cannot be empty"),
            Self::Lookup(err) => write!(f, "lookup failed: {err}"),
            Self::Write(err) => write!(f, "write failed: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyName => None,
            Self::Lookup(err) | Self::Write(err) => Some(err),
        }
    }
}
