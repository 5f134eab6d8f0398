//! Interactive preference-form session.
//!
//! # Responsibility
//! - Decide when a name edit triggers identity resolution.
//! - Hold the form state and apply only results that are still current.
//!
//! # Invariants
//! - Session state is mutated only through `FormSession` methods.
//! - Every resolution request carries the generation it was issued for;
//!   results for any other generation are dropped.
//! - At most one submit is in flight.

pub mod debounce;
pub mod form;

pub use debounce::Debouncer;
pub use form::{
    Applied, FormSession, Notice, ResolveOutcome, ResolveRequest, SessionError, SessionPhase,
    SubmitReceipt, SubmitRequest,
};
