//! Dispatch router
//!
//! Resolves an invocation to the adapter that owns the operation name and
//! converts whatever happens into an `InvocationOutcome`.

mod outcome;
mod router;

pub use outcome::{FailureKind, InvocationFailure, InvocationOutcome, InvocationRequest};
pub use router::{DispatchRouter, DispatchStats};
