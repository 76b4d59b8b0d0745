//! Continuation records.
//!
//! A record is what a registration call (`success`, `catch`, `then`,
//! `finally`, or an internal subscription) leaves behind on a pending
//! promise. Records are consumed exactly once: when the promise settles, or
//! immediately if it has already settled.
//!
//! These are internal implementation details and not part of the public API.

pub(crate) mod continuation;
pub(crate) mod observer;
pub(crate) mod teardown;

pub(crate) use continuation::{ContinuationRecord, FinallyRecord, FulfillArm, RejectArm};
pub(crate) use observer::Observer;
pub(crate) use teardown::Child;

use smallvec::SmallVec;

use crate::error::Result;
use crate::runtime::work::WorkList;
use crate::types::Settlement;

/// Something to run against a promise's outcome once it settles.
pub(crate) trait Reaction<T> {
    /// Finally records fire after every other record of the same promise.
    fn is_finally(&self) -> bool {
        false
    }

    /// Consumes the record against `outcome`.
    fn fire(self: Box<Self>, outcome: &Settlement<T>, work: &mut WorkList) -> Result<()>;
}

/// The ordered, append-only continuation list of one promise.
pub(crate) type Registry<T> = SmallVec<[Box<dyn Reaction<T>>; 2]>;
