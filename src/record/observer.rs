//! Internal subscriptions.
//!
//! Promise adoption, the combinators, and the [`Thenable`](crate::Thenable)
//! and [`HasFinally`](crate::HasFinally) impls for [`Promise`](crate::Promise)
//! all need to run engine code when a promise settles without creating a
//! user-visible child. They register an [`Observer`], which fires inside the
//! same work list as the settlement that triggers it.

use crate::error::Result;
use crate::record::Reaction;
use crate::runtime::work::WorkList;
use crate::types::Settlement;

type ObserveFn<T> = Box<dyn FnOnce(&Settlement<T>, &mut WorkList) -> Result<()>>;

/// A closure run against a promise's outcome.
pub(crate) struct Observer<T> {
    on_settled: ObserveFn<T>,
}

impl<T> Observer<T> {
    pub(crate) fn new<F>(on_settled: F) -> Self
    where
        F: FnOnce(&Settlement<T>, &mut WorkList) -> Result<()> + 'static,
    {
        Self {
            on_settled: Box::new(on_settled),
        }
    }
}

impl<T> Reaction<T> for Observer<T> {
    fn fire(self: Box<Self>, outcome: &Settlement<T>, work: &mut WorkList) -> Result<()> {
        (self.on_settled)(outcome, work)
    }
}
