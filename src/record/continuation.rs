//! Records created by the public registration methods.
//!
//! A [`ContinuationRecord`] carries one arm per settlement branch. Each arm
//! either runs a handler, forwards the outcome untouched (pass-through), or
//! does nothing and leaves the child pending forever:
//!
//! | method       | fulfilled arm | rejected arm |
//! |--------------|---------------|--------------|
//! | `success`    | handler       | ignore       |
//! | `catch`      | ignore        | handler      |
//! | `then`       | handler       | pass-through |
//! | `then_with`  | handler       | handler      |
//! | `or_else`    | pass-through  | handler      |
//!
//! A [`FinallyRecord`] runs its callback on either branch and then hands the
//! parent's own outcome to the child.

use crate::error::{Error, Result};
use crate::promise::Promise;
use crate::record::{Child, Observer, Reaction};
use crate::runtime::work::WorkList;
use crate::runtime::Disposition;
use crate::thenable::{Cleanup, HandlerResult, Resolution};
use crate::types::{Reason, Settlement};

pub(crate) type FulfillHandler<T, U> = Box<dyn FnOnce(T) -> HandlerResult<U>>;
pub(crate) type RejectHandler<U> = Box<dyn FnOnce(Reason) -> HandlerResult<U>>;
pub(crate) type FinallyHandler = Box<dyn FnOnce() -> core::result::Result<Cleanup, Reason>>;

/// What to do when the parent fulfills.
pub(crate) enum FulfillArm<T, U> {
    Handle(FulfillHandler<T, U>),
    PassThrough(fn(T) -> U),
    Ignore,
}

/// What to do when the parent rejects.
pub(crate) enum RejectArm<U> {
    Handle(RejectHandler<U>),
    PassThrough,
    Ignore,
}

/// One `success`/`catch`/`then` registration and the child it produces.
pub(crate) struct ContinuationRecord<T, U: 'static> {
    on_fulfilled: FulfillArm<T, U>,
    on_rejected: RejectArm<U>,
    child: Child<U>,
}

impl<T, U: 'static> ContinuationRecord<T, U> {
    pub(crate) fn new(
        on_fulfilled: FulfillArm<T, U>,
        on_rejected: RejectArm<U>,
        child: Promise<U>,
    ) -> Self {
        Self {
            on_fulfilled,
            on_rejected,
            child: Child::new(child),
        }
    }
}

impl<T, U> Reaction<T> for ContinuationRecord<T, U>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    fn fire(self: Box<Self>, outcome: &Settlement<T>, work: &mut WorkList) -> Result<()> {
        let Self {
            on_fulfilled,
            on_rejected,
            child,
        } = *self;
        let stats = child.engine().recorder();
        stats.fired();

        let result = match outcome {
            Settlement::Fulfilled(value) => match on_fulfilled {
                FulfillArm::Handle(handler) => handler(value.clone()),
                FulfillArm::PassThrough(convert) => {
                    stats.passed_through();
                    return child.settle_quietly(work, Settlement::Fulfilled(convert(value.clone())));
                }
                FulfillArm::Ignore => {
                    tracing::trace!(child = %child.id(), "no fulfillment arm, child stays pending");
                    return Ok(());
                }
            },
            Settlement::Rejected(reason) => match on_rejected {
                RejectArm::Handle(handler) => handler(reason.clone()),
                RejectArm::PassThrough => {
                    stats.passed_through();
                    return child.settle_quietly(work, Settlement::Rejected(reason.clone()));
                }
                RejectArm::Ignore => {
                    tracing::trace!(child = %child.id(), "no rejection arm, child stays pending");
                    return Ok(());
                }
            },
        };
        complete(&child, result, work)
    }
}

/// Settles `child` from a handler's result.
///
/// A plain value fulfills at once. A returned promise or foreign thenable is
/// subscribed to and the child adopts its outcome whenever it arrives. A
/// failure is either captured as the child's rejection or escalated,
/// depending on the engine's assertion registry.
pub(crate) fn complete<U: Clone + 'static>(
    child: &Promise<U>,
    result: HandlerResult<U>,
    work: &mut WorkList,
) -> Result<()> {
    match result {
        Ok(Resolution::Value(value)) => child.settle_quietly(work, Settlement::Fulfilled(value)),
        Ok(Resolution::Promise(source)) => {
            tracing::trace!(child = %child.id(), source = %source.id(), "adopting promise");
            let target = child.clone();
            source.register_in(
                work,
                Box::new(Observer::new(move |outcome: &Settlement<U>, work| {
                    target.settle_quietly(work, outcome.clone())
                })),
            );
            Ok(())
        }
        Ok(Resolution::Thenable(thenable)) => {
            tracing::trace!(child = %child.id(), "adopting foreign thenable");
            thenable.subscribe(child.external_resolve(), child.external_reject())
        }
        Err(reason) => fail(child, reason, work),
    }
}

fn fail<U: Clone + 'static>(child: &Promise<U>, reason: Reason, work: &mut WorkList) -> Result<()> {
    let engine = child.engine();
    // An escalation raised by a nested settle call stays an escalation.
    let (reason, disposition) = match reason.downcast_ref::<Error>().and_then(escalated_reason) {
        Some(inner) => (inner, Disposition::Escalate),
        None => {
            let disposition = engine.classify(&reason);
            (reason, disposition)
        }
    };
    match disposition {
        Disposition::Escalate => {
            engine.recorder().escalated();
            tracing::debug!(
                engine = engine.name(),
                child = %child.id(),
                kind = reason.kind().name(),
                "handler failure escalated"
            );
            Err(Error::escalated(reason))
        }
        Disposition::Capture => {
            engine.recorder().captured();
            tracing::debug!(child = %child.id(), reason = %reason, "handler failure captured");
            child.settle_quietly(work, Settlement::Rejected(reason))
        }
    }
}

fn escalated_reason(err: &Error) -> Option<Reason> {
    if err.is_escalated() {
        err.reason().cloned()
    } else {
        None
    }
}

/// One `finally` registration.
pub(crate) struct FinallyRecord<T: 'static> {
    on_settled: FinallyHandler,
    child: Child<T>,
}

impl<T: 'static> FinallyRecord<T> {
    pub(crate) fn new(on_settled: FinallyHandler, child: Promise<T>) -> Self {
        Self {
            on_settled,
            child: Child::new(child),
        }
    }
}

impl<T: Clone + 'static> Reaction<T> for FinallyRecord<T> {
    fn is_finally(&self) -> bool {
        true
    }

    fn fire(self: Box<Self>, outcome: &Settlement<T>, work: &mut WorkList) -> Result<()> {
        let Self { on_settled, child } = *self;
        child.engine().recorder().fired();

        match on_settled() {
            Ok(Cleanup::Done) => child.settle_quietly(work, outcome.clone()),
            Ok(Cleanup::Await(signal)) => {
                tracing::trace!(child = %child.id(), "finally deferred on returned object");
                let outcome = outcome.clone();
                signal.on_finally(Box::new(move || child.settle_external(outcome)))
            }
            Err(reason) => fail(&child, reason, work),
        }
    }
}
