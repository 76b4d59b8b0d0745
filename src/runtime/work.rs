//! The resolution work list.
//!
//! Settling a promise never calls into its continuations recursively.
//! Instead each drained record becomes a job on an explicit LIFO stack that
//! one loop pops until empty. Jobs are pushed in reverse so they pop in
//! registration order, and whatever a job schedules lands on top of the
//! stack, so a child's continuations run before its parent's next sibling.
//! That is exactly the order recursive firing would produce, with the call
//! stack depth held constant no matter how long the chain is.
//!
//! ```text
//! settle(p)  ──► push [r3, r2, r1]         (r1 on top)
//! pop r1     ──► settle(child1) ──► push [c1]
//! pop c1     ──► ...
//! pop r2     ──► ...
//! ```
//!
//! Only one drain is live per engine at a time from the point of view of
//! engine-internal settlement. Foreign callbacks and native promises used
//! as thenables may be invoked from inside a job; when that happens they
//! [`submit`](WorkList::submit) their work to the engine instead of
//! starting another drain, and the running loop picks it up as soon as the
//! current job returns.

use std::cell::{Cell, RefCell};
use std::mem;
use std::rc::Rc;

use crate::error::Result;
use crate::record::Registry;
use crate::runtime::Engine;
use crate::types::Settlement;

/// A deferred unit of firing work.
pub(crate) type Job = Box<dyn FnOnce(&mut WorkList) -> Result<()>>;

/// Per-engine bookkeeping for the drain loops currently on the stack.
#[derive(Default)]
pub(crate) struct DrainState {
    depth: Cell<usize>,
    submitted: RefCell<Vec<Job>>,
}

impl DrainState {
    fn is_active(&self) -> bool {
        self.depth.get() > 0
    }

    fn take_submitted(&self) -> Vec<Job> {
        mem::take(&mut *self.submitted.borrow_mut())
    }
}

/// Marks a drain loop as running for as long as it is alive.
///
/// Dropping the last one also discards submitted jobs that no loop will
/// ever pick up, which only happens when a handler panicked.
struct ActiveDrain {
    engine: Engine,
}

impl ActiveDrain {
    fn enter(engine: &Engine) -> Self {
        let state = engine.drain_state();
        state.depth.set(state.depth.get() + 1);
        Self {
            engine: engine.clone(),
        }
    }
}

impl Drop for ActiveDrain {
    fn drop(&mut self) {
        let state = self.engine.drain_state();
        let depth = state.depth.get().saturating_sub(1);
        state.depth.set(depth);
        if depth == 0 {
            drop(state.take_submitted());
        }
    }
}

/// Explicit stack of pending firing jobs.
pub(crate) struct WorkList {
    jobs: Vec<Job>,
    engine: Engine,
}

impl WorkList {
    /// Runs `seed` against a fresh work list, then drains it.
    ///
    /// Every public entry point that can fire continuations goes through here.
    pub(crate) fn run<R>(engine: &Engine, seed: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        let mut work = Self {
            jobs: Vec::new(),
            engine: engine.clone(),
        };
        let out = seed(&mut work)?;
        work.drain()?;
        Ok(out)
    }

    /// Hands `job` to the drain running on `engine`, or runs it on a fresh
    /// work list when nothing is draining.
    ///
    /// Submitted jobs run after the current job returns and before anything
    /// it had already scheduled, in submission order. Errors they raise
    /// surface from the call that started the running drain.
    pub(crate) fn submit(engine: &Engine, job: Job) -> Result<()> {
        let state = engine.drain_state();
        if state.is_active() {
            state.submitted.borrow_mut().push(job);
            return Ok(());
        }
        Self::run(engine, job)
    }

    /// Schedules every record in `registry` against `outcome`.
    ///
    /// Non-finally records fire before finally records, each group in
    /// registration order.
    pub(crate) fn schedule<T: Clone + 'static>(
        &mut self,
        outcome: Settlement<T>,
        registry: Registry<T>,
    ) {
        if registry.is_empty() {
            return;
        }
        let outcome = Rc::new(outcome);
        let (ordinary, finals): (Vec<_>, Vec<_>) =
            registry.into_iter().partition(|record| !record.is_finally());
        for record in ordinary.into_iter().chain(finals).rev() {
            let outcome = Rc::clone(&outcome);
            self.jobs
                .push(Box::new(move |work: &mut Self| record.fire(&outcome, work)));
        }
        self.engine.recorder().observe_depth(self.jobs.len());
    }

    /// Pops and runs jobs until the stack is empty.
    ///
    /// An escalation aborts the drain: remaining jobs are discarded and the
    /// error is returned to whoever started the run.
    pub(crate) fn drain(&mut self) -> Result<()> {
        let _active = ActiveDrain::enter(&self.engine);
        loop {
            self.adopt_submitted();
            let Some(job) = self.jobs.pop() else {
                return Ok(());
            };
            if let Err(err) = job(self) {
                let discarded = self.jobs.len() + self.engine.drain_state().take_submitted().len();
                self.jobs.clear();
                tracing::debug!(
                    engine = self.engine.name(),
                    discarded,
                    error = %err,
                    "work list aborted"
                );
                return Err(err);
            }
        }
    }

    fn adopt_submitted(&mut self) {
        let submitted = self.engine.drain_state().take_submitted();
        if submitted.is_empty() {
            return;
        }
        self.jobs.extend(submitted.into_iter().rev());
        self.engine.recorder().observe_depth(self.jobs.len());
    }

    /// Number of jobs waiting.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.jobs.len()
    }
}
