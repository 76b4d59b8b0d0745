//! Engine counters.
//!
//! The engine is single-threaded, so counters are plain `Cell`s; callers get a
//! copyable [`EngineStats`] snapshot.

use std::cell::Cell;

use serde::Serialize;

/// A snapshot of engine activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Promises created by the engine.
    pub promises_created: u64,
    /// Successful Pending -> settled transitions.
    pub settlements: u64,
    /// Continuation records fired.
    pub continuations_fired: u64,
    /// Records that forwarded an outcome without running a handler.
    pub pass_throughs: u64,
    /// Handler failures turned into rejections.
    pub captured_rejections: u64,
    /// Handler failures re-raised to the caller.
    pub escalations: u64,
    /// Rejections that found no continuation registered.
    pub unhandled_rejections: u64,
    /// Deepest the work list has been.
    pub peak_work_depth: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    promises_created: Cell<u64>,
    settlements: Cell<u64>,
    continuations_fired: Cell<u64>,
    pass_throughs: Cell<u64>,
    captured_rejections: Cell<u64>,
    escalations: Cell<u64>,
    unhandled_rejections: Cell<u64>,
    peak_work_depth: Cell<u64>,
}

fn bump(counter: &Cell<u64>) {
    counter.set(counter.get().saturating_add(1));
}

impl StatsRecorder {
    pub(crate) fn promise_created(&self) {
        bump(&self.promises_created);
    }

    pub(crate) fn settled(&self) {
        bump(&self.settlements);
    }

    pub(crate) fn fired(&self) {
        bump(&self.continuations_fired);
    }

    pub(crate) fn passed_through(&self) {
        bump(&self.pass_throughs);
    }

    pub(crate) fn captured(&self) {
        bump(&self.captured_rejections);
    }

    pub(crate) fn escalated(&self) {
        bump(&self.escalations);
    }

    pub(crate) fn unhandled(&self) {
        bump(&self.unhandled_rejections);
    }

    pub(crate) fn observe_depth(&self, depth: usize) {
        let depth = depth as u64;
        if depth > self.peak_work_depth.get() {
            self.peak_work_depth.set(depth);
        }
    }

    pub(crate) fn snapshot(&self) -> EngineStats {
        EngineStats {
            promises_created: self.promises_created.get(),
            settlements: self.settlements.get(),
            continuations_fired: self.continuations_fired.get(),
            pass_throughs: self.pass_throughs.get(),
            captured_rejections: self.captured_rejections.get(),
            escalations: self.escalations.get(),
            unhandled_rejections: self.unhandled_rejections.get(),
            peak_work_depth: self.peak_work_depth.get(),
        }
    }
}
