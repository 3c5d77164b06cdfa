//! Lifecycle event sink. Every `*_begin` hook may cancel the run by
//! returning [`ControlFlow::Break`]; every other hook returns unit.

use std::ops::ControlFlow;

use crate::error::EngineError;
use crate::observability::log_span;
use crate::system::System;

/// `Continue(())` to keep going, `Break(())` to cancel gracefully at the
/// next safe point.
pub type Signal = ControlFlow<(), ()>;

/// Convenience constant for "keep going."
pub const CONTINUE: Signal = ControlFlow::Continue(());
/// Convenience constant for "cancel."
pub const CANCEL: Signal = ControlFlow::Break(());

/// The full round → task → iteration lifecycle event alphabet.
///
/// A `NullObserver` default implementation is provided on the trait itself
/// (all `*_begin` hooks return [`CONTINUE`], everything else no-ops), so
/// implementors only override what they care about.
#[allow(unused_variables)]
pub trait Observer {
    /// Called once per round, before any tasks are dispatched.
    fn on_round_begin(&self, round: usize, pending_len: usize) -> Signal {
        CONTINUE
    }
    /// Called once per round, after it has fully completed.
    fn on_round_end(&self, round: usize) {}
    /// Called before BoundedMerge runs for a round.
    fn on_round_merging_work(&self, round: usize) {}
    /// Called after BoundedMerge completes for a round, with the merged
    /// length and the non-empty leftover frontiers BoundedMerge dropped.
    fn on_round_merged_work(&self, round: usize, merged_len: usize, removed: &[Vec<System>]) {}

    /// Called once per task, before its inner loop begins.
    fn on_task_begin(&self, round: usize, task: usize, num_tasks: usize) -> Signal {
        CONTINUE
    }
    /// Called once per task, after it returns (successfully or not).
    fn on_task_end(&self, round: usize, task: usize, num_tasks: usize) {}
    /// Called when a task's `generate_children`/`commit`/rescore hook
    /// returns an error; the task contributes an empty frontier.
    fn on_task_error(&self, round: usize, task: usize, num_tasks: usize, error: &EngineError) {}

    /// Called at the start of each task-loop iteration.
    fn on_iteration_begin(&self, iteration: usize) -> Signal {
        CONTINUE
    }
    /// Called at the end of each task-loop iteration.
    fn on_iteration_end(&self, iteration: usize) {}
    /// Called immediately before `generate_children`.
    fn on_iteration_generating_work(&self, iteration: usize) {}
    /// Called after `generate_children` returns, with the child count.
    fn on_iteration_generated_work(&self, iteration: usize, num_children: usize) {}
    /// Called immediately before the iteration's BoundedMerge.
    fn on_iteration_merging_work(&self, iteration: usize) {}
    /// Called after the iteration's BoundedMerge, with the merged length
    /// and the non-empty leftover frontiers BoundedMerge dropped.
    fn on_iteration_merged_work(&self, iteration: usize, merged_len: usize, removed: &[Vec<System>]) {}
    /// Called with the contiguous unsuccessful tail removed from a batch.
    /// Returning [`CANCEL`] aborts the task.
    fn on_failed_systems(&self, iteration: usize, failed: &[System]) -> Signal {
        CONTINUE
    }
    /// Called with the successful results collected from a batch's head.
    /// Returning [`CANCEL`] aborts the task.
    fn on_successful_systems(&self, iteration: usize, results: &[System]) -> Signal {
        CONTINUE
    }
}

/// Default observer: every `*_begin` hook continues, every other hook is a
/// no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {}

/// Wraps an inner observer, emitting a `tracing` span (via the
/// [`crate::observability`] macros) around every round/task/iteration and
/// forwarding cancellation decisions unchanged.
#[derive(Debug, Clone, Copy)]
pub struct TracingObserver<O> {
    inner: O,
}

impl<O: Observer> TracingObserver<O> {
    /// Wraps `inner`.
    pub fn new(inner: O) -> Self {
        Self { inner }
    }
}

impl<O: Observer> Observer for TracingObserver<O> {
    fn on_round_begin(&self, round: usize, pending_len: usize) -> Signal {
        let _span = log_span!("round", round, pending_len).entered();
        self.inner.on_round_begin(round, pending_len)
    }

    fn on_round_end(&self, round: usize) {
        self.inner.on_round_end(round);
    }

    fn on_round_merging_work(&self, round: usize) {
        self.inner.on_round_merging_work(round);
    }

    fn on_round_merged_work(&self, round: usize, merged_len: usize, removed: &[Vec<System>]) {
        self.inner.on_round_merged_work(round, merged_len, removed);
    }

    fn on_task_begin(&self, round: usize, task: usize, num_tasks: usize) -> Signal {
        let _span = log_span!("task", round, task).entered();
        self.inner.on_task_begin(round, task, num_tasks)
    }

    fn on_task_end(&self, round: usize, task: usize, num_tasks: usize) {
        self.inner.on_task_end(round, task, num_tasks);
    }

    fn on_task_error(&self, round: usize, task: usize, num_tasks: usize, error: &EngineError) {
        crate::observability::log_warn!("task error: {error}");
        self.inner.on_task_error(round, task, num_tasks, error);
    }

    fn on_iteration_begin(&self, iteration: usize) -> Signal {
        let _span = log_span!("iteration", iteration).entered();
        self.inner.on_iteration_begin(iteration)
    }

    fn on_iteration_end(&self, iteration: usize) {
        self.inner.on_iteration_end(iteration);
    }

    fn on_iteration_generating_work(&self, iteration: usize) {
        self.inner.on_iteration_generating_work(iteration);
    }

    fn on_iteration_generated_work(&self, iteration: usize, num_children: usize) {
        self.inner.on_iteration_generated_work(iteration, num_children);
    }

    fn on_iteration_merging_work(&self, iteration: usize) {
        self.inner.on_iteration_merging_work(iteration);
    }

    fn on_iteration_merged_work(&self, iteration: usize, merged_len: usize, removed: &[Vec<System>]) {
        self.inner.on_iteration_merged_work(iteration, merged_len, removed);
    }

    fn on_failed_systems(&self, iteration: usize, failed: &[System]) -> Signal {
        self.inner.on_failed_systems(iteration, failed)
    }

    fn on_successful_systems(&self, iteration: usize, results: &[System]) -> Signal {
        self.inner.on_successful_systems(iteration, results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_observer_always_continues() {
        let obs = NullObserver;
        assert_eq!(obs.on_round_begin(0, 0), CONTINUE);
        assert_eq!(obs.on_task_begin(0, 0, 1), CONTINUE);
        assert_eq!(obs.on_iteration_begin(0), CONTINUE);
        obs.on_round_end(0);
    }

    struct CancelAfterFirst {
        calls: std::cell::Cell<usize>,
    }

    impl Observer for CancelAfterFirst {
        fn on_round_begin(&self, _round: usize, _pending_len: usize) -> Signal {
            let n = self.calls.get();
            self.calls.set(n + 1);
            if n == 0 {
                CONTINUE
            } else {
                CANCEL
            }
        }
    }

    #[test]
    fn observer_can_cancel_after_first_round() {
        let obs = CancelAfterFirst {
            calls: std::cell::Cell::new(0),
        };
        assert_eq!(obs.on_round_begin(0, 0), CONTINUE);
        assert_eq!(obs.on_round_begin(1, 0), CANCEL);
    }

    #[test]
    fn tracing_observer_forwards_decisions() {
        let obs = TracingObserver::new(CancelAfterFirst {
            calls: std::cell::Cell::new(0),
        });
        assert_eq!(obs.on_round_begin(0, 0), CONTINUE);
        assert_eq!(obs.on_round_begin(1, 0), CANCEL);
    }
}
