//! Outer bulk-synchronous round loop: dispatches the top frontier items
//! across a worker pool each round and merges their outputs back together.

mod pool;

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::collector::ResultCollector;
use crate::config::SearchConfig;
use crate::error::{EngineError, EngineResult};
use crate::fingerprint::NoopFingerprinter;
use crate::merge::bounded_merge;
use crate::observability::log_debug;
use crate::observer::{Observer, Signal, CANCEL};
use crate::system::System;
use crate::task_loop::run_task;

/// Adapts a round's shared observer for a single task, OR-ing every
/// cancelling (`CANCEL`-returning) callback into a shared per-round flag.
/// Without this, a task whose `on_iteration_begin`/`on_failed_systems`/
/// `on_successful_systems` signals cancellation would simply finish with
/// whatever partial frontier it had, and the round loop would never learn
/// that cancellation was requested.
struct TaskObserver<'a> {
    inner: &'a (dyn Observer + Sync),
    cancelled: &'a AtomicBool,
}

impl<'a> TaskObserver<'a> {
    fn new(inner: &'a (dyn Observer + Sync), cancelled: &'a AtomicBool) -> Self {
        Self { inner, cancelled }
    }

    fn track(&self, signal: Signal) -> Signal {
        if signal == CANCEL {
            self.cancelled.store(true, Ordering::Release);
        }
        signal
    }
}

impl Observer for TaskObserver<'_> {
    fn on_round_begin(&self, round: usize, pending_len: usize) -> Signal {
        self.track(self.inner.on_round_begin(round, pending_len))
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
        self.track(self.inner.on_task_begin(round, task, num_tasks))
    }

    fn on_task_end(&self, round: usize, task: usize, num_tasks: usize) {
        self.inner.on_task_end(round, task, num_tasks);
    }

    fn on_task_error(&self, round: usize, task: usize, num_tasks: usize, error: &EngineError) {
        self.inner.on_task_error(round, task, num_tasks, error);
    }

    fn on_iteration_begin(&self, iteration: usize) -> Signal {
        self.track(self.inner.on_iteration_begin(iteration))
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
        self.track(self.inner.on_failed_systems(iteration, failed))
    }

    fn on_successful_systems(&self, iteration: usize, results: &[System]) -> Signal {
        self.track(self.inner.on_successful_systems(iteration, results))
    }
}

/// How a [`RoundScheduler::execute`] run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// The pending frontier was exhausted.
    Completed,
    /// The configured deadline passed before the frontier was exhausted.
    Timeout,
    /// An observer callback returned [`crate::observer::CANCEL`].
    ExitViaObserver,
}

/// The outer parallel search loop.
pub struct RoundScheduler;

impl RoundScheduler {
    /// Runs the search to completion (or timeout, or cancellation),
    /// starting from a single initial system and returning its single best
    /// result.
    ///
    /// # Errors
    ///
    /// See [`RoundScheduler::execute`].
    pub fn execute_single(
        config: &(dyn SearchConfig + Sync),
        observer: &(dyn Observer + Sync),
        initial: System,
        timeout: Option<Duration>,
    ) -> EngineResult<(ExecuteOutcome, Vec<System>)> {
        Self::execute(config, observer, vec![initial], 1, timeout)
    }

    /// Runs the search to completion (or timeout, or cancellation), across
    /// one or more initial systems, returning up to `max_results` best
    /// terminal systems (best first).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] if `initials` is empty,
    /// `max_results` is `0`, or `timeout` is `Some(Duration::ZERO)`.
    /// Returns [`EngineError::NotImplemented`] if
    /// `config.is_deterministic()` is `false`.
    pub fn execute(
        config: &(dyn SearchConfig + Sync),
        observer: &(dyn Observer + Sync),
        initials: Vec<System>,
        max_results: usize,
        timeout: Option<Duration>,
    ) -> EngineResult<(ExecuteOutcome, Vec<System>)> {
        if initials.is_empty() {
            return Err(EngineError::invalid_argument("initials must be non-empty"));
        }
        if max_results == 0 {
            return Err(EngineError::invalid_argument("max_results must be non-zero"));
        }
        if timeout.is_some_and(|t| t.is_zero()) {
            return Err(EngineError::invalid_argument("timeout must be non-zero"));
        }
        if !config.is_deterministic() {
            return Err(EngineError::not_implemented(
                "non-deterministic task assignment is not implemented",
            ));
        }

        let deadline = timeout.map(|t| Instant::now() + t);
        let collector = ResultCollector::new(max_results);
        let num_workers = config
            .num_concurrent_tasks()
            .or_else(|| std::thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get);

        let mut pending = initials;
        pending.sort_by(|a, b| b.cmp(a));

        let mut round = 0usize;
        let mut observer_cancelled = false;
        let outcome = loop {
            if observer_cancelled {
                break ExecuteOutcome::ExitViaObserver;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break ExecuteOutcome::Timeout;
            }
            if pending.is_empty() {
                break ExecuteOutcome::Completed;
            }
            if observer.on_round_begin(round, pending.len()) == CANCEL {
                break ExecuteOutcome::ExitViaObserver;
            }

            let num_tasks = num_workers.min(pending.len());
            let batch: Vec<System> = pending.drain(0..num_tasks).collect();
            log_debug!("round {round}: dispatching {num_tasks} tasks");

            let cancelled = AtomicBool::new(false);
            let indexed: Vec<(usize, System)> = batch.into_iter().enumerate().collect();
            let task_frontiers = pool::scoped_parallel(indexed, num_tasks, |(task_idx, initial)| {
                let task_observer = TaskObserver::new(observer, &cancelled);
                if task_observer.on_task_begin(round, task_idx, num_tasks) == CANCEL {
                    task_observer.on_task_end(round, task_idx, num_tasks);
                    return Vec::new();
                }

                let max_pending = config.max_num_pending_systems_for(&initial);
                let max_children = config.max_num_children_per_generation(&initial);
                let max_iterations = config.max_num_iterations_per_round(&initial);
                let continue_on_failures = config.continue_processing_systems_with_failures();

                let mut owned_noop;
                let mut factory_fp;
                let fingerprinter: &mut dyn crate::fingerprint::Fingerprinter =
                    match config.fingerprinter_factory() {
                        Some(factory) => {
                            factory_fp = factory.create();
                            factory_fp.as_mut()
                        }
                        None => {
                            owned_noop = NoopFingerprinter;
                            &mut owned_noop
                        }
                    };

                let result = run_task(
                    initial,
                    fingerprinter,
                    &task_observer,
                    max_pending,
                    max_children,
                    max_iterations,
                    continue_on_failures,
                    None,
                    &collector,
                );
                task_observer.on_task_end(round, task_idx, num_tasks);
                match result {
                    Ok(frontier) => frontier,
                    Err(err) => {
                        task_observer.on_task_error(round, task_idx, num_tasks, &err);
                        Vec::new()
                    }
                }
            });

            if cancelled.load(Ordering::Acquire) {
                observer_cancelled = true;
            }

            let mut frontiers = task_frontiers;
            frontiers.push(std::mem::take(&mut pending));

            if frontiers.iter().all(Vec::is_empty) {
                observer.on_round_end(round);
                round += 1;
                continue;
            }

            for frontier in &mut frontiers {
                frontier.sort_by(|a, b| b.cmp(a));
            }

            observer.on_round_merging_work(round);
            let bound = config.max_num_pending_systems();
            let merge_outcome = bounded_merge(frontiers, bound, None)?;
            pending = merge_outcome.merged;
            observer.on_round_merged_work(round, pending.len(), &merge_outcome.removed);

            observer.on_round_end(round);
            round += 1;
        };

        let results = config.finalize(collector.finish());
        Ok((outcome, results))
    }

    /// Streams results to `observer` rather than collecting them, useful
    /// when the caller wants every terminal system as it's found rather
    /// than only the best `N` at the end. Collected results still flow
    /// through [`Observer::on_successful_systems`]; this entry point
    /// returns only the final outcome.
    ///
    /// # Errors
    ///
    /// See [`RoundScheduler::execute`].
    pub fn execute_streaming(
        config: &(dyn SearchConfig + Sync),
        observer: &(dyn Observer + Sync),
        initial: System,
        timeout: Option<Duration>,
    ) -> EngineResult<ExecuteOutcome> {
        let (outcome, _results) = Self::execute(config, observer, vec![initial], usize::MAX, timeout)?;
        Ok(outcome)
    }
}
