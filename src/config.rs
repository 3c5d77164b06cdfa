//! Scalar-limit policy consumed read-only by the task loop and scheduler.

use std::num::NonZeroUsize;

use crate::fingerprint::Fingerprinter;
use crate::system::System;

/// Builds a fresh [`Fingerprinter`] per scheduler execution.
pub trait FingerprinterFactory {
    /// Creates a fingerprinter. Must never return a value that panics on
    /// use; implementations that want "no fingerprinting" should return
    /// [`crate::fingerprint::NoopFingerprinter`] rather than signalling
    /// failure.
    fn create(&self) -> Box<dyn Fingerprinter>;
}

/// Read-only policy consulted by the task loop and scheduler.
///
/// A default method is provided for every knob except the genuinely
/// required ones, so most domains only override a handful.
pub trait SearchConfig {
    /// If `false` (the default), a contiguous unsuccessful tail at the end
    /// of a generated batch is dropped before merging.
    fn continue_processing_systems_with_failures(&self) -> bool {
        false
    }

    /// If `false`, `RoundScheduler::execute` fails with
    /// [`crate::error::EngineError::NotImplemented`] before running any
    /// rounds — the core's non-deterministic task-assignment mode is
    /// documented but unimplemented.
    fn is_deterministic(&self) -> bool {
        true
    }

    /// Worker count for the round scheduler's pool. `None` defers to
    /// `std::thread::available_parallelism()`.
    fn num_concurrent_tasks(&self) -> Option<NonZeroUsize> {
        None
    }

    /// Global bound on the pending frontier size.
    fn max_num_pending_systems(&self) -> usize;

    /// Per-task bound on the pending frontier size, given the system that
    /// seeded that task. Defaults to [`SearchConfig::max_num_pending_systems`].
    fn max_num_pending_systems_for(&self, _system: &System) -> usize {
        self.max_num_pending_systems()
    }

    /// Bound on how many children a single `generate_children` call may
    /// produce for `system`.
    fn max_num_children_per_generation(&self, system: &System) -> usize;

    /// Bound on how many task-loop iterations a single task may run for
    /// `system` within one round.
    fn max_num_iterations_per_round(&self, system: &System) -> usize;

    /// Post-processing hook applied to the final collected results before
    /// they're returned to the caller. Identity by default.
    fn finalize(&self, results: Vec<System>) -> Vec<System> {
        results
    }

    /// Optional factory for a fingerprinter shared across the whole
    /// execution. `None` means no deduplication.
    ///
    /// Returns a `Sync` trait object because the round scheduler calls
    /// `create()` concurrently from multiple worker threads, one per task.
    fn fingerprinter_factory(&self) -> Option<&(dyn FingerprinterFactory + Sync)> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedConfig;

    impl SearchConfig for FixedConfig {
        fn max_num_pending_systems(&self) -> usize {
            64
        }
        fn max_num_children_per_generation(&self, _system: &System) -> usize {
            8
        }
        fn max_num_iterations_per_round(&self, _system: &System) -> usize {
            16
        }
    }

    #[test]
    fn defaults_are_sane() {
        let cfg = FixedConfig;
        assert!(!cfg.continue_processing_systems_with_failures());
        assert!(cfg.is_deterministic());
        assert!(cfg.num_concurrent_tasks().is_none());
        assert!(cfg.fingerprinter_factory().is_none());
        assert_eq!(cfg.finalize(Vec::new()), Vec::new());
    }
}
