//! Thread-safe aggregation of the best `N` terminal systems.

use parking_lot::Mutex;

use crate::system::System;

/// Wraps a target count and a mutex-guarded list of collected results.
///
/// `on_iteration_result_system` is the sole write path; it is safe to call
/// concurrently from multiple task threads within a round.
pub struct ResultCollector {
    max_results: usize,
    results: Mutex<Vec<System>>,
}

impl ResultCollector {
    /// Builds a collector targeting up to `max_results` systems.
    #[must_use]
    pub fn new(max_results: usize) -> Self {
        Self {
            max_results,
            results: Mutex::new(Vec::new()),
        }
    }

    /// Appends `result`, returning `true` if the caller should keep
    /// emitting further results (fewer than `max_results` collected so
    /// far, counted before this push).
    pub fn on_iteration_result_system(&self, result: System) -> bool {
        let mut guard = self.results.lock();
        let should_continue = guard.len() < self.max_results;
        guard.push(result);
        should_continue
    }

    /// Number of results collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    /// `true` if no results have been collected yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.lock().is_empty()
    }

    /// Drains the collected results, sorted best-first by System ordering
    /// and truncated to `max_results`.
    pub fn finish(self) -> Vec<System> {
        let mut results = self.results.into_inner();
        results.sort_by(|a, b| b.cmp(a));
        results.truncate(self.max_results);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Index;
    use crate::score::{ConditionResult, Score};
    use std::fmt;

    #[derive(Debug)]
    struct Leaf {
        score: Score,
        index: Index,
    }

    impl fmt::Display for Leaf {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "leaf")
        }
    }

    impl crate::system::Working for Leaf {
        fn generate_children(&self, _max_count: usize) -> crate::error::EngineResult<Vec<System>> {
            Err(crate::error::EngineError::invalid_result("leaf"))
        }
        fn is_complete(&self) -> bool {
            true
        }
    }

    impl crate::system::WorkingConcreteSystem for Leaf {
        fn score(&self) -> &Score {
            &self.score
        }
        fn index(&self) -> &Index {
            &self.index
        }
        fn update_score(&mut self, new_score: Score) -> crate::error::EngineResult<()> {
            self.score = new_score;
            Ok(())
        }
    }

    fn leaf(ratio: f64, idx: u64) -> System {
        let score = Score::new()
            .extend_condition(ConditionResult::new("c", ratio).unwrap(), true)
            .unwrap()
            .commit()
            .unwrap();
        let index = Index::new().extend(idx).unwrap().commit().unwrap();
        System::WorkingConcrete(Box::new(Leaf { score, index }))
    }

    #[test]
    fn signals_stop_once_target_reached() {
        let collector = ResultCollector::new(2);
        assert!(collector.on_iteration_result_system(leaf(0.9, 0)));
        assert!(!collector.on_iteration_result_system(leaf(0.8, 1)));
        assert!(!collector.on_iteration_result_system(leaf(0.1, 2)));
        assert_eq!(collector.len(), 3);
    }

    #[test]
    fn finish_sorts_best_first_and_truncates() {
        let collector = ResultCollector::new(2);
        collector.on_iteration_result_system(leaf(0.1, 0));
        collector.on_iteration_result_system(leaf(0.9, 1));
        collector.on_iteration_result_system(leaf(0.5, 2));
        let finished = collector.finish();
        assert_eq!(finished.len(), 2);
        assert!(finished[0] >= finished[1]);
    }
}
