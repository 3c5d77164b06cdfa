//! k-way merge of already-sorted frontiers into a bounded-length output.

use crate::error::{EngineError, EngineResult};
use crate::system::System;

/// Optional hook to rescore a frontier in place before it participates in
/// a merge. Given a mutable frontier (already belonging to one source),
/// implementations may call [`System::update_score`] on any element; the
/// merge re-sorts the frontier afterward, so implementations need not
/// preserve order themselves.
pub trait RescoreHook {
    /// Rescans and optionally mutates scores in `frontier`.
    fn rescore(&self, frontier: &mut [System]);
}

/// Result of [`bounded_merge`]: the bounded, sorted merge output plus
/// whatever didn't fit.
pub struct MergeOutcome {
    /// The merged frontier, sorted by [`System`] ordering, of length at
    /// most the requested bound.
    pub merged: Vec<System>,
    /// Leftover frontiers (in input order) that didn't make it into
    /// `merged`; frontiers left fully empty are omitted.
    pub removed: Vec<Vec<System>>,
}

/// Merges already-sorted `frontiers` into a single frontier of at most
/// `max_n` elements, selecting always from whichever frontier's head is
/// currently greatest.
///
/// # Errors
///
/// Returns [`EngineError::InvalidArgument`] if `frontiers` is empty.
pub fn bounded_merge(
    mut frontiers: Vec<Vec<System>>,
    max_n: usize,
    rescore_hook: Option<&dyn RescoreHook>,
) -> EngineResult<MergeOutcome> {
    if frontiers.is_empty() {
        return Err(EngineError::invalid_argument(
            "bounded_merge requires at least one input frontier",
        ));
    }

    if let Some(hook) = rescore_hook {
        for frontier in &mut frontiers {
            hook.rescore(frontier);
            frontier.sort_by(|a, b| b.cmp(a));
        }
    }

    debug_assert!(
        frontiers.iter().all(|f| f.windows(2).all(|w| w[0] >= w[1])),
        "bounded_merge requires pre-sorted input frontiers"
    );

    let mut merged = Vec::with_capacity(max_n.min(frontiers.iter().map(Vec::len).sum()));

    while merged.len() < max_n {
        let Some(greatest_idx) = find_greatest(&frontiers) else {
            break;
        };

        let remaining_budget = max_n - merged.len();
        let take = drain_count(&frontiers, greatest_idx, remaining_budget);

        let drained: Vec<System> = frontiers[greatest_idx].drain(0..take).collect();
        merged.extend(drained);
    }

    let removed: Vec<Vec<System>> = frontiers.into_iter().filter(|f| !f.is_empty()).collect();

    debug_assert!(merged.windows(2).all(|w| w[0] >= w[1]), "merge output must be sorted");
    debug_assert!(merged.len() <= max_n);

    Ok(MergeOutcome { merged, removed })
}

/// Index of the frontier whose head element is greatest, or `None` if all
/// frontiers are empty.
fn find_greatest(frontiers: &[Vec<System>]) -> Option<usize> {
    frontiers
        .iter()
        .enumerate()
        .filter(|(_, f)| !f.is_empty())
        .max_by(|(_, a), (_, b)| a[0].cmp(&b[0]))
        .map(|(idx, _)| idx)
}

/// How many elements to drain from the front of `frontiers[greatest_idx]`:
/// stop at the remaining budget, the frontier's own length, or the point
/// where the next-greatest frontier's head would overtake it (found via
/// binary search under System ordering, since the frontier is sorted
/// descending).
fn drain_count(frontiers: &[Vec<System>], greatest_idx: usize, budget: usize) -> usize {
    let frontier = &frontiers[greatest_idx];
    let max_from_size = frontier.len();

    let next_greatest_head = frontiers
        .iter()
        .enumerate()
        .filter(|(idx, f)| *idx != greatest_idx && !f.is_empty())
        .map(|(_, f)| &f[0])
        .max();

    let bound_by_overtake = match next_greatest_head {
        None => max_from_size,
        Some(other_head) => {
            // Largest prefix length `n` such that frontier[n-1] >= other_head,
            // i.e. the frontier stays >= the competitor through the drain.
            let mut lo = 0usize;
            let mut hi = frontier.len();
            while lo < hi {
                let mid = lo + (hi - lo) / 2;
                if &frontier[mid] >= other_head {
                    lo = mid + 1;
                } else {
                    hi = mid;
                }
            }
            lo
        }
    };

    budget.min(max_from_size).min(bound_by_overtake.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::ConditionResult;
    use crate::score::Score;
    use crate::index::Index;
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
        fn generate_children(&self, _max_count: usize) -> EngineResult<Vec<System>> {
            Err(EngineError::invalid_result("leaf"))
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
        fn update_score(&mut self, new_score: Score) -> EngineResult<()> {
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

    fn sorted(mut v: Vec<System>) -> Vec<System> {
        v.sort_by(|a, b| b.cmp(a));
        v
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            bounded_merge(Vec::new(), 10, None),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn merges_two_frontiers_sorted_and_bounded() {
        let a = sorted(vec![leaf(0.9, 0), leaf(0.5, 1)]);
        let b = sorted(vec![leaf(0.8, 2), leaf(0.2, 3)]);
        let outcome = bounded_merge(vec![a, b], 3, None).unwrap();
        assert_eq!(outcome.merged.len(), 3);
        assert!(outcome.merged.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn conserves_total_elements_across_merged_and_removed() {
        let a = sorted(vec![leaf(0.9, 0), leaf(0.5, 1)]);
        let b = sorted(vec![leaf(0.8, 2), leaf(0.2, 3)]);
        let total_in = 4;
        let outcome = bounded_merge(vec![a, b], 2, None).unwrap();
        let total_out: usize = outcome.merged.len() + outcome.removed.iter().map(Vec::len).sum::<usize>();
        assert_eq!(total_out, total_in);
        assert_eq!(outcome.merged.len(), 2);
    }

    #[test]
    fn bound_larger_than_total_returns_everything() {
        let a = sorted(vec![leaf(0.9, 0)]);
        let b = sorted(vec![leaf(0.1, 1)]);
        let outcome = bounded_merge(vec![a, b], 100, None).unwrap();
        assert_eq!(outcome.merged.len(), 2);
        assert!(outcome.removed.is_empty());
    }
}
