//! Score atoms and the group aggregates built from them.

use smallvec::{smallvec, SmallVec};

use crate::score::condition::ConditionResult;

/// Reference constant bounding a [`ScoreAtom`]'s numeric score.
pub const MAX_SCORE: f64 = 100_001.0;

/// Inflection point in the score comparator's `num_results` tie-break:
/// above this average, more results are preferred; below it, fewer.
pub const GOOD_THRESHOLD: f64 = 0.80 * MAX_SCORE;

/// Condition lists are almost always short (a handful of applicability
/// checks, requirements, preferences), so they're inlined up to this
/// length instead of always heap-allocating.
type ConditionList = SmallVec<[ConditionResult; 4]>;

/// One "score atom": the outcome of running a full condition battery
/// against a single candidate, split into three labelled condition lists.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreAtom {
    /// Conditions that determine whether this atom applies at all.
    pub applicability: ConditionList,
    /// Conditions that must all succeed for the atom to be successful.
    pub requirement: ConditionList,
    /// Conditions that only affect the numeric score, not success.
    pub preference: ConditionList,
}

impl ScoreAtom {
    /// Builds an atom from its three condition lists.
    #[must_use]
    pub fn new(
        applicability: impl IntoIterator<Item = ConditionResult>,
        requirement: impl IntoIterator<Item = ConditionResult>,
        preference: impl IntoIterator<Item = ConditionResult>,
    ) -> Self {
        Self {
            applicability: applicability.into_iter().collect(),
            requirement: requirement.into_iter().collect(),
            preference: preference.into_iter().collect(),
        }
    }

    /// Builds a degenerate atom carrying a single condition result as its
    /// sole requirement — the shape produced by the condition-level
    /// `Score::extend` overload.
    #[must_use]
    pub fn from_single_condition(condition: ConditionResult) -> Self {
        Self::new(ConditionList::new(), smallvec![condition], ConditionList::new())
    }

    /// True if every applicability condition succeeded (vacuously true with
    /// no applicability conditions).
    #[must_use]
    pub fn is_applicable(&self) -> bool {
        self.applicability.iter().all(|c| c.is_successful)
    }

    /// True if the atom is applicable and every requirement succeeded.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.is_applicable() && self.requirement.iter().all(|c| c.is_successful)
    }

    /// Numeric score in `[0, MAX_SCORE]`. Requirements dominate preferences
    /// by living in the integer part; preferences only move the fraction.
    #[must_use]
    pub fn score(&self) -> f64 {
        if !self.is_applicable() {
            return 0.0;
        }
        let req_avg = weighted_average(&self.requirement);
        let pref_avg = weighted_average(&self.preference);
        (req_avg * (MAX_SCORE - 1.0)).floor() + pref_avg
    }
}

fn weighted_average(conditions: &[ConditionResult]) -> f64 {
    if conditions.is_empty() {
        return 1.0;
    }
    conditions.iter().map(|c| c.ratio).sum::<f64>() / conditions.len() as f64
}

/// Group-shaped aggregate: the comparable summary used for both a finished
/// [`CommittedGroup`] and the cached "pending data" of an in-flight group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupAgg {
    /// `true` iff `num_failures == 0`.
    pub is_successful: bool,
    /// Count of applicable atoms whose `is_successful()` is `false`.
    pub num_failures: usize,
    /// Mean `score()` over applicable atoms (`0.0` if none).
    pub average_score: f64,
    /// Count of applicable atoms contributing to this aggregate.
    pub num_results: usize,
}

impl GroupAgg {
    /// Computes the aggregate over a slice of atoms, counting only the
    /// applicable ones.
    #[must_use]
    pub fn aggregate(atoms: &[ScoreAtom]) -> Self {
        let applicable: Vec<&ScoreAtom> = atoms.iter().filter(|a| a.is_applicable()).collect();
        let num_results = applicable.len();
        let num_failures = applicable.iter().filter(|a| !a.is_successful()).count();
        let average_score = if num_results == 0 {
            0.0
        } else {
            applicable.iter().map(|a| a.score()).sum::<f64>() / num_results as f64
        };
        Self {
            is_successful: num_failures == 0,
            num_failures,
            average_score,
            num_results,
        }
    }

    /// `true` iff this aggregate's average score meets [`GOOD_THRESHOLD`].
    #[must_use]
    pub fn is_good(&self) -> bool {
        self.average_score >= GOOD_THRESHOLD
    }
}

/// A finished cluster of [`ScoreAtom`]s evaluated together, with its
/// aggregate cached alongside the atoms that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedGroup {
    /// The atoms in this group, in the order they were added.
    pub results: Vec<ScoreAtom>,
    /// `true` iff every applicable atom in the group succeeded.
    pub is_successful: bool,
    /// Mean score across applicable atoms.
    pub average_score: f64,
    /// Count of applicable atoms.
    pub num_results: usize,
    /// Count of applicable, unsuccessful atoms.
    pub num_failures: usize,
}

impl CommittedGroup {
    /// Finalises a group from its atoms, computing the aggregate once.
    #[must_use]
    pub fn new(results: Vec<ScoreAtom>) -> Self {
        let agg = GroupAgg::aggregate(&results);
        Self {
            results,
            is_successful: agg.is_successful,
            average_score: agg.average_score,
            num_results: agg.num_results,
            num_failures: agg.num_failures,
        }
    }

    /// Extracts this group's comparable aggregate.
    #[must_use]
    pub fn agg(&self) -> GroupAgg {
        GroupAgg {
            is_successful: self.is_successful,
            num_failures: self.num_failures,
            average_score: self.average_score,
            num_results: self.num_results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(ratio: f64) -> ConditionResult {
        ConditionResult::new("c", ratio).unwrap()
    }

    #[test]
    fn inapplicable_atom_scores_zero() {
        let atom = ScoreAtom::new(vec![cond(0.0)], vec![cond(1.0)], vec![]);
        assert!(!atom.is_applicable());
        assert_eq!(atom.score(), 0.0);
    }

    #[test]
    fn applicable_atom_score_is_in_range() {
        let atom = ScoreAtom::new(vec![cond(1.0)], vec![cond(1.0)], vec![cond(1.0)]);
        assert!(atom.is_applicable());
        assert!(atom.score() >= 0.0 && atom.score() <= MAX_SCORE);
        // Fully satisfied requirement and preference: integer part is MAX_SCORE-1, plus 1.0.
        assert!((atom.score() - MAX_SCORE).abs() < 1e-9);
    }

    #[test]
    fn requirements_dominate_preferences() {
        let high_req_low_pref = ScoreAtom::new(vec![], vec![cond(1.0)], vec![cond(0.0)]);
        let low_req_high_pref = ScoreAtom::new(vec![], vec![cond(0.5)], vec![cond(1.0)]);
        assert!(high_req_low_pref.score() > low_req_high_pref.score());
    }

    #[test]
    fn group_with_failures_is_unsuccessful() {
        let atoms = vec![
            ScoreAtom::new(vec![], vec![cond(1.0)], vec![]),
            ScoreAtom::new(vec![], vec![cond(0.0)], vec![]),
        ];
        let group = CommittedGroup::new(atoms);
        assert!(!group.is_successful);
        assert_eq!(group.num_failures, 1);
    }

    #[test]
    fn inapplicable_atoms_are_excluded_from_aggregate() {
        let atoms = vec![
            ScoreAtom::new(vec![cond(0.0)], vec![cond(0.0)], vec![]),
            ScoreAtom::new(vec![], vec![cond(1.0)], vec![]),
        ];
        let group = CommittedGroup::new(atoms);
        assert_eq!(group.num_results, 1);
        assert!(group.is_successful);
    }
}
