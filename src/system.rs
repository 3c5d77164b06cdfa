//! The closed system hierarchy: `(score, index, kind, completion)` plus the
//! domain hooks a user implements to describe a search space.
//!
//! `System` is a sealed enum rather than a trait object hierarchy: the four
//! observable variants (working/result × calculated/concrete) are exactly
//! the cross product the completion invariant allows, so matching on a
//! closed enum lets the compiler enforce exhaustiveness at every call site
//! that inspects a system's shape.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{EngineError, EngineResult};
use crate::index::Index;
use crate::score::Score;

/// A system still being searched: not yet known to be terminal.
///
/// Implemented by domain code. `generate_children` is the sole place new
/// systems enter the search.
pub trait Working: fmt::Debug + Send {
    /// Expands this system into at most `max_count` children, each either
    /// another working system or a result. Must return a non-empty
    /// sequence when called (an exhausted working system should report
    /// [`Working::is_complete`] instead of generating zero children).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidResult`] if this implementation
    /// produces an empty sequence or more than `max_count` entries.
    fn generate_children(&self, max_count: usize) -> EngineResult<Vec<System>>;

    /// `true` if this working system has no further children to generate;
    /// such systems are retired rather than re-queued after expansion.
    fn is_complete(&self) -> bool;
}

/// A working system still missing its suffix-bearing score/index commit.
pub trait CalculatedWorking: fmt::Debug + Send {
    /// Forwards the pending score/index to a domain constructor, producing
    /// a fresh concrete working system.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidResult`] if the domain constructor
    /// cannot produce a system (e.g. the suffix data is invalid).
    fn commit_impl(&self, score: Score, index: Index) -> EngineResult<Box<dyn WorkingConcreteSystem>>;
}

/// A result system still missing its suffix-bearing score/index commit.
pub trait CalculatedResult: fmt::Debug + Send {
    /// Forwards the pending score/index to a domain constructor, producing
    /// a fresh concrete result system.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidResult`] if the domain constructor
    /// cannot produce a system.
    fn commit_impl(&self, score: Score, index: Index) -> EngineResult<Box<dyn ResultConcreteSystem>>;
}

/// Object-safe union of [`Working`] with the common system accessors,
/// implemented by domain concrete-working types.
pub trait WorkingConcreteSystem: Working + fmt::Display + Send {
    /// This system's current score.
    fn score(&self) -> &Score;
    /// This system's ordering tiebreaker.
    fn index(&self) -> &Index;
    /// Replaces this system's score, provided the completion invariant
    /// still holds afterward.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOperation`] if `new_score` has a
    /// pending suffix (a concrete system's score must be committed).
    fn update_score(&mut self, new_score: Score) -> EngineResult<()>;
}

/// Domain concrete-result counterpart of [`WorkingConcreteSystem`].
pub trait ResultConcreteSystem: fmt::Display + Send {
    /// This system's current score.
    fn score(&self) -> &Score;
    /// This system's ordering tiebreaker.
    fn index(&self) -> &Index;
}

/// Kind axis of a system: whether it is still being searched or is a
/// terminal result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SystemKind {
    /// Still eligible for expansion.
    Working,
    /// Terminal: no further children.
    Result,
}

/// Completion axis of a system: whether its score/index still carry a
/// pending suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Completion {
    /// Score and index both have a pending suffix; must be `commit`ted
    /// before it can be expanded or finalised.
    Calculated,
    /// Score and index are both fully committed.
    Concrete,
}

/// The sealed system hierarchy: one of the four kind × completion
/// combinations the invariant allows.
#[derive(Debug)]
pub enum System {
    /// Ready to expand.
    WorkingConcrete(Box<dyn WorkingConcreteSystem>),
    /// A child emitted by a parent but not yet realised; `commit` promotes
    /// it to `WorkingConcrete`.
    WorkingCalculated(Box<dyn CalculatedWorking>, Score, Index),
    /// A child that completes the search, not yet realised; `commit`
    /// promotes it to `ResultConcrete`.
    ResultCalculated(Box<dyn CalculatedResult>, Score, Index),
    /// A terminal result.
    ResultConcrete(Box<dyn ResultConcreteSystem>),
}

impl System {
    /// This system's kind axis.
    #[must_use]
    pub fn kind(&self) -> SystemKind {
        match self {
            Self::WorkingConcrete(_) | Self::WorkingCalculated(..) => SystemKind::Working,
            Self::ResultCalculated(..) | Self::ResultConcrete(_) => SystemKind::Result,
        }
    }

    /// This system's completion axis.
    #[must_use]
    pub fn completion(&self) -> Completion {
        match self {
            Self::WorkingConcrete(_) | Self::ResultConcrete(_) => Completion::Concrete,
            Self::WorkingCalculated(..) | Self::ResultCalculated(..) => Completion::Calculated,
        }
    }

    /// This system's current score, regardless of variant.
    #[must_use]
    pub fn get_score(&self) -> &Score {
        match self {
            Self::WorkingConcrete(s) => s.score(),
            Self::ResultConcrete(s) => s.score(),
            Self::WorkingCalculated(_, score, _) | Self::ResultCalculated(_, score, _) => score,
        }
    }

    /// This system's index, regardless of variant.
    #[must_use]
    pub fn get_index(&self) -> &Index {
        match self {
            Self::WorkingConcrete(s) => s.index(),
            Self::ResultConcrete(s) => s.index(),
            Self::WorkingCalculated(_, _, index) | Self::ResultCalculated(_, _, index) => index,
        }
    }

    /// `true` for either `ResultConcrete` or `ResultCalculated`.
    #[must_use]
    pub fn is_result(&self) -> bool {
        self.kind() == SystemKind::Result
    }

    /// `true` for `WorkingConcrete` or `ResultConcrete`.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        self.completion() == Completion::Concrete
    }

    /// Replaces this system's score. Only meaningful on concrete working
    /// systems (the only variant whose score can be mutated in place
    /// without reconstructing the system); other variants fail.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOperation`] if this system is not a
    /// `WorkingConcrete`, or if `new_score` carries a pending suffix.
    pub fn update_score(&mut self, new_score: Score) -> EngineResult<()> {
        if new_score.has_suffix() {
            return Err(EngineError::invalid_operation(
                "update_score requires a fully committed score",
            ));
        }
        match self {
            Self::WorkingConcrete(s) => s.update_score(new_score),
            _ => Err(EngineError::invalid_operation(
                "update_score is only supported on WorkingConcrete systems",
            )),
        }
    }

    /// Promotes a `Calculated` variant into its `Concrete` counterpart by
    /// forwarding the pending score/index to the domain's commit hook.
    /// A no-op (returns a clone of the discriminant) on already-concrete
    /// variants is not provided: callers are expected to check
    /// [`System::completion`] first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOperation`] if called on a concrete
    /// variant, or propagates [`EngineError::InvalidResult`] from the
    /// domain commit hook.
    pub fn commit(self) -> EngineResult<Self> {
        match self {
            Self::WorkingCalculated(calc, score, index) => {
                let committed_score = score.commit().map_err(|_| {
                    EngineError::invalid_operation("WorkingCalculated score has no pending suffix")
                })?;
                let committed_index = index.commit().map_err(|_| {
                    EngineError::invalid_operation("WorkingCalculated index has no pending suffix")
                })?;
                let concrete = calc.commit_impl(committed_score, committed_index)?;
                Ok(Self::WorkingConcrete(concrete))
            }
            Self::ResultCalculated(calc, score, index) => {
                let committed_score = score.commit().map_err(|_| {
                    EngineError::invalid_operation("ResultCalculated score has no pending suffix")
                })?;
                let committed_index = index.commit().map_err(|_| {
                    EngineError::invalid_operation("ResultCalculated index has no pending suffix")
                })?;
                let concrete = calc.commit_impl(committed_score, committed_index)?;
                Ok(Self::ResultConcrete(concrete))
            }
            Self::WorkingConcrete(_) | Self::ResultConcrete(_) => Err(
                EngineError::invalid_operation("commit called on an already-concrete system"),
            ),
        }
    }

    /// `true` if the underlying working system reports no further children.
    /// Always `false` for result systems.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match self {
            Self::WorkingConcrete(s) => s.is_complete(),
            Self::WorkingCalculated(..) | Self::ResultCalculated(..) | Self::ResultConcrete(_) => false,
        }
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkingConcrete(s) => fmt::Display::fmt(s, f),
            Self::ResultConcrete(s) => fmt::Display::fmt(s, f),
            Self::WorkingCalculated(calc, ..) => write!(f, "WorkingCalculated({calc:?})"),
            Self::ResultCalculated(calc, ..) => write!(f, "ResultCalculated({calc:?})"),
        }
    }
}

impl PartialEq for System {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for System {}

impl PartialOrd for System {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for System {
    /// `(score DESC, kind, completion, index DESC)`. `Score` and `Index`
    /// are themselves "greater is better", so a plain descending compare
    /// on them already yields "frontier order" directly.
    fn cmp(&self, other: &Self) -> Ordering {
        self.get_score()
            .cmp(other.get_score())
            .then_with(|| self.kind().cmp(&other.kind()))
            .then_with(|| self.completion().cmp(&other.completion()))
            .then_with(|| self.get_index().cmp(other.get_index()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::ConditionResult;

    #[derive(Debug)]
    struct Leaf {
        score: Score,
        index: Index,
        label: &'static str,
    }

    impl fmt::Display for Leaf {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.label)
        }
    }

    impl Working for Leaf {
        fn generate_children(&self, _max_count: usize) -> EngineResult<Vec<System>> {
            Err(EngineError::invalid_result("leaf has no children"))
        }
        fn is_complete(&self) -> bool {
            true
        }
    }

    impl WorkingConcreteSystem for Leaf {
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

    fn leaf(label: &'static str, ratio: f64, idx: u64) -> System {
        let score = Score::new()
            .extend_condition(ConditionResult::new("c", ratio).unwrap(), true)
            .unwrap()
            .commit()
            .unwrap();
        let index = Index::new().extend(idx).unwrap().commit().unwrap();
        System::WorkingConcrete(Box::new(Leaf { score, index, label }))
    }

    #[test]
    fn higher_score_sorts_greater() {
        let a = leaf("a", 1.0, 0);
        let b = leaf("b", 0.1, 0);
        assert!(a > b);
    }

    #[test]
    fn kind_and_completion_accessors_match_variant() {
        let sys = leaf("a", 1.0, 0);
        assert_eq!(sys.kind(), SystemKind::Working);
        assert_eq!(sys.completion(), Completion::Concrete);
        assert!(sys.is_complete());
    }

    #[test]
    fn update_score_rejects_pending_scores() {
        let mut sys = leaf("a", 1.0, 0);
        let pending = Score::new().extend_condition(ConditionResult::new("c", 1.0).unwrap(), true).unwrap();
        assert!(matches!(
            sys.update_score(pending),
            Err(EngineError::InvalidOperation(_))
        ));
    }

    #[test]
    fn commit_on_concrete_system_fails() {
        let sys = leaf("a", 1.0, 0);
        assert!(matches!(sys.commit(), Err(EngineError::InvalidOperation(_))));
    }
}
