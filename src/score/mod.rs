//! Partially-built search priority with group/suffix structure.
//!
//! A [`Score`] is built up incrementally as the search descends: zero or
//! more finished [`CommittedGroup`]s, the loose (not-yet-grouped) atoms of
//! the group currently in progress, and an optional pending atom that has
//! been proposed but not yet committed. Its [`Ord`] implementation is the
//! engine's sole notion of "more promising."

mod condition;
mod result;

pub use condition::ConditionResult;
pub use result::{CommittedGroup, GroupAgg, ScoreAtom, GOOD_THRESHOLD, MAX_SCORE};

use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone)]
struct PendingSuffix {
    atom: ScoreAtom,
    completes_group: bool,
}

/// A (possibly partial) search priority.
///
/// Comparisons are "greater is better": see [`Score::cmp`] for the full
/// tie-broken ladder.
#[derive(Debug, Clone)]
pub struct Score {
    groups: Arc<[CommittedGroup]>,
    loose: Arc<[ScoreAtom]>,
    pending: Option<Arc<PendingSuffix>>,
    /// Cached aggregate over `loose` plus the pending atom (if any), so
    /// comparisons against the in-flight tail are O(1).
    pending_data: GroupAgg,
}

impl Score {
    /// The empty score: no groups, no loose results, `is_successful() ==
    /// true` vacuously.
    #[must_use]
    pub fn new() -> Self {
        Self {
            groups: Arc::from(Vec::new().into_boxed_slice()),
            loose: Arc::from(Vec::new().into_boxed_slice()),
            pending: None,
            pending_data: GroupAgg::aggregate(&[]),
        }
    }

    /// Produces a pending score that adds `atom` as the in-flight suffix.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOperation`] if `self` already has a
    /// pending suffix.
    pub fn extend(&self, atom: ScoreAtom, completes_group: bool) -> EngineResult<Self> {
        if self.pending.is_some() {
            return Err(EngineError::invalid_operation(
                "cannot extend a score that already has a pending suffix",
            ));
        }
        let pending_data = extend_pending_data(&self.loose, &atom);
        Ok(Self {
            groups: Arc::clone(&self.groups),
            loose: Arc::clone(&self.loose),
            pending: Some(Arc::new(PendingSuffix {
                atom,
                completes_group,
            })),
            pending_data,
        })
    }

    /// Produces a pending score from a single [`ConditionResult`], treated
    /// as the sole requirement of a fresh atom.
    ///
    /// # Errors
    ///
    /// See [`Score::extend`].
    pub fn extend_condition(
        &self,
        condition: ConditionResult,
        completes_group: bool,
    ) -> EngineResult<Self> {
        self.extend(ScoreAtom::from_single_condition(condition), completes_group)
    }

    /// Commits the pending suffix: it becomes a loose result, and if the
    /// suffix was marked `completes_group`, the loose results (including
    /// it) are rolled up into a new [`CommittedGroup`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOperation`] if `self` has no pending
    /// suffix.
    pub fn commit(&self) -> EngineResult<Self> {
        let Some(pending) = self.pending.as_ref() else {
            return Err(EngineError::invalid_operation(
                "cannot commit a score with no pending suffix",
            ));
        };
        let mut loose: Vec<ScoreAtom> = self.loose.iter().cloned().collect();
        loose.push(pending.atom.clone());

        if pending.completes_group {
            let group = CommittedGroup::new(loose);
            let mut groups: Vec<CommittedGroup> = self.groups.iter().cloned().collect();
            groups.push(group);
            Ok(Self {
                groups: Arc::from(groups.into_boxed_slice()),
                loose: Arc::from(Vec::new().into_boxed_slice()),
                pending: None,
                pending_data: GroupAgg::aggregate(&[]),
            })
        } else {
            let pending_data = GroupAgg::aggregate(&loose);
            Ok(Self {
                groups: Arc::clone(&self.groups),
                loose: Arc::from(loose.into_boxed_slice()),
                pending: None,
                pending_data,
            })
        }
    }

    /// Clones a committed score.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOperation`] if `self` has a pending
    /// suffix.
    pub fn copy(&self) -> EngineResult<Self> {
        if self.pending.is_some() {
            return Err(EngineError::invalid_operation(
                "cannot copy a pending score; commit it first",
            ));
        }
        Ok(self.clone())
    }

    /// `true` if this score has an uncommitted pending atom.
    #[must_use]
    pub const fn has_suffix(&self) -> bool {
        self.pending.is_some()
    }

    /// `true` iff every committed group succeeded, every applicable loose
    /// atom succeeded, and the pending atom (if any) is not an applicable
    /// failure.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.groups.iter().all(|g| g.is_successful)
            && self
                .loose
                .iter()
                .all(|atom| !atom.is_applicable() || atom.is_successful())
            && self
                .pending
                .as_ref()
                .is_none_or(|p| !(p.atom.is_applicable() && !p.atom.is_successful()))
    }

    /// Iterates committed groups in order, short-circuiting when `f`
    /// returns `false`.
    pub fn enum_groups<F: FnMut(&CommittedGroup) -> bool>(&self, mut f: F) {
        for group in self.groups.iter() {
            if !f(group) {
                return;
            }
        }
    }

    /// Iterates the loose (not-yet-grouped) atoms in order, short-circuiting
    /// when `f` returns `false`.
    pub fn enum_loose_results<F: FnMut(&ScoreAtom) -> bool>(&self, mut f: F) {
        for atom in self.loose.iter() {
            if !f(atom) {
                return;
            }
        }
    }

    /// Iterates every atom reachable from this score — committed groups,
    /// loose atoms, then the pending atom if present — short-circuiting
    /// when `f` returns `false`.
    pub fn enum_all_results<F: FnMut(&ScoreAtom) -> bool>(&self, mut f: F) {
        for group in self.groups.iter() {
            for atom in &group.results {
                if !f(atom) {
                    return;
                }
            }
        }
        for atom in self.loose.iter() {
            if !f(atom) {
                return;
            }
        }
        if let Some(pending) = &self.pending {
            f(&pending.atom);
        }
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

fn extend_pending_data(loose: &[ScoreAtom], atom: &ScoreAtom) -> GroupAgg {
    let mut combined: Vec<ScoreAtom> = loose.to_vec();
    combined.push(atom.clone());
    GroupAgg::aggregate(&combined)
}

/// Two-tier-ladder comparison of two group-shaped aggregates.
///
/// 1. `is_successful`
/// 2. fewer `num_failures` wins
/// 3. higher `average_score` wins
/// 4. `num_results`: more wins above [`GOOD_THRESHOLD`], fewer wins below it
fn compare_group_like(a: &GroupAgg, b: &GroupAgg) -> Ordering {
    if a.is_successful != b.is_successful {
        return if a.is_successful {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if a.num_failures != b.num_failures {
        // Fewer failures is better.
        return b.num_failures.cmp(&a.num_failures);
    }
    match a
        .average_score
        .partial_cmp(&b.average_score)
        .unwrap_or(Ordering::Equal)
    {
        Ordering::Equal => {}
        ord => return ord,
    }
    if a.num_results != b.num_results {
        return if a.is_good() {
            a.num_results.cmp(&b.num_results)
        } else {
            b.num_results.cmp(&a.num_results)
        };
    }
    Ordering::Equal
}

/// Compares a sequence of extra committed groups (the tail a longer score
/// has beyond the shorter one's group count) against the shorter score's
/// cached pending data, one group at a time.
fn compare_extra_groups_with_pending(extra: &[CommittedGroup], pending: &GroupAgg) -> Ordering {
    match extra.split_first() {
        None => Ordering::Equal,
        Some((head, rest)) => {
            let ord = compare_group_like(&head.agg(), pending);
            if ord != Ordering::Equal {
                return ord;
            }
            if head.is_successful {
                // Converted pending material into a completed good group.
                Ordering::Greater
            } else {
                compare_extra_groups_with_pending(rest, pending)
            }
        }
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        let (self_successful, other_successful) = (self.is_successful(), other.is_successful());
        if self_successful != other_successful {
            return if self_successful {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let common = self.groups.len().min(other.groups.len());
        for i in 0..common {
            let ord = compare_group_like(&self.groups[i].agg(), &other.groups[i].agg());
            if ord != Ordering::Equal {
                return ord;
            }
        }

        match self.groups.len().cmp(&other.groups.len()) {
            Ordering::Greater => {
                let ord = compare_extra_groups_with_pending(
                    &self.groups[common..],
                    &other.pending_data,
                );
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Less => {
                let ord = compare_extra_groups_with_pending(
                    &other.groups[common..],
                    &self.pending_data,
                )
                .reverse();
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal => {}
        }

        compare_group_like(&self.pending_data, &other.pending_data)
    }
}
