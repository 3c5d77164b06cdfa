//! Stable ordering tiebreaker for search states.
//!
//! An [`Index`] records the path of child-selection decisions that produced
//! a [`crate::system::System`]: an ordered sequence of `u64` values. It
//! exists purely to break ties between otherwise-equal [`crate::score::Score`]s
//! in a way that is total, stable, and cheap to extend one element at a
//! time without copying the whole path.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::{EngineError, EngineResult};

/// A total-order tiebreaker: the sequence of child-selection decisions that
/// produced a system.
///
/// An `Index` is either **committed** (a finished path, no suffix) or
/// **pending** (a committed prefix plus one in-flight suffix element). The
/// committed prefix is reference-counted so many in-flight indices can
/// share it without copying.
#[derive(Debug, Clone)]
pub struct Index {
    prefix: Arc<[u64]>,
    suffix: Option<u64>,
}

impl Index {
    /// Creates the root index: committed, empty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix: Arc::from(Vec::new().into_boxed_slice()),
            suffix: None,
        }
    }

    /// Returns a pending index extending this (committed) index with one
    /// more decision.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOperation`] if `self` is already
    /// pending (indices carry at most one in-flight suffix element).
    pub fn extend(&self, value: u64) -> EngineResult<Self> {
        if self.suffix.is_some() {
            return Err(EngineError::invalid_operation(
                "cannot extend an index that already has a pending suffix",
            ));
        }
        Ok(Self {
            prefix: Arc::clone(&self.prefix),
            suffix: Some(value),
        })
    }

    /// Commits a pending index: the suffix is appended to a new immutable
    /// committed prefix.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOperation`] if `self` is already
    /// committed.
    pub fn commit(&self) -> EngineResult<Self> {
        let Some(suffix) = self.suffix else {
            return Err(EngineError::invalid_operation(
                "cannot commit an index with no pending suffix",
            ));
        };
        let mut values: Vec<u64> = self.prefix.iter().copied().collect();
        values.push(suffix);
        Ok(Self {
            prefix: Arc::from(values.into_boxed_slice()),
            suffix: None,
        })
    }

    /// Clones a committed index.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOperation`] if `self` is pending.
    pub fn copy(&self) -> EngineResult<Self> {
        if self.suffix.is_some() {
            return Err(EngineError::invalid_operation(
                "cannot copy a pending index; commit it first",
            ));
        }
        Ok(self.clone())
    }

    /// Returns true if this index has a pending (uncommitted) suffix.
    #[must_use]
    pub const fn has_suffix(&self) -> bool {
        self.suffix.is_some()
    }

    /// Depth of the path: committed length plus one if pending.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.prefix.len() + usize::from(self.suffix.is_some())
    }

    /// Iterates the values in insertion order, short-circuiting as soon as
    /// `f` returns `false`.
    pub fn enumerate<F: FnMut(u64) -> bool>(&self, mut f: F) {
        for &value in self.prefix.iter() {
            if !f(value) {
                return;
            }
        }
        if let Some(suffix) = self.suffix {
            f(suffix);
        }
    }

    fn values(&self) -> Vec<u64> {
        let mut values: Vec<u64> = self.prefix.iter().copied().collect();
        if let Some(suffix) = self.suffix {
            values.push(suffix);
        }
        values
    }
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Index {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Index {}

impl PartialOrd for Index {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Index {
    /// Reverse lexicographic, "greater is better" ordering: at the first
    /// differing value the *greater* numeric value sorts *less*; on prefix
    /// equality the *shorter* sequence sorts *greater*.
    fn cmp(&self, other: &Self) -> Ordering {
        let a = self.values();
        let b = other.values();
        for (x, y) in a.iter().zip(b.iter()) {
            match x.cmp(y) {
                Ordering::Equal => continue,
                // Greater numeric value sorts less (worse).
                other_ord => return other_ord.reverse(),
            }
        }
        // Prefix-equal up to the shorter length: shorter sorts greater.
        b.len().cmp(&a.len())
    }
}
