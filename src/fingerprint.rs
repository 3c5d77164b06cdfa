//! Pluggable dedup oracle consulted at several points in the task loop.

use std::hash::Hash;

use crate::system::System;
use crate::util::DetHashSet;

/// Decides whether a system is novel enough to keep processing.
///
/// Implementations are expected to remember every system they have
/// seen-and-approved. Safe to call from a single task thread; if a user
/// shares one instance across tasks, synchronising it is the user's
/// responsibility (see the scheduler's concurrency notes).
pub trait Fingerprinter {
    /// Returns `true` if `system` should continue being processed (is
    /// novel, or this fingerprinter doesn't consider novelty at all).
    fn should_process(&mut self, system: &System) -> bool;

    /// `true` for the distinguished no-op fingerprinter, letting callers
    /// fast-path around calling `should_process` at all.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Always approves; the default when no fingerprinting is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFingerprinter;

impl Fingerprinter for NoopFingerprinter {
    fn should_process(&mut self, _system: &System) -> bool {
        true
    }

    fn is_noop(&self) -> bool {
        true
    }
}

/// Reference fingerprinter: hashes a caller-supplied key derived from a
/// system's domain data and remembers every key it has approved.
pub struct HashSetFingerprinter<K, F> {
    seen: DetHashSet<K>,
    key_of: F,
}

impl<K, F> HashSetFingerprinter<K, F>
where
    K: Eq + Hash,
    F: Fn(&System) -> K,
{
    /// Builds a fingerprinter keyed by `key_of`, a closure projecting a
    /// system's domain data into a hashable fingerprint.
    pub fn new(key_of: F) -> Self {
        Self {
            seen: DetHashSet::default(),
            key_of,
        }
    }

    /// Number of distinct keys approved so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// `true` if no keys have been approved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl<K, F> Fingerprinter for HashSetFingerprinter<K, F>
where
    K: Eq + Hash,
    F: Fn(&System) -> K,
{
    fn should_process(&mut self, system: &System) -> bool {
        let key = (self.key_of)(system);
        self.seen.insert(key)
    }
}
