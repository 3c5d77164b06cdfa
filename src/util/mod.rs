//! Internal utilities shared across the search engine.
//!
//! These utilities are intentionally minimal and dependency-free to keep
//! the deduplication and testing paths deterministic.

pub mod det_hash;

pub use det_hash::{DetBuildHasher, DetHashMap, DetHashSet, DetHasher};
