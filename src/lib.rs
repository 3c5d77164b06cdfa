//! A generic best-first search engine: scoring, frontier management, and
//! parallel round scheduling over user-defined search spaces.
//!
//! # Overview
//!
//! Callers implement a small set of domain hooks — [`system::Working`] for
//! expanding a candidate into children, [`system::CalculatedWorking`]/
//! [`system::CalculatedResult`] for realising a lazily-generated child, and
//! [`config::SearchConfig`] for the scalar limits that bound the search —
//! and hand one or more initial [`system::System`]s to
//! [`scheduler::RoundScheduler::execute`]. The engine does the rest:
//! scoring candidates with a bespoke comparator, merging sorted frontiers,
//! deduplicating via a pluggable [`fingerprint::Fingerprinter`], and
//! dispatching work across a bounded worker pool in bulk-synchronous
//! rounds.
//!
//! # Module structure
//!
//! - [`index`]: stable total-order tiebreaker for otherwise-equal scores.
//! - [`score`]: the partially-built search priority and its comparator.
//! - [`system`]: the closed `(score, index, kind, completion)` hierarchy.
//! - [`merge`]: k-way merge of sorted frontiers into a bounded result.
//! - [`fingerprint`]: pluggable dedup oracle.
//! - [`observer`]: lifecycle event sink with cooperative cancellation.
//! - [`collector`]: thread-safe aggregation of the best `N` results.
//! - [`config`]: scalar-limit policy consumed by the loop and scheduler.
//! - [`task_loop`]: single-task inner search iteration.
//! - [`scheduler`]: the parallel outer round loop.
//! - [`error`](mod@error): the crate's error taxonomy.
//! - `observability` (internal): structured tracing around round/task/
//!   iteration boundaries, zero-cost when the `tracing-integration`
//!   feature is off.
//!
//! # API stability
//!
//! This crate is in the 0.x series; public items should be treated as
//! unstable and subject to change until 1.0.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod collector;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod index;
pub(crate) mod observability;
pub mod observer;
pub mod merge;
pub mod scheduler;
pub mod score;
pub mod system;
pub mod task_loop;
pub mod util;

pub use collector::ResultCollector;
pub use config::{FingerprinterFactory, SearchConfig};
pub use error::{EngineError, EngineResult};
pub use fingerprint::{Fingerprinter, HashSetFingerprinter, NoopFingerprinter};
pub use index::Index;
pub use merge::{bounded_merge, MergeOutcome, RescoreHook};
pub use observer::{NullObserver, Observer, Signal, TracingObserver, CANCEL, CONTINUE};
pub use scheduler::{ExecuteOutcome, RoundScheduler};
pub use score::{CommittedGroup, ConditionResult, GroupAgg, Score, ScoreAtom, GOOD_THRESHOLD, MAX_SCORE};
pub use system::{
    CalculatedResult, CalculatedWorking, Completion, ResultConcreteSystem, System, SystemKind,
    Working, WorkingConcreteSystem,
};
pub use task_loop::run_task;
