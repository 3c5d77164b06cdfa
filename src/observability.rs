//! Structured logging around round/task/iteration boundaries.
//!
//! This module is a thin shim over the optional `tracing` dependency. When
//! the `tracing-integration` feature is enabled the macros below forward to
//! `tracing`'s own; when it is disabled they expand to nothing, so call
//! sites pay zero runtime cost in builds that don't want the dependency.

/// Emits a `tracing::debug!` event when `tracing-integration` is enabled,
/// otherwise expands to nothing.
#[cfg(feature = "tracing-integration")]
macro_rules! log_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}
#[cfg(not(feature = "tracing-integration"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Emits a `tracing::warn!` event when `tracing-integration` is enabled,
/// otherwise expands to nothing.
#[cfg(feature = "tracing-integration")]
macro_rules! log_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}
#[cfg(not(feature = "tracing-integration"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

/// Opens a `tracing::span!` at `Debug` level when `tracing-integration` is
/// enabled, otherwise produces a value whose `.entered()` is a no-op guard.
#[cfg(feature = "tracing-integration")]
macro_rules! log_span {
    ($name:expr, $($field:tt)*) => {
        tracing::debug_span!($name, $($field)*)
    };
    ($name:expr) => {
        tracing::debug_span!($name)
    };
}
#[cfg(not(feature = "tracing-integration"))]
macro_rules! log_span {
    ($name:expr, $($field:tt)*) => {
        $crate::observability::NoopSpan
    };
    ($name:expr) => {
        $crate::observability::NoopSpan
    };
}

pub(crate) use log_debug;
pub(crate) use log_span;
pub(crate) use log_warn;

/// Stand-in for `tracing::Span` when the `tracing-integration` feature is
/// disabled; `entered()` returns a guard that does nothing on drop.
#[cfg(not(feature = "tracing-integration"))]
#[derive(Debug, Clone, Copy)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing-integration"))]
impl NoopSpan {
    /// Returns a no-op guard, mirroring `tracing::Span::entered`.
    #[must_use]
    pub const fn entered(self) -> Self {
        self
    }
}

/// Installs a reasonable default `tracing` subscriber for binaries and
/// examples embedding this crate. Returns `false` if a subscriber was
/// already installed or the feature is unavailable; never panics.
#[cfg(feature = "test-internals")]
pub fn install_test_subscriber() -> bool {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .is_ok()
}
