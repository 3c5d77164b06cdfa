//! User-supplied condition outcomes, the raw material scores are built from.

use crate::error::{EngineError, EngineResult};

/// The outcome of checking a single user-defined condition against a
/// candidate system.
///
/// Produced entirely by user code (the core never constructs one on its
/// own behalf): the engine only ever consumes `ConditionResult`s that a
/// domain's condition battery emits.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionResult {
    /// Opaque identifier for the condition that produced this outcome
    /// (e.g. a condition name), used only for diagnostics.
    pub condition_ref: String,
    /// Whether the condition was satisfied.
    pub is_successful: bool,
    /// Degree of satisfaction in `[0, 1]`. A ratio of `0` always implies
    /// `is_successful == false`; a ratio above `0` implies
    /// `is_successful == true` unless [`ConditionResult::with_outcome`]
    /// explicitly overrides it.
    pub ratio: f64,
    /// Optional human-readable explanation.
    pub reason: Option<String>,
}

impl ConditionResult {
    /// Creates a condition result whose success is derived from `ratio`:
    /// `0` is unsuccessful, anything above `0` is successful.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] if `ratio` is outside
    /// `[0, 1]`.
    pub fn new(condition_ref: impl Into<String>, ratio: f64) -> EngineResult<Self> {
        Self::with_outcome(condition_ref, ratio > 0.0, ratio, None)
    }

    /// Creates a condition result with an explicit success flag. The flag
    /// may only override the ratio-derived default when `ratio > 0`; a
    /// ratio of `0` always forces `is_successful = false`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] if `ratio` is outside
    /// `[0, 1]`.
    pub fn with_outcome(
        condition_ref: impl Into<String>,
        is_successful: bool,
        ratio: f64,
        reason: Option<String>,
    ) -> EngineResult<Self> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(EngineError::invalid_argument(format!(
                "condition ratio must be in [0, 1], got {ratio}"
            )));
        }
        let is_successful = if ratio <= 0.0 { false } else { is_successful };
        Ok(Self {
            condition_ref: condition_ref.into(),
            is_successful,
            ratio,
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ratio_is_always_unsuccessful() {
        let cr = ConditionResult::with_outcome("c", true, 0.0, None).unwrap();
        assert!(!cr.is_successful);
    }

    #[test]
    fn positive_ratio_derives_success_by_default() {
        let cr = ConditionResult::new("c", 0.5).unwrap();
        assert!(cr.is_successful);
    }

    #[test]
    fn positive_ratio_can_be_overridden_to_failure() {
        let cr = ConditionResult::with_outcome("c", false, 0.9, Some("policy veto".into())).unwrap();
        assert!(!cr.is_successful);
        assert_eq!(cr.reason.as_deref(), Some("policy veto"));
    }

    #[test]
    fn out_of_range_ratio_is_rejected() {
        assert!(ConditionResult::new("c", 1.5).is_err());
        assert!(ConditionResult::new("c", -0.1).is_err());
    }
}
