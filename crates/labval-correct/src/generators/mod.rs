//! Correction sub-generators.
//!
//! Each generator is independent and composable: it inspects one
//! `ValidationResult` against the test definition and returns zero or more
//! suggestions, or a `GeneratorError` the engine isolates from the others.

pub mod decimal;
pub mod digit;
pub mod historical;
pub mod learned;
pub mod transposition;
pub mod unit;

use labval_model::Priority;

/// Priority assigned from the final confidence of a suggestion.
pub(crate) fn priority_for(confidence: f64) -> Priority {
    if confidence >= 0.85 {
        Priority::High
    } else if confidence >= 0.7 {
        Priority::Medium
    } else {
        Priority::Low
    }
}
