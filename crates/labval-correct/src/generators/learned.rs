//! Learned-pattern suggestions.
//!
//! Consults the pattern success rates accumulated from user feedback. Only
//! patterns for the same test with a success rate above 0.7 are considered;
//! the final confidence is the stored success rate multiplied by the
//! applicability confidence. Applicability matching itself requires a
//! trained model and is not yet supported, so this generator currently
//! produces no suggestions.

use labval_model::{
    ImplementationRisk, PatientContext, Suggestion, SuggestionKind, ValidationResult,
};
use tracing::trace;

use super::priority_for;
use crate::error::GeneratorError;
use crate::state::LearnedPattern;

const MIN_SUCCESS_RATE: f64 = 0.7;

/// How well a learned pattern fits the current result.
pub(crate) struct Applicability {
    pub confidence: f64,
    pub suggested_value: f64,
}

pub fn suggest<'a>(
    result: &ValidationResult,
    patterns: impl Iterator<Item = &'a LearnedPattern>,
    patient: Option<&PatientContext>,
) -> Result<Vec<Suggestion>, GeneratorError> {
    let mut suggestions = Vec::new();
    for pattern in patterns {
        if pattern.test_id != result.test_id || pattern.success_rate <= MIN_SUCCESS_RATE {
            continue;
        }
        let Some(applicability) = check_pattern_applicability(pattern, result, patient) else {
            trace!(
                pattern_id = %pattern.pattern_id,
                test_id = %result.test_id,
                "learned pattern not applicable"
            );
            continue;
        };
        let confidence = pattern.success_rate * applicability.confidence;
        suggestions.push(Suggestion {
            kind: SuggestionKind::LearnedPatternCorrection {
                pattern_id: pattern.pattern_id.clone(),
            },
            confidence,
            priority: priority_for(confidence),
            original_value: result.value,
            suggested_value: applicability.suggested_value,
            suggested_unit: None,
            risk: ImplementationRisk::Medium,
            user_confirmation_required: true,
            auto_apply_eligible: false,
            requires_clinical_review: false,
            justification: format!(
                "Pattern {} has a {:.0}% historical success rate for this test",
                pattern.pattern_id,
                pattern.success_rate * 100.0
            ),
        });
    }
    Ok(suggestions)
}

/// Match a learned pattern against the current result.
///
/// Not yet supported: applicability matching needs a trained model fed by
/// the feedback sink, which only collects raw feedback today. Returns
/// not-applicable for every pattern.
fn check_pattern_applicability(
    _pattern: &LearnedPattern,
    _result: &ValidationResult,
    _patient: Option<&PatientContext>,
) -> Option<Applicability> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use labval_model::{ValidationFlags, test_ids};

    #[test]
    fn applicability_matching_is_not_yet_supported() {
        let pattern = LearnedPattern {
            pattern_id: "pat-001".to_string(),
            test_id: test_ids::GLUCOSE_FASTING.to_string(),
            success_rate: 0.9,
        };
        let result = ValidationResult {
            test_id: test_ids::GLUCOSE_FASTING.to_string(),
            value: 700.0,
            unit: "mmol/L".to_string(),
            patient_id: "P-0001".to_string(),
            flags: ValidationFlags {
                unit_valid: true,
                range_valid: false,
            },
        };
        let suggestions =
            suggest(&result, std::iter::once(&pattern), None).expect("generate");
        assert!(suggestions.is_empty());
    }
}
