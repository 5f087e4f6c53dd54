//! Digit-transposition suggestions.
//!
//! Works on the decimal-stripped digit string (2 to 6 digits). Adjacent
//! pairs are swapped and the decimal point is re-inserted at its original
//! digit offset from the right; a single first-last swap is also tried for
//! strings of three or more digits. The decimal-repositioning behavior is
//! pinned by the tests below.

use labval_model::{
    ImplementationRisk, RangeCheck, Suggestion, SuggestionKind, TestDefinition, TranspositionSwap,
    ValidationResult,
};

use super::priority_for;
use crate::digits::DigitString;
use crate::error::GeneratorError;

const MIN_DIGITS: usize = 2;
const MAX_DIGITS: usize = 6;
const ADJACENT_BASE: f64 = 0.75;
const FIRST_LAST_BASE: f64 = 0.5;
const PHYSIOLOGICAL_BONUS: f64 = 0.05;
const CONFIDENCE_CAP: f64 = 0.8;

pub fn suggest(
    result: &ValidationResult,
    def: &TestDefinition,
) -> Result<Vec<Suggestion>, GeneratorError> {
    let Some(digit_string) = DigitString::from_value(result.value) else {
        // Values without a plain digit representation cannot be transposed.
        return Ok(Vec::new());
    };
    if digit_string.len() < MIN_DIGITS || digit_string.len() > MAX_DIGITS {
        return Ok(Vec::new());
    }

    let mut suggestions = Vec::new();
    for index in 0..digit_string.len() - 1 {
        let Some(candidate) = digit_string.adjacent_swap(index) else {
            continue;
        };
        if let Some(suggestion) = evaluate(
            result,
            def,
            candidate,
            TranspositionSwap::Adjacent { index },
            ADJACENT_BASE,
            ImplementationRisk::Medium,
        ) {
            suggestions.push(suggestion);
        }
    }

    if digit_string.len() >= 3
        && let Some(candidate) = digit_string.first_last_swap()
        && let Some(suggestion) = evaluate(
            result,
            def,
            candidate,
            TranspositionSwap::FirstLast,
            FIRST_LAST_BASE,
            ImplementationRisk::High,
        )
    {
        suggestions.push(suggestion);
    }

    Ok(suggestions)
}

fn evaluate(
    result: &ValidationResult,
    def: &TestDefinition,
    candidate: f64,
    swap: TranspositionSwap,
    base_confidence: f64,
    risk: ImplementationRisk,
) -> Option<Suggestion> {
    if candidate == result.value {
        return None;
    }
    let check = def.range_check(candidate, &result.unit);
    if !check.is_in_range() {
        return None;
    }
    let mut confidence = base_confidence;
    if check == RangeCheck::Physiological {
        confidence += PHYSIOLOGICAL_BONUS;
    }
    confidence = confidence.min(CONFIDENCE_CAP);

    let swapped_what = match swap {
        TranspositionSwap::Adjacent { index } => {
            format!("digits {} and {}", index + 1, index + 2)
        }
        TranspositionSwap::FirstLast => "the first and last digits".to_string(),
    };
    Some(Suggestion {
        kind: SuggestionKind::DigitTransposition { swap },
        confidence,
        priority: priority_for(confidence),
        original_value: result.value,
        suggested_value: candidate,
        suggested_unit: None,
        risk,
        user_confirmation_required: true,
        // Transpositions are never applied without a human.
        auto_apply_eligible: false,
        requires_clinical_review: false,
        justification: format!(
            "Swapping {swapped_what} of {} gives {}, which is biologically plausible",
            result.value, candidate
        ),
    })
}
