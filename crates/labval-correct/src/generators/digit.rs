//! Digit-level corrections: trailing-zero removal and missing decimal points.
//!
//! Both target integer-looking entries: a value typed with extra zeros
//! (4500 for 450) or with the decimal point dropped entirely (1234 for
//! 12.34).

use labval_model::{
    DigitFix, ImplementationRisk, RangeCheck, Suggestion, SuggestionKind, TestDefinition,
    ValidationResult,
};

use super::priority_for;
use crate::digits::DigitString;
use crate::error::GeneratorError;

const MAX_TRAILING_ZEROS: usize = 3;
const TRAILING_ZERO_BASE: f64 = 0.75;
const TRAILING_ZERO_CAP: f64 = 0.85;
const MISSING_DECIMAL_BASE: f64 = 0.65;
const MISSING_DECIMAL_CAP: f64 = 0.85;
const MISSING_DECIMAL_AUTO_THRESHOLD: f64 = 0.8;
const PHYSIOLOGICAL_BONUS: f64 = 0.1;

pub fn suggest(
    result: &ValidationResult,
    def: &TestDefinition,
) -> Result<Vec<Suggestion>, GeneratorError> {
    let Some(digit_string) = DigitString::from_value(result.value) else {
        return Ok(Vec::new());
    };
    // Both repairs only make sense for integer-looking entries.
    if digit_string.frac_digits != 0 {
        return Ok(Vec::new());
    }

    let mut suggestions = Vec::new();
    suggestions.extend(trailing_zero_suggestions(result, def));
    suggestions.extend(missing_decimal_suggestions(result, def, &digit_string));
    Ok(suggestions)
}

fn trailing_zero_suggestions(
    result: &ValidationResult,
    def: &TestDefinition,
) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    let mut candidate = result.value;
    for removed in 1..=MAX_TRAILING_ZEROS {
        if candidate % 10.0 != 0.0 || candidate == 0.0 {
            break;
        }
        candidate /= 10.0;
        let check = def.range_check(candidate, &result.unit);
        if !check.is_in_range() {
            continue;
        }
        let mut confidence = TRAILING_ZERO_BASE;
        if check == RangeCheck::Physiological {
            confidence += PHYSIOLOGICAL_BONUS;
        }
        confidence = confidence.min(TRAILING_ZERO_CAP);
        suggestions.push(Suggestion {
            kind: SuggestionKind::DigitCorrection {
                fix: DigitFix::TrailingZeros { removed },
            },
            confidence,
            priority: priority_for(confidence),
            original_value: result.value,
            suggested_value: candidate,
            suggested_unit: None,
            risk: ImplementationRisk::Medium,
            user_confirmation_required: true,
            auto_apply_eligible: false,
            requires_clinical_review: false,
            justification: format!(
                "Removing {removed} trailing zero(s) from {} gives {}, \
                 which is biologically plausible",
                result.value, candidate
            ),
        });
    }
    suggestions
}

fn missing_decimal_suggestions(
    result: &ValidationResult,
    def: &TestDefinition,
    digit_string: &DigitString,
) -> Vec<Suggestion> {
    let len = digit_string.len();
    if len < 2 {
        return Vec::new();
    }
    let mut suggestions = Vec::new();
    // Try every internal split as the dropped decimal point.
    for position in 1..len {
        let candidate = DigitString::value_of(&digit_string.digits, len - position);
        if candidate == result.value {
            continue;
        }
        let check = def.range_check(candidate, &result.unit);
        if !check.is_in_range() {
            continue;
        }
        let mut confidence = MISSING_DECIMAL_BASE;
        if check == RangeCheck::Physiological {
            confidence += PHYSIOLOGICAL_BONUS;
        }
        confidence = confidence.min(MISSING_DECIMAL_CAP);
        suggestions.push(Suggestion {
            kind: SuggestionKind::DigitCorrection {
                fix: DigitFix::MissingDecimal { position },
            },
            confidence,
            priority: priority_for(confidence),
            original_value: result.value,
            suggested_value: candidate,
            suggested_unit: None,
            risk: ImplementationRisk::Medium,
            user_confirmation_required: true,
            auto_apply_eligible: confidence >= MISSING_DECIMAL_AUTO_THRESHOLD,
            requires_clinical_review: false,
            justification: format!(
                "Reading {} with a decimal point after digit {position} gives {}, \
                 which is biologically plausible",
                result.value, candidate
            ),
        });
    }
    suggestions
}
