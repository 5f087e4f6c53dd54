//! Unit-conversion suggestions.
//!
//! Runs only when the upstream validator flagged the reported unit as
//! invalid. Every other unit the definition admits is tried; a conversion
//! that lands in biological range becomes a suggestion.

use labval_model::{
    ImplementationRisk, RangeCheck, Suggestion, SuggestionKind, TestDefinition, ValidationResult,
};

use super::priority_for;
use crate::error::GeneratorError;

const BASE_CONFIDENCE: f64 = 0.8;
const PHYSIOLOGICAL_CONFIDENCE: f64 = 0.95;
const CRITICAL_PENALTY: f64 = 0.8;
const PANIC_PENALTY: f64 = 0.6;
const EXTREME_RATIO_PENALTY: f64 = 0.7;
const AUTO_APPLY_THRESHOLD: f64 = 0.9;
const CONFIRMATION_THRESHOLD: f64 = 0.95;

pub fn suggest(
    result: &ValidationResult,
    def: &TestDefinition,
) -> Result<Vec<Suggestion>, GeneratorError> {
    let mut suggestions = Vec::new();
    for target in def.units() {
        if target == result.unit {
            continue;
        }
        // None here means no conversion path exists; that is "no
        // suggestion", not a failure.
        let Some(converted) = def.convert(result.value, &result.unit, target) else {
            continue;
        };
        let check = def.range_check(converted, target);
        if !check.is_in_range() {
            continue;
        }

        let mut confidence = if check == RangeCheck::Physiological {
            PHYSIOLOGICAL_CONFIDENCE
        } else {
            BASE_CONFIDENCE
        };
        if def.beyond_critical(converted, target) {
            confidence *= CRITICAL_PENALTY;
        }
        if def.beyond_panic(converted, target) {
            confidence *= PANIC_PENALTY;
        }
        let ratio = def
            .conversion_ratio(&result.unit, target)
            .unwrap_or(1.0);
        if ratio < 0.01 || ratio > 100.0 {
            confidence *= EXTREME_RATIO_PENALTY;
        }

        suggestions.push(Suggestion {
            kind: SuggestionKind::UnitConversion {
                from_unit: result.unit.clone(),
                to_unit: target.to_string(),
                ratio,
            },
            confidence,
            priority: priority_for(confidence),
            original_value: result.value,
            suggested_value: def.round_for(converted, target),
            suggested_unit: Some(target.to_string()),
            risk: if check == RangeCheck::Physiological {
                ImplementationRisk::Low
            } else {
                ImplementationRisk::Medium
            },
            user_confirmation_required: confidence < CONFIRMATION_THRESHOLD,
            auto_apply_eligible: confidence >= AUTO_APPLY_THRESHOLD,
            requires_clinical_review: false,
            justification: format!(
                "{} {} reported as {}; the same number read in {} converts to {} {}, \
                 which is biologically plausible",
                result.value, result.unit, result.test_id, result.unit, converted, target
            ),
        });
    }
    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use labval_model::{TestRegistry, ValidationFlags, test_ids};

    fn mg_dl_glucose(value: f64) -> ValidationResult {
        ValidationResult {
            test_id: test_ids::GLUCOSE_FASTING.to_string(),
            value,
            unit: "mg/dL".to_string(),
            patient_id: "P-0001".to_string(),
            flags: ValidationFlags {
                unit_valid: false,
                range_valid: true,
            },
        }
    }

    #[test]
    fn converts_mg_dl_glucose_to_mmol() {
        let registry = TestRegistry::builtin();
        let def = registry.get(test_ids::GLUCOSE_FASTING).expect("glucose");
        let suggestions = suggest(&mg_dl_glucose(126.0), def).expect("generate");
        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        // 126 mg/dL -> 6.99 mmol/L, squarely physiological.
        assert_eq!(s.suggested_value, 6.99);
        assert_eq!(s.suggested_unit.as_deref(), Some("mmol/L"));
        assert!((s.confidence - 0.95).abs() < 1e-9);
        assert!(s.auto_apply_eligible);
        assert!(!s.user_confirmation_required);
    }

    #[test]
    fn absolute_range_hit_keeps_base_confidence() {
        let registry = TestRegistry::builtin();
        let def = registry.get(test_ids::GLUCOSE_FASTING).expect("glucose");
        // 36 mg/dL -> 2.0 mmol/L: inside the absolute band only, and at or
        // beyond both the critical and panic thresholds.
        let suggestions = suggest(&mg_dl_glucose(36.0), def).expect("generate");
        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert!((s.confidence - 0.8 * 0.8 * 0.6).abs() < 1e-9);
        assert!(!s.auto_apply_eligible);
        assert!(s.user_confirmation_required);
    }

    #[test]
    fn unknown_reported_unit_yields_nothing() {
        let registry = TestRegistry::builtin();
        let def = registry.get(test_ids::GLUCOSE_FASTING).expect("glucose");
        let mut result = mg_dl_glucose(126.0);
        result.unit = "g/L".to_string();
        let suggestions = suggest(&result, def).expect("generate");
        assert!(suggestions.is_empty());
    }

    #[test]
    fn suggestion_is_idempotent_for_unchanged_input() {
        let registry = TestRegistry::builtin();
        let def = registry.get(test_ids::GLUCOSE_FASTING).expect("glucose");
        let result = mg_dl_glucose(126.0);
        let first = suggest(&result, def).expect("generate");
        let second = suggest(&result, def).expect("generate");
        assert_eq!(first, second);
    }
}
