//! Decimal-point-slip suggestions.
//!
//! A misplaced decimal point scales the value by a power of ten. Each
//! candidate factor is applied and kept only when the rescaled value lands
//! in biological range.

use labval_model::{
    ImplementationRisk, RangeCheck, Suggestion, SuggestionKind, TestDefinition, ValidationResult,
};

use super::priority_for;
use crate::error::GeneratorError;

const FACTORS: [f64; 6] = [0.1, 0.01, 0.001, 10.0, 100.0, 1000.0];
/// Single- and double-place slips are the ones people actually make.
const COMMON_FACTORS: [f64; 4] = [0.1, 10.0, 0.01, 100.0];

const BASE_CONFIDENCE: f64 = 0.75;
const COMMON_CONFIDENCE: f64 = 0.85;
const EXTREME_FACTOR_PENALTY: f64 = 0.6;
const AUTO_APPLY_THRESHOLD: f64 = 0.9;

pub fn suggest(
    result: &ValidationResult,
    def: &TestDefinition,
) -> Result<Vec<Suggestion>, GeneratorError> {
    let mut suggestions = Vec::new();
    for factor in FACTORS {
        let candidate = result.value * factor;
        let check = def.range_check(candidate, &result.unit);
        if !check.is_in_range() {
            continue;
        }

        let mut confidence = if COMMON_FACTORS.contains(&factor) {
            COMMON_CONFIDENCE
        } else {
            BASE_CONFIDENCE
        };
        if factor <= 0.001 || factor >= 1000.0 {
            confidence *= EXTREME_FACTOR_PENALTY;
        }

        suggestions.push(Suggestion {
            kind: SuggestionKind::DecimalPointCorrection { factor },
            confidence,
            priority: priority_for(confidence),
            original_value: result.value,
            suggested_value: def.round_for(candidate, &result.unit),
            suggested_unit: None,
            risk: if check == RangeCheck::Physiological {
                ImplementationRisk::Medium
            } else {
                ImplementationRisk::High
            },
            user_confirmation_required: true,
            auto_apply_eligible: confidence >= AUTO_APPLY_THRESHOLD,
            requires_clinical_review: false,
            justification: format!(
                "Scaling {} by {} yields {}, consistent with a decimal-point slip",
                result.value, factor, candidate
            ),
        });
    }
    suggestions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use labval_model::{TestRegistry, ValidationFlags, test_ids};

    fn glucose(value: f64) -> ValidationResult {
        ValidationResult {
            test_id: test_ids::GLUCOSE_FASTING.to_string(),
            value,
            unit: "mmol/L".to_string(),
            patient_id: "P-0001".to_string(),
            flags: ValidationFlags {
                unit_valid: true,
                range_valid: false,
            },
        }
    }

    #[test]
    fn tenfold_slip_is_recovered() {
        let registry = TestRegistry::builtin();
        let def = registry.get(test_ids::GLUCOSE_FASTING).expect("glucose");
        let suggestions = suggest(&glucose(69.9), def).expect("generate");
        // 69.9 is above the absolute band; x0.1 = 6.99 (physiological) and
        // x0.01 = 0.699 (absolute) both survive.
        assert_eq!(suggestions.len(), 2);
        assert!(matches!(
            suggestions[0].kind,
            SuggestionKind::DecimalPointCorrection { factor } if factor == 0.1
        ));
        assert!((suggestions[0].confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn common_factor_outranks_extreme_factor() {
        let registry = TestRegistry::builtin();
        let def = registry.get(test_ids::GLUCOSE_FASTING).expect("glucose");
        // 5000: x0.01 = 50 (absolute edge) and x0.001 = 5.0 (physiological).
        let suggestions = suggest(&glucose(5000.0), def).expect("generate");
        assert_eq!(suggestions.len(), 2);
        let common = suggestions
            .iter()
            .find(|s| matches!(s.kind, SuggestionKind::DecimalPointCorrection { factor } if factor == 0.01))
            .expect("common factor candidate");
        let extreme = suggestions
            .iter()
            .find(|s| matches!(s.kind, SuggestionKind::DecimalPointCorrection { factor } if factor == 0.001))
            .expect("extreme factor candidate");
        assert!((common.confidence - 0.85).abs() < 1e-9);
        assert!((extreme.confidence - 0.75 * 0.6).abs() < 1e-9);
        assert!(common.confidence > extreme.confidence);
        // Output is sorted by confidence descending.
        assert!(suggestions[0].confidence >= suggestions[1].confidence);
    }

    #[test]
    fn extreme_upscale_is_penalized() {
        let registry = TestRegistry::builtin();
        let def = registry.get(test_ids::GLUCOSE_FASTING).expect("glucose");
        // Only x1000 = 2.0 (absolute band) survives for 0.002.
        let suggestions = suggest(&glucose(0.002), def).expect("generate");
        assert_eq!(suggestions.len(), 1);
        assert!((suggestions[0].confidence - 0.75 * 0.6).abs() < 1e-9);
        assert!(!suggestions[0].auto_apply_eligible);
    }
}
