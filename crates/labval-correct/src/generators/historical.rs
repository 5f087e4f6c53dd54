//! Historical-pattern suggestions.
//!
//! When a patient has enough prior values for the same test, a current value
//! far outside their own distribution is flagged and two advisory repairs
//! are proposed: the historical median, and a value clamped to two standard
//! deviations on the deviating side. Both are deliberately low-confidence
//! and never auto-applied.

use labval_model::{
    HistoricalValue, ImplementationRisk, Suggestion, SuggestionKind, TestDefinition,
    ValidationResult,
};

use super::priority_for;
use crate::error::GeneratorError;

const MIN_SAMPLES: usize = 3;
const OUTLIER_Z: f64 = 3.0;
const EXTREME_Z: f64 = 5.0;
const EXTREME_Z_PENALTY: f64 = 0.7;
const CONFIDENCE_CAP: f64 = 0.6;

pub fn suggest(
    result: &ValidationResult,
    def: &TestDefinition,
    history: &[HistoricalValue],
) -> Result<Vec<Suggestion>, GeneratorError> {
    if history.len() < MIN_SAMPLES {
        return Ok(Vec::new());
    }
    if history.iter().any(|entry| !entry.value.is_finite()) {
        return Err(GeneratorError::NonFiniteHistory);
    }

    let values: Vec<f64> = history.iter().map(|entry| entry.value).collect();
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std_dev = variance.sqrt();
    if std_dev <= f64::EPSILON {
        // A flat history gives no usable z-score.
        return Ok(Vec::new());
    }

    let z_score = (result.value - mean) / std_dev;
    if z_score.abs() <= OUTLIER_Z {
        return Ok(Vec::new());
    }

    let mut confidence = if n >= 10 {
        0.5
    } else if n >= 5 {
        0.4
    } else {
        0.3
    };
    if z_score.abs() > EXTREME_Z {
        confidence *= EXTREME_Z_PENALTY;
    }
    confidence = confidence.min(CONFIDENCE_CAP);

    let mut suggestions = Vec::new();

    let median = median_of(&values);
    suggestions.push(Suggestion {
        kind: SuggestionKind::HistoricalPatternCorrection {
            sample_count: n,
            z_score,
        },
        confidence,
        priority: priority_for(confidence),
        original_value: result.value,
        suggested_value: def.round_for(median, &result.unit),
        suggested_unit: None,
        risk: ImplementationRisk::Medium,
        user_confirmation_required: true,
        auto_apply_eligible: false,
        requires_clinical_review: true,
        justification: format!(
            "{} deviates {:.1} standard deviations from this patient's {n}-point \
             history; the historical median is {median}",
            result.value,
            z_score.abs()
        ),
    });

    // Secondary suggestion: clamp to the 2-sigma envelope on the side the
    // outlier deviates toward.
    let clamped = if z_score > 0.0 {
        mean + 2.0 * std_dev
    } else {
        mean - 2.0 * std_dev
    };
    if def.range_check(clamped, &result.unit).is_in_range() {
        suggestions.push(Suggestion {
            kind: SuggestionKind::StatisticalOutlierCorrection {
                sample_count: n,
                z_score,
            },
            confidence,
            priority: priority_for(confidence),
            original_value: result.value,
            suggested_value: def.round_for(clamped, &result.unit),
            suggested_unit: None,
            risk: ImplementationRisk::Medium,
            user_confirmation_required: true,
            auto_apply_eligible: false,
            requires_clinical_review: false,
            justification: format!(
                "Clamping {} to two standard deviations of this patient's history \
                 gives {clamped}",
                result.value
            ),
        });
    }

    Ok(suggestions)
}

fn median_of(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}
