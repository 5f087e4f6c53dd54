//! End-to-end engine behavior: gating, fault isolation, the history cap,
//! statistics, and feedback.

use chrono::{Duration, Utc};

use labval_correct::{CorrectError, CorrectionEngine, FeedbackRecord, HISTORY_CAP};
use labval_model::{
    HistoricalValue, PackageRisk, SuggestionKind, TestRegistry, ValidationFlags, ValidationResult,
    test_ids,
};

fn make_result(test_id: &str, value: f64, unit: &str, flags: ValidationFlags) -> ValidationResult {
    ValidationResult {
        test_id: test_id.to_string(),
        value,
        unit: unit.to_string(),
        patient_id: "P-0001".to_string(),
        flags,
    }
}

fn unit_invalid() -> ValidationFlags {
    ValidationFlags {
        unit_valid: false,
        range_valid: true,
    }
}

fn range_invalid() -> ValidationFlags {
    ValidationFlags {
        unit_valid: true,
        range_valid: false,
    }
}

#[test]
fn unit_mismatch_yields_auto_apply_conversion() {
    let mut engine = CorrectionEngine::new(TestRegistry::builtin());
    let result = make_result(test_ids::GLUCOSE_FASTING, 126.0, "mg/dL", unit_invalid());
    let package = engine.generate(&result, None, &[]).expect("generate");

    assert_eq!(package.suggestions.len(), 1);
    let top = &package.suggestions[0];
    assert_eq!(top.rank, 1);
    assert!(matches!(
        top.suggestion.kind,
        SuggestionKind::UnitConversion { .. }
    ));
    assert_eq!(top.suggestion.suggested_value, 6.99);
    assert_eq!(top.suggestion.suggested_unit.as_deref(), Some("mmol/L"));
    assert!((top.suggestion.confidence - 0.95).abs() < 1e-9);
    assert!(top.suggestion.auto_apply_eligible);
    assert_eq!(package.implementation_risk, PackageRisk::Low);

    let categories: Vec<&str> = package
        .recommendations
        .iter()
        .map(|rec| rec.category.as_str())
        .collect();
    assert!(categories.contains(&"high_confidence"));
    assert!(categories.contains(&"auto_apply"));
}

#[test]
fn generator_failure_is_isolated_from_the_others() {
    let mut engine = CorrectionEngine::new(TestRegistry::builtin());
    let result = make_result(test_ids::GLUCOSE_FASTING, 70.0, "mmol/L", range_invalid());
    let priors: Vec<HistoricalValue> = [5.0, f64::NAN, 4.8]
        .iter()
        .map(|&value| HistoricalValue {
            value,
            collected_at: None,
        })
        .collect();

    let package = engine.generate(&result, None, &priors).expect("generate");

    // The historical generator fails on the NaN prior; the digit-level
    // generators still produce their suggestions.
    assert_eq!(package.generator_faults.len(), 1);
    assert_eq!(package.generator_faults[0].generator, "historical");
    assert!(!package.suggestions.is_empty());
    assert!((package.top_confidence().expect("top") - 0.85).abs() < 1e-9);
}

#[test]
fn unknown_test_yields_an_empty_package() {
    let mut engine = CorrectionEngine::new(TestRegistry::builtin());
    let result = make_result("xx_unknown", 42.0, "mmol/L", range_invalid());
    let package = engine.generate(&result, None, &[]).expect("generate");
    assert!(package.is_empty());
    assert_eq!(package.overall_confidence, 0.0);
    assert_eq!(package.implementation_risk, PackageRisk::None);
    assert_eq!(package.recommendations[0].category, "no_corrections");
}

#[test]
fn non_finite_value_is_a_request_error() {
    let mut engine = CorrectionEngine::new(TestRegistry::builtin());
    let result = make_result(
        test_ids::GLUCOSE_FASTING,
        f64::INFINITY,
        "mmol/L",
        range_invalid(),
    );
    let error = engine.generate(&result, None, &[]).unwrap_err();
    assert!(matches!(error, CorrectError::NonFiniteValue { .. }));
}

#[test]
fn attempt_history_is_capped() {
    let mut engine = CorrectionEngine::new(TestRegistry::builtin());
    let result = make_result("xx_unknown", 1.0, "mmol/L", range_invalid());
    for _ in 0..HISTORY_CAP + 5 {
        engine.generate(&result, None, &[]).expect("generate");
    }
    assert_eq!(engine.history_len(), HISTORY_CAP);
}

#[test]
fn statistics_cover_recent_attempts() {
    let mut engine = CorrectionEngine::new(TestRegistry::builtin());
    let flagged = make_result(test_ids::GLUCOSE_FASTING, 126.0, "mg/dL", unit_invalid());
    let unknown = make_result("xx_unknown", 1.0, "mmol/L", range_invalid());
    engine.generate(&flagged, None, &[]).expect("generate");
    engine.generate(&unknown, None, &[]).expect("generate");

    let stats = engine.statistics(Duration::hours(1));
    assert_eq!(stats.attempts, 2);
    assert_eq!(stats.with_suggestions, 1);
    assert_eq!(stats.total_suggestions, 1);
    assert_eq!(stats.auto_apply_eligible, 1);
    assert!(stats.by_kind.is_none());

    let stats = engine.statistics(Duration::zero());
    assert_eq!(stats.attempts, 0);
    assert!(stats.mean_overall_confidence.is_none());
}

#[test]
fn feedback_is_stored_without_changing_success_rates() {
    let mut engine = CorrectionEngine::new(TestRegistry::builtin());
    engine.record_feedback(FeedbackRecord {
        correction_id: "corr-42".to_string(),
        applied: true,
        successful: true,
        feedback: Some("looked right".to_string()),
        received_at: Utc::now(),
    });
    assert_eq!(engine.learning().user_feedback.len(), 1);
    assert!(engine.learning().pattern_success_rates.is_empty());
}
