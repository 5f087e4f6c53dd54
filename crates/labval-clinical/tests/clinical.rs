//! End-to-end panel validation.

use std::collections::BTreeMap;

use labval_clinical::validate_clinical_logic;
use labval_model::{
    AlertSeverity, PatientContext, PatternClass, RiskLevel, Sex, TestDefinition, TestRegistry,
    TestResult, test_ids,
};

fn make_result(test_id: &str, value: f64, unit: &str) -> TestResult {
    TestResult {
        test_id: test_id.to_string(),
        value,
        unit: unit.to_string(),
    }
}

#[test]
fn consistent_panel_is_valid_and_low_risk() {
    let registry = TestRegistry::builtin();
    let results = vec![
        make_result(test_ids::GLUCOSE_FASTING, 5.0, "mmol/L"),
        make_result(test_ids::HBA1C, 4.9, "%"),
        make_result(test_ids::SODIUM, 140.0, "mmol/L"),
        make_result(test_ids::POTASSIUM, 4.0, "mmol/L"),
        make_result(test_ids::CHLORIDE, 124.0, "mmol/L"),
    ];
    let report = validate_clinical_logic(&results, None, &registry).expect("validate");

    assert!(report.overall_valid);
    assert_eq!(report.invalid_correlation_count(), 0);
    assert_eq!(report.risk.level, RiskLevel::Low);
    assert_eq!(report.risk.score, 0);
    assert_eq!(
        report.recommendations,
        vec!["No clinical inconsistencies detected".to_string()]
    );
    // Diabetes pattern consulted glucose and HbA1c; both normal.
    let diabetes = report
        .patterns
        .iter()
        .find(|p| p.pattern_id == "diabetes")
        .expect("diabetes pattern");
    assert_eq!(diabetes.classification, PatternClass::Normal);
}

#[test]
fn discordant_panel_collects_warnings_and_risk() {
    let registry = TestRegistry::builtin();
    // Anion gap 36 and a Friedewald mismatch. Only the physiological
    // discordance scores; the panel mismatch still invalidates and warns.
    let results = vec![
        make_result(test_ids::SODIUM, 140.0, "mmol/L"),
        make_result(test_ids::POTASSIUM, 4.0, "mmol/L"),
        make_result(test_ids::CHLORIDE, 100.0, "mmol/L"),
        make_result(test_ids::CHOLESTEROL_TOTAL, 5.0, "mmol/L"),
        make_result(test_ids::HDL, 1.3, "mmol/L"),
        make_result(test_ids::TRIGLYCERIDES, 1.5, "mmol/L"),
        make_result(test_ids::LDL, 3.4, "mmol/L"),
    ];
    let report = validate_clinical_logic(&results, None, &registry).expect("validate");

    assert!(!report.overall_valid);
    assert_eq!(report.invalid_correlation_count(), 1);
    assert_eq!(report.risk.score, 2);
    assert_eq!(report.risk.level, RiskLevel::Moderate);
    let warnings = report
        .alerts
        .iter()
        .filter(|alert| alert.severity == AlertSeverity::Warning)
        .count();
    assert_eq!(warnings, 2);
    assert!(report.recommendations.len() >= 2);
}

#[test]
fn panel_mismatch_alone_invalidates_without_raising_risk() {
    let registry = TestRegistry::builtin();
    let results = vec![
        make_result(test_ids::CHOLESTEROL_TOTAL, 5.0, "mmol/L"),
        make_result(test_ids::HDL, 1.3, "mmol/L"),
        make_result(test_ids::TRIGLYCERIDES, 1.5, "mmol/L"),
        make_result(test_ids::LDL, 3.4, "mmol/L"),
    ];
    let report = validate_clinical_logic(&results, None, &registry).expect("validate");

    assert!(!report.overall_valid);
    assert_eq!(report.invalid_correlation_count(), 0);
    assert_eq!(report.risk.score, 0);
    assert_eq!(report.risk.level, RiskLevel::Low);
}

#[test]
fn diabetes_diagnosis_raises_a_critical_alert_without_invalidating() {
    let registry = TestRegistry::builtin();
    let results = vec![make_result(test_ids::GLUCOSE_FASTING, 7.2, "mmol/L")];
    let report = validate_clinical_logic(&results, None, &registry).expect("validate");

    // Patterns classify; they never invalidate the panel.
    assert!(report.overall_valid);
    assert_eq!(report.critical_alert_count(), 1);
    assert_eq!(report.alerts[0].source, "diabetes");
    assert!(
        report
            .recommendations
            .iter()
            .any(|rec| rec.contains("ordering clinician"))
    );
}

#[test]
fn egfr_rule_runs_with_demographics_and_converted_units() {
    let registry = TestRegistry::builtin();
    // Creatinine reported in mg/dL; canonicalized to 88.4 umol/L.
    let results = vec![
        make_result(test_ids::CREATININE, 1.0, "mg/dL"),
        make_result(test_ids::EGFR, 86.0, "mL/min/1.73m2"),
    ];
    let patient = PatientContext {
        age: Some(50),
        sex: Some(Sex::Male),
        race: None,
    };
    let report = validate_clinical_logic(&results, Some(&patient), &registry).expect("validate");

    let egfr = report
        .correlations
        .iter()
        .find(|c| c.rule_id == "creatinine_egfr")
        .expect("egfr rule fired");
    assert!(egfr.valid);
    assert!((egfr.expected.unwrap() - 87.37).abs() < 0.05);

    // Without demographics the same rule is skipped, not failed.
    let report = validate_clinical_logic(&results, None, &registry).expect("validate");
    assert!(
        report
            .correlations
            .iter()
            .all(|c| c.rule_id != "creatinine_egfr")
    );
    assert!(report.skipped.iter().any(|s| s.contains("creatinine_egfr")));
    assert!(report.overall_valid);
}

#[test]
fn external_registry_ids_validate_without_panicking() {
    let mut registry = TestRegistry::builtin();
    registry.insert(TestDefinition {
        test_id: "漢test".to_string(),
        name: "External assay".to_string(),
        primary_unit: "mmol/L".to_string(),
        primary_precision: 2,
        alternative_units: vec![],
        limits: BTreeMap::new(),
    });
    let results = vec![make_result("漢test", 1.0, "mmol/L")];
    let report = validate_clinical_logic(&results, None, &registry).expect("validate");
    assert!(report.overall_valid);
    assert_eq!(report.panels.len(), 1);
    assert_eq!(report.panels[0].panel, "漢t");
}

#[test]
fn unknown_tests_are_skipped_not_fatal() {
    let registry = TestRegistry::builtin();
    let results = vec![
        make_result("xx_unknown", 1.0, "mmol/L"),
        make_result(test_ids::SODIUM, 140.0, "mmol/L"),
    ];
    let report = validate_clinical_logic(&results, None, &registry).expect("validate");
    assert!(report.overall_valid);
    assert!(report.skipped.iter().any(|s| s.contains("xx_unknown")));
    assert_eq!(report.panels.len(), 1);
}
