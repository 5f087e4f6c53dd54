//! Serde round-trips for the externally visible model types.

use labval_model::{
    HistoricalValue, ImplementationRisk, PatientContext, Priority, Race, Sex, Suggestion,
    SuggestionKind, TestResult, ValidationFlags, ValidationResult,
};

#[test]
fn validation_result_round_trips() {
    let result = ValidationResult {
        test_id: "ch_glucose_fasting".to_string(),
        value: 126.0,
        unit: "mg/dL".to_string(),
        patient_id: "P-0001".to_string(),
        flags: ValidationFlags {
            unit_valid: false,
            range_valid: true,
        },
    };
    let json = serde_json::to_string(&result).expect("serialize result");
    let round: ValidationResult = serde_json::from_str(&json).expect("deserialize result");
    assert_eq!(round.test_id, result.test_id);
    assert!(!round.flags.unit_valid);
    assert!(round.flags.range_valid);
}

#[test]
fn patient_context_omits_absent_fields() {
    let patient = PatientContext {
        age: Some(50),
        sex: Some(Sex::Male),
        race: None,
    };
    let json = serde_json::to_value(&patient).expect("serialize patient");
    assert_eq!(json["age"], 50);
    assert_eq!(json["sex"], "male");
    assert!(json.get("race").is_none());

    let with_race: PatientContext =
        serde_json::from_str(r#"{"age": 50, "sex": "female", "race": "black"}"#)
            .expect("deserialize patient");
    assert_eq!(with_race.race, Some(Race::Black));
}

#[test]
fn suggestion_round_trips_through_tagged_kind() {
    let suggestion = Suggestion {
        kind: SuggestionKind::UnitConversion {
            from_unit: "mg/dL".to_string(),
            to_unit: "mmol/L".to_string(),
            ratio: 1.0 / 18.016,
        },
        confidence: 0.95,
        priority: Priority::High,
        original_value: 126.0,
        suggested_value: 6.99,
        suggested_unit: Some("mmol/L".to_string()),
        risk: ImplementationRisk::Low,
        user_confirmation_required: false,
        auto_apply_eligible: true,
        requires_clinical_review: false,
        justification: "Converted value lands in the physiological range".to_string(),
    };
    let json = serde_json::to_value(&suggestion).expect("serialize suggestion");
    assert_eq!(json["type"], "unit_conversion");
    assert_eq!(json["to_unit"], "mmol/L");
    let round: Suggestion = serde_json::from_value(json).expect("deserialize suggestion");
    assert_eq!(round, suggestion);
}

#[test]
fn panel_input_shapes_parse() {
    let results: Vec<TestResult> = serde_json::from_str(
        r#"[
            {"test_id": "el_sodium", "value": 140.0, "unit": "mmol/L"},
            {"test_id": "el_potassium", "value": 4.0, "unit": "mmol/L"}
        ]"#,
    )
    .expect("deserialize results");
    assert_eq!(results.len(), 2);

    let history: Vec<HistoricalValue> = serde_json::from_str(
        r#"[{"value": 5.1}, {"value": 5.3, "collected_at": "2026-07-14T08:00:00Z"}]"#,
    )
    .expect("deserialize history");
    assert_eq!(history.len(), 2);
    assert!(history[0].collected_at.is_none());
}
