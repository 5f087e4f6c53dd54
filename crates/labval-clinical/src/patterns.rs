//! Disease-pattern classification.
//!
//! Patterns classify the panel; they never mark it invalid. Only the
//! diabetes pattern has validated thresholds today. The cardiac, liver, and
//! thyroid patterns are declared with their supporting tests but classify
//! as `Unsupported` until thresholds are configured.

use tracing::debug;

use labval_model::{PatternClass, PatternFinding, test_ids};

use crate::index::PanelIndex;

const FASTING_DIAGNOSTIC: f64 = 7.0;
const FASTING_IMPAIRED: f64 = 6.1;
const TWO_HOUR_DIAGNOSTIC: f64 = 11.1;
const TWO_HOUR_IMPAIRED: f64 = 7.8;
const HBA1C_DIAGNOSTIC: f64 = 6.5;
const HBA1C_IMPAIRED: f64 = 5.7;

pub fn run_all(index: &PanelIndex) -> Vec<PatternFinding> {
    let mut findings = Vec::new();
    findings.extend(diabetes(index));
    findings.extend(unsupported(
        index,
        "acute_mi",
        &[test_ids::TROPONIN, test_ids::CK_MB],
    ));
    findings.extend(unsupported(
        index,
        "liver_injury",
        &[test_ids::ALT, test_ids::AST, test_ids::BILIRUBIN_TOTAL],
    ));
    findings.extend(unsupported(
        index,
        "thyroid_dysfunction",
        &[test_ids::TSH, test_ids::FT4],
    ));
    debug!(count = findings.len(), "disease patterns evaluated");
    findings
}

/// ADA-style diabetes screening. One diagnostic finding is sufficient for
/// the `Diabetic` classification.
fn diabetes(index: &PanelIndex) -> Option<PatternFinding> {
    let criteria = [
        (test_ids::GLUCOSE_FASTING, FASTING_DIAGNOSTIC, FASTING_IMPAIRED),
        (test_ids::GLUCOSE_2H, TWO_HOUR_DIAGNOSTIC, TWO_HOUR_IMPAIRED),
        (test_ids::HBA1C, HBA1C_DIAGNOSTIC, HBA1C_IMPAIRED),
    ];

    let mut supporting = Vec::new();
    let mut diagnostic_hits = Vec::new();
    let mut impaired = false;
    for (test_id, diagnostic, impaired_threshold) in criteria {
        let Some(value) = index.get(test_id) else {
            continue;
        };
        supporting.push(test_id.to_string());
        if value >= diagnostic {
            diagnostic_hits.push(test_id.to_string());
        } else if value >= impaired_threshold {
            impaired = true;
        }
    }
    if supporting.is_empty() {
        return None;
    }

    let classification = if !diagnostic_hits.is_empty() {
        PatternClass::Diabetic
    } else if impaired {
        PatternClass::Prediabetic
    } else {
        PatternClass::Normal
    };
    Some(PatternFinding {
        pattern_id: "diabetes".to_string(),
        classification,
        diagnostic_hits,
        supporting_tests: supporting,
        note: None,
    })
}

fn unsupported(index: &PanelIndex, pattern_id: &str, tests: &[&str]) -> Option<PatternFinding> {
    let supporting: Vec<String> = tests
        .iter()
        .filter(|test_id| index.contains(test_id))
        .map(|test_id| (*test_id).to_string())
        .collect();
    if supporting.is_empty() {
        return None;
    }
    Some(PatternFinding {
        pattern_id: pattern_id.to_string(),
        classification: PatternClass::Unsupported,
        diagnostic_hits: Vec::new(),
        supporting_tests: supporting,
        note: Some("no validated thresholds configured for this pattern".to_string()),
    })
}
