//! Clinical plausibility validator.
//!
//! Takes a visit's test results, runs cross-test correlation rules, disease
//! patterns, and panel consistency checks, and aggregates everything into a
//! [`ClinicalReport`](labval_model::ClinicalReport) with alerts and a risk
//! assessment. Values are canonicalized to each test's primary unit before
//! any rule runs.

pub mod correlations;
pub mod error;
pub mod index;
pub mod panels;
pub mod patterns;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use labval_model::{
    AlertSeverity, ClinicalAlert, ClinicalReport, PatientContext, RiskAssessment, RiskLevel,
    TestRegistry, TestResult,
};

pub use error::{ClinicalError, Result};
pub use index::PanelIndex;

const DISCORDANCE_WEIGHT: u32 = 2;

const REPORT_SCHEMA: &str = "labval.clinical-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct ClinicalReportEnvelope<'a> {
    schema: &'static str,
    schema_version: u32,
    generated_at: DateTime<Utc>,
    report: &'a ClinicalReport,
}

/// Validate the clinical plausibility of one panel of results.
///
/// Rules that cannot run (missing tests, missing demographics, values that
/// cannot be canonicalized) are reported in `skipped`; they never abort the
/// validation.
#[instrument(skip_all, fields(results = results.len()))]
pub fn validate_clinical_logic(
    results: &[TestResult],
    patient: Option<&PatientContext>,
    registry: &TestRegistry,
) -> Result<ClinicalReport> {
    let mut index = PanelIndex::build(results, registry);
    let mut skipped = Vec::new();

    let correlations = correlations::run_all(&index, patient, &mut skipped);
    let patterns = patterns::run_all(&index);
    let panel_findings = panels::run_all(&index);
    skipped.append(index.skipped_mut());

    let mut alerts = Vec::new();
    for finding in correlations.iter().filter(|finding| !finding.valid) {
        alerts.push(ClinicalAlert {
            severity: AlertSeverity::Warning,
            source: finding.rule_id.clone(),
            message: finding.interpretation.clone(),
        });
    }
    for finding in panel_findings.iter().filter(|f| f.checked && !f.valid) {
        alerts.push(ClinicalAlert {
            severity: AlertSeverity::Warning,
            source: format!("{}_panel", finding.panel),
            message: finding
                .interpretation
                .clone()
                .unwrap_or_else(|| "panel_inconsistency".to_string()),
        });
    }
    for finding in patterns.iter().filter(|finding| finding.is_diagnostic()) {
        alerts.push(ClinicalAlert {
            severity: AlertSeverity::Critical,
            source: finding.pattern_id.clone(),
            message: format!("{}_diagnostic_criteria_met", finding.pattern_id),
        });
    }

    let physiological_discordances =
        correlations.iter().filter(|finding| !finding.valid).count();
    let panel_discordances = panel_findings
        .iter()
        .filter(|finding| finding.checked && !finding.valid)
        .count();
    // Only physiological discordances feed the risk score; panel
    // inconsistencies invalidate the report without raising it.
    let risk = assess_risk(physiological_discordances as u32);
    let overall_valid = physiological_discordances == 0 && panel_discordances == 0;

    let mut recommendations = Vec::new();
    for finding in correlations.iter().filter(|finding| !finding.valid) {
        recommendations.push(format!(
            "Review {} results: {}",
            finding.rule_id, finding.interpretation
        ));
    }
    for finding in panel_findings.iter().filter(|f| f.checked && !f.valid) {
        recommendations.push(format!(
            "Re-run the {} panel or verify the reported values",
            finding.panel
        ));
    }
    if alerts
        .iter()
        .any(|alert| alert.severity == AlertSeverity::Critical)
    {
        recommendations.push("Escalate diagnostic findings to the ordering clinician".to_string());
    }
    if recommendations.is_empty() {
        recommendations.push("No clinical inconsistencies detected".to_string());
    }

    debug!(
        overall_valid,
        physiological_discordances,
        panel_discordances,
        alerts = alerts.len(),
        skipped = skipped.len(),
        "clinical validation complete"
    );

    Ok(ClinicalReport {
        overall_valid,
        correlations,
        patterns,
        panels: panel_findings,
        alerts,
        recommendations,
        risk,
        skipped,
    })
}

/// Risk score: every physiological discordance adds a fixed weight, then the
/// total is bucketed.
fn assess_risk(discordances: u32) -> RiskAssessment {
    let score = discordances * DISCORDANCE_WEIGHT;
    let (level, actions) = match score {
        0 => (RiskLevel::Low, vec!["release_results".to_string()]),
        1..=2 => (
            RiskLevel::Moderate,
            vec!["review_flagged_correlations".to_string()],
        ),
        3..=5 => (
            RiskLevel::High,
            vec!["hold_panel_for_clinical_review".to_string()],
        ),
        _ => (
            RiskLevel::Critical,
            vec![
                "hold_panel_for_clinical_review".to_string(),
                "notify_ordering_clinician".to_string(),
            ],
        ),
    };
    RiskAssessment {
        score,
        level,
        actions,
    }
}

/// Write a clinical report to `path` as a versioned JSON document.
pub fn write_clinical_report_json(report: &ClinicalReport, path: &Path) -> Result<()> {
    let envelope = ClinicalReportEnvelope {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now(),
        report,
    };
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &envelope)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
