//! Clinical validation findings, alerts, and the per-panel report.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

/// An alert raised while validating a panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalAlert {
    pub severity: AlertSeverity,
    /// Rule or pattern that raised the alert.
    pub source: String,
    pub message: String,
}

/// Result of one physiological correlation rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationFinding {
    pub rule_id: String,
    pub test_ids: Vec<String>,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difference: Option<f64>,
    /// Snake_case interpretation token (e.g.,
    /// "significantly_elevated_anion_gap_investigate_acidosis").
    pub interpretation: String,
}

/// Classification produced by a disease pattern. Patterns classify; they
/// never mark the panel invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternClass {
    Diabetic,
    Prediabetic,
    Normal,
    /// Scoring thresholds for this pattern are not yet specified.
    Unsupported,
}

/// Result of one disease-pattern check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternFinding {
    pub pattern_id: String,
    pub classification: PatternClass,
    /// Tests that individually met a diagnostic criterion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostic_hits: Vec<String>,
    /// Tests the pattern consulted.
    pub supporting_tests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl PatternFinding {
    pub fn is_diagnostic(&self) -> bool {
        self.classification == PatternClass::Diabetic
    }
}

/// Result of one within-panel consistency check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelFinding {
    /// Two-character panel prefix (e.g., "lp").
    pub panel: String,
    pub valid: bool,
    /// False when the panel has no real checker or inputs were incomplete.
    pub checked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difference: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

/// Aggregate risk for one panel validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u32,
    pub level: RiskLevel,
    pub actions: Vec<String>,
}

/// Full output of `validate_clinical_logic` for one panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalReport {
    pub overall_valid: bool,
    pub correlations: Vec<CorrelationFinding>,
    pub patterns: Vec<PatternFinding>,
    pub panels: Vec<PanelFinding>,
    pub alerts: Vec<ClinicalAlert>,
    pub recommendations: Vec<String>,
    pub risk: RiskAssessment,
    /// Rules that could not run (missing tests, missing demographics,
    /// unconvertible units), with the reason.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl ClinicalReport {
    pub fn invalid_correlation_count(&self) -> usize {
        self.correlations.iter().filter(|c| !c.valid).count()
    }

    pub fn critical_alert_count(&self) -> usize {
        self.alerts
            .iter()
            .filter(|alert| alert.severity == AlertSeverity::Critical)
            .count()
    }
}
