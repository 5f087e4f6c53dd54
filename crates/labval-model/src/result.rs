//! Input types supplied by upstream collaborators.
//!
//! `ValidationResult` comes from the range/unit validator and is never
//! mutated here; historical values come from the results store; the patient
//! context is read-only demographic data consumed by formulas.

use serde::{Deserialize, Serialize};

/// Per-check flags produced by the upstream range/unit validator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValidationFlags {
    pub unit_valid: bool,
    pub range_valid: bool,
}

/// One validated test result, as delivered by the upstream validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub test_id: String,
    pub value: f64,
    pub unit: String,
    pub patient_id: String,
    pub flags: ValidationFlags,
}

/// One test result within a visit panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub test_id: String,
    pub value: f64,
    pub unit: String,
}

/// A prior value for the same patient and test, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalValue {
    pub value: f64,
    /// ISO 8601 collection timestamp, when the store provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Race {
    Black,
    Other,
}

/// Demographics consumed by clinical formulas (e.g., CKD-EPI).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PatientContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race: Option<Race>,
}
