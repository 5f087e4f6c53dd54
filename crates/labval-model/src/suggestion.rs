//! Correction suggestions and the package returned per validation result.

use serde::{Deserialize, Serialize};

/// Suggestion priority used as a ranking tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Numeric rank for ordering (high sorts first).
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

/// Risk of applying a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImplementationRisk {
    Low,
    Medium,
    High,
}

impl ImplementationRisk {
    /// Inverse rank for ordering: lower risk sorts first.
    pub fn inverse_rank(self) -> u8 {
        match self {
            ImplementationRisk::Low => 3,
            ImplementationRisk::Medium => 2,
            ImplementationRisk::High => 1,
        }
    }
}

/// Worst risk present across a whole package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageRisk {
    Low,
    Medium,
    High,
    None,
}

/// Which swap a digit-transposition suggestion performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "swap")]
pub enum TranspositionSwap {
    /// Adjacent digits at `index` and `index + 1` of the digit string.
    Adjacent { index: usize },
    /// First and last digit of the digit string.
    FirstLast,
}

/// How a digit-correction suggestion repaired the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "fix")]
pub enum DigitFix {
    /// Removed `removed` trailing zeros.
    TrailingZeros { removed: usize },
    /// Inserted a decimal point `position` digits from the left.
    MissingDecimal { position: usize },
}

/// Discriminated suggestion variant; each carries the fields its kind needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SuggestionKind {
    UnitConversion {
        from_unit: String,
        to_unit: String,
        /// Scale change the conversion applies to the raw number.
        ratio: f64,
    },
    DecimalPointCorrection {
        factor: f64,
    },
    DigitTransposition {
        #[serde(flatten)]
        swap: TranspositionSwap,
    },
    DigitCorrection {
        #[serde(flatten)]
        fix: DigitFix,
    },
    HistoricalPatternCorrection {
        sample_count: usize,
        z_score: f64,
    },
    StatisticalOutlierCorrection {
        sample_count: usize,
        z_score: f64,
    },
    LearnedPatternCorrection {
        pattern_id: String,
    },
}

impl SuggestionKind {
    /// Stable label matching the serialized `type` tag.
    pub fn label(&self) -> &'static str {
        match self {
            SuggestionKind::UnitConversion { .. } => "unit_conversion",
            SuggestionKind::DecimalPointCorrection { .. } => "decimal_point_correction",
            SuggestionKind::DigitTransposition { .. } => "digit_transposition",
            SuggestionKind::DigitCorrection { .. } => "digit_correction",
            SuggestionKind::HistoricalPatternCorrection { .. } => "historical_pattern_correction",
            SuggestionKind::StatisticalOutlierCorrection { .. } => "statistical_outlier_correction",
            SuggestionKind::LearnedPatternCorrection { .. } => "learned_pattern_correction",
        }
    }
}

/// One proposed repair for an implausible value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(flatten)]
    pub kind: SuggestionKind,
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub priority: Priority,
    pub original_value: f64,
    pub suggested_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_unit: Option<String>,
    pub risk: ImplementationRisk,
    pub user_confirmation_required: bool,
    pub auto_apply_eligible: bool,
    /// Set for advisory suggestions that must go through a clinician.
    #[serde(default)]
    pub requires_clinical_review: bool,
    pub justification: String,
}

/// A suggestion with its 1-based position after ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedSuggestion {
    pub rank: usize,
    pub suggestion: Suggestion,
}

/// A recommendation bucket attached to a correction package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub message: String,
}

/// A sub-generator failure that was isolated rather than aborting the call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorFault {
    pub generator: String,
    pub message: String,
}

/// Ranked, scored output of one correction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionPackage {
    pub test_id: String,
    pub suggestions: Vec<RankedSuggestion>,
    /// Rank-weighted mean confidence; 0.0 when there are no suggestions.
    pub overall_confidence: f64,
    pub implementation_risk: PackageRisk,
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generator_faults: Vec<GeneratorFault>,
    pub processing_millis: u64,
}

impl CorrectionPackage {
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    pub fn auto_apply_count(&self) -> usize {
        self.suggestions
            .iter()
            .filter(|ranked| ranked.suggestion.auto_apply_eligible)
            .count()
    }

    pub fn top_confidence(&self) -> Option<f64> {
        self.suggestions
            .first()
            .map(|ranked| ranked.suggestion.confidence)
    }
}
