pub mod definition;
pub mod error;
pub mod registry;
pub mod report;
pub mod result;
pub mod suggestion;

pub use definition::{AlternativeUnit, RangeCheck, TestDefinition, UnitLimits};
pub use error::{ModelError, Result};
pub use registry::{TestRegistry, test_ids};
pub use report::{
    AlertSeverity, ClinicalAlert, ClinicalReport, CorrelationFinding, PanelFinding, PatternClass,
    PatternFinding, RiskAssessment, RiskLevel,
};
pub use result::{
    HistoricalValue, PatientContext, Race, Sex, TestResult, ValidationFlags, ValidationResult,
};
pub use suggestion::{
    CorrectionPackage, DigitFix, GeneratorFault, ImplementationRisk, PackageRisk, Priority,
    RankedSuggestion, Recommendation, Suggestion, SuggestionKind, TranspositionSwap,
};
