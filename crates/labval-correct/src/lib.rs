//! Automated correction engine for implausible laboratory values.
//!
//! Given a validation result whose unit or range check failed, the engine
//! runs a set of independent sub-generators (unit conversion, decimal-point
//! shifts, digit transpositions, digit-level repairs, historical-pattern
//! outlier handling, and learned patterns), ranks the surviving suggestions,
//! and returns a scored [`CorrectionPackage`](labval_model::CorrectionPackage).

pub mod digits;
pub mod engine;
pub mod error;
pub mod generators;
pub mod rank;
pub mod state;

pub use engine::{CorrectionEngine, write_correction_report_json};
pub use error::{CorrectError, GeneratorError, Result};
pub use state::{
    AttemptRecord, CorrectionStatistics, FeedbackRecord, HISTORY_CAP, LearnedPattern,
    LearningStore,
};
