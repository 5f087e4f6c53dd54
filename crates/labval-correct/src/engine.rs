//! The correction engine: gates the sub-generators on the validation flags,
//! isolates their failures, ranks what survives, and keeps running
//! statistics over its own attempts.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use labval_model::{
    CorrectionPackage, GeneratorFault, HistoricalValue, PatientContext, Suggestion, TestRegistry,
    ValidationResult,
};

use crate::error::{CorrectError, GeneratorError, Result};
use crate::generators;
use crate::rank;
use crate::state::{
    AttemptRecord, CorrectionStatistics, FeedbackRecord, LearningStore, push_capped,
    statistics_for,
};

/// Serialized envelope for a correction report written to disk.
#[derive(Serialize)]
struct CorrectionReport<'a> {
    schema: &'static str,
    schema_version: u32,
    generated_at: DateTime<Utc>,
    package: &'a CorrectionPackage,
}

const REPORT_SCHEMA: &str = "labval.correction-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

/// Stateful correction engine.
///
/// Owns the test registry, a capped history of its own attempts, and the
/// learning store. All methods take `&mut self`; callers that share an
/// engine across threads wrap it themselves.
pub struct CorrectionEngine {
    registry: TestRegistry,
    history: VecDeque<AttemptRecord>,
    learning: LearningStore,
}

impl CorrectionEngine {
    pub fn new(registry: TestRegistry) -> Self {
        Self {
            registry,
            history: VecDeque::new(),
            learning: LearningStore::default(),
        }
    }

    pub fn registry(&self) -> &TestRegistry {
        &self.registry
    }

    /// Generate a ranked correction package for one flagged result.
    ///
    /// Generators are gated on the validation flags: the unit generator runs
    /// only when the unit is invalid, the value-level generators only when
    /// the range is invalid. A generator failure is recorded as a fault on
    /// the package instead of aborting the other generators.
    #[instrument(skip_all, fields(test_id = %result.test_id, value = result.value))]
    pub fn generate(
        &mut self,
        result: &ValidationResult,
        patient: Option<&PatientContext>,
        prior_values: &[HistoricalValue],
    ) -> Result<CorrectionPackage> {
        if !result.value.is_finite() {
            return Err(CorrectError::NonFiniteValue {
                test_id: result.test_id.clone(),
            });
        }

        let started = Instant::now();
        let Some(def) = self.registry.get(&result.test_id) else {
            warn!(test_id = %result.test_id, "no test definition; nothing to correct");
            let package = finalize(&result.test_id, Vec::new(), Vec::new(), started);
            push_capped(&mut self.history, AttemptRecord::from_package(&package));
            return Ok(package);
        };

        let mut suggestions: Vec<Suggestion> = Vec::new();
        let mut faults: Vec<GeneratorFault> = Vec::new();
        let mut run = |name: &str, outcome: std::result::Result<Vec<Suggestion>, GeneratorError>| {
            match outcome {
                Ok(generated) => suggestions.extend(generated),
                Err(error) => {
                    warn!(generator = name, %error, "generator failed; isolating");
                    faults.push(GeneratorFault {
                        generator: name.to_string(),
                        message: error.to_string(),
                    });
                }
            }
        };

        if !result.flags.unit_valid {
            run("unit", generators::unit::suggest(result, def));
        }
        if !result.flags.range_valid {
            run("decimal", generators::decimal::suggest(result, def));
            run("transposition", generators::transposition::suggest(result, def));
            run("digit", generators::digit::suggest(result, def));
            run(
                "historical",
                generators::historical::suggest(result, def, prior_values),
            );
            run(
                "learned",
                generators::learned::suggest(
                    result,
                    self.learning.pattern_success_rates.values(),
                    patient,
                ),
            );
        }

        let package = finalize(&result.test_id, suggestions, faults, started);
        debug!(
            suggestions = package.suggestions.len(),
            faults = package.generator_faults.len(),
            overall_confidence = package.overall_confidence,
            "correction package built"
        );
        push_capped(&mut self.history, AttemptRecord::from_package(&package));
        Ok(package)
    }

    /// Record user feedback on an issued correction.
    ///
    /// Feedback is appended to the store; folding it into pattern success
    /// rates needs the applicability model and is not yet supported.
    pub fn record_feedback(&mut self, feedback: FeedbackRecord) {
        debug!(
            correction_id = %feedback.correction_id,
            applied = feedback.applied,
            successful = feedback.successful,
            "feedback recorded; success-rate update not yet supported"
        );
        self.learning.user_feedback.push(feedback);
    }

    pub fn learning(&self) -> &LearningStore {
        &self.learning
    }

    pub fn learning_mut(&mut self) -> &mut LearningStore {
        &mut self.learning
    }

    /// Attempts retained in the capped history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Aggregate statistics over attempts within the given timeframe.
    pub fn statistics(&self, timeframe: Duration) -> CorrectionStatistics {
        statistics_for(&self.history, timeframe)
    }
}

fn finalize(
    test_id: &str,
    suggestions: Vec<Suggestion>,
    faults: Vec<GeneratorFault>,
    started: Instant,
) -> CorrectionPackage {
    let ranked = rank::rank_suggestions(suggestions);
    let overall_confidence = rank::overall_confidence(&ranked);
    let implementation_risk = rank::assess_risk(&ranked);
    let recommendations = rank::recommendations(&ranked);
    CorrectionPackage {
        test_id: test_id.to_string(),
        suggestions: ranked,
        overall_confidence,
        implementation_risk,
        recommendations,
        generator_faults: faults,
        processing_millis: started.elapsed().as_millis() as u64,
    }
}

/// Write a correction package to `path` as a versioned JSON report.
pub fn write_correction_report_json(package: &CorrectionPackage, path: &Path) -> Result<()> {
    let report = CorrectionReport {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now(),
        package,
    };
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
