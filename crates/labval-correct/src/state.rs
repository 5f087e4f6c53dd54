//! Engine-held aggregate state: the capped attempt history and the
//! learning store fed by user feedback.
//!
//! Both are append/update-only and owned by the `CorrectionEngine`; sharing
//! an engine across threads requires an external lock or a per-request
//! instance.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use labval_model::CorrectionPackage;

/// Maximum retained correction attempts; oldest entries are dropped first.
pub const HISTORY_CAP: usize = 1000;

/// Summary of one correction attempt. Only statistics are retained; the
/// suggestions themselves are never persisted by the engine.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    pub recorded_at: DateTime<Utc>,
    pub test_id: String,
    pub suggestion_count: usize,
    pub top_confidence: Option<f64>,
    pub overall_confidence: f64,
    pub auto_apply_count: usize,
    /// Serialized `type` tags of the suggestions, in rank order.
    pub kinds: Vec<String>,
}

impl AttemptRecord {
    pub fn from_package(package: &CorrectionPackage) -> Self {
        Self {
            recorded_at: Utc::now(),
            test_id: package.test_id.clone(),
            suggestion_count: package.suggestions.len(),
            top_confidence: package.top_confidence(),
            overall_confidence: package.overall_confidence,
            auto_apply_count: package.auto_apply_count(),
            kinds: package
                .suggestions
                .iter()
                .map(|ranked| ranked.suggestion.kind.label().to_string())
                .collect(),
        }
    }
}

/// A learned correction pattern with its observed success rate.
#[derive(Debug, Clone, Serialize)]
pub struct LearnedPattern {
    pub pattern_id: String,
    pub test_id: String,
    pub success_rate: f64,
}

/// One piece of user feedback on an issued correction.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRecord {
    pub correction_id: String,
    pub applied: bool,
    pub successful: bool,
    pub feedback: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// Learning store: pattern success rates plus the raw feedback feed.
#[derive(Debug, Clone, Default)]
pub struct LearningStore {
    pub pattern_success_rates: BTreeMap<String, LearnedPattern>,
    pub user_feedback: Vec<FeedbackRecord>,
}

/// Append to a capped history, dropping the oldest entry when full.
pub(crate) fn push_capped(history: &mut VecDeque<AttemptRecord>, record: AttemptRecord) {
    if history.len() == HISTORY_CAP {
        history.pop_front();
    }
    history.push_back(record);
}

/// Aggregate metrics over the attempts within a timeframe.
#[derive(Debug, Clone, Serialize)]
pub struct CorrectionStatistics {
    pub attempts: usize,
    pub with_suggestions: usize,
    pub total_suggestions: usize,
    pub auto_apply_eligible: usize,
    pub mean_overall_confidence: Option<f64>,
    /// Per-kind breakdown is not yet supported.
    pub by_kind: Option<BTreeMap<String, u64>>,
}

pub(crate) fn statistics_for(
    history: &VecDeque<AttemptRecord>,
    timeframe: Duration,
) -> CorrectionStatistics {
    let cutoff = Utc::now() - timeframe;
    let window: Vec<&AttemptRecord> = history
        .iter()
        .filter(|record| record.recorded_at >= cutoff)
        .collect();

    let attempts = window.len();
    let with_suggestions = window
        .iter()
        .filter(|record| record.suggestion_count > 0)
        .count();
    let total_suggestions = window.iter().map(|record| record.suggestion_count).sum();
    let auto_apply_eligible = window.iter().map(|record| record.auto_apply_count).sum();
    let mean_overall_confidence = if attempts == 0 {
        None
    } else {
        Some(window.iter().map(|record| record.overall_confidence).sum::<f64>() / attempts as f64)
    };

    CorrectionStatistics {
        attempts,
        with_suggestions,
        total_suggestions,
        auto_apply_eligible,
        mean_overall_confidence,
        by_kind: None,
    }
}
