//! Ranking, package-level scoring, and recommendation buckets.

use labval_model::{
    ImplementationRisk, PackageRisk, RankedSuggestion, Recommendation, Suggestion,
};

const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Order suggestions best-first and assign 1-based ranks.
///
/// Keys, in order: confidence (descending), priority (high first), then
/// implementation risk (low first). The sort is stable, so generators that
/// emit equal-keyed suggestions keep their emission order.
pub fn rank_suggestions(mut suggestions: Vec<Suggestion>) -> Vec<RankedSuggestion> {
    suggestions.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| b.priority.rank().cmp(&a.priority.rank()))
            .then_with(|| b.risk.inverse_rank().cmp(&a.risk.inverse_rank()))
    });
    suggestions
        .into_iter()
        .enumerate()
        .map(|(index, suggestion)| RankedSuggestion {
            rank: index + 1,
            suggestion,
        })
        .collect()
}

/// Rank-weighted mean confidence. Weight 1 / (rank + 1), so the top
/// suggestion dominates without drowning out the rest. 0.0 when empty.
pub fn overall_confidence(ranked: &[RankedSuggestion]) -> f64 {
    if ranked.is_empty() {
        return 0.0;
    }
    let mut weighted = 0.0;
    let mut weights = 0.0;
    for entry in ranked {
        let weight = 1.0 / (entry.rank as f64 + 1.0);
        weighted += entry.suggestion.confidence * weight;
        weights += weight;
    }
    weighted / weights
}

/// Worst implementation risk present across the package.
pub fn assess_risk(ranked: &[RankedSuggestion]) -> PackageRisk {
    let mut worst: Option<ImplementationRisk> = None;
    for entry in ranked {
        let risk = entry.suggestion.risk;
        worst = Some(match worst {
            Some(current) if current.inverse_rank() <= risk.inverse_rank() => current,
            _ => risk,
        });
    }
    match worst {
        Some(ImplementationRisk::Low) => PackageRisk::Low,
        Some(ImplementationRisk::Medium) => PackageRisk::Medium,
        Some(ImplementationRisk::High) => PackageRisk::High,
        None => PackageRisk::None,
    }
}

/// Recommendation buckets derived from the ranked suggestions.
pub fn recommendations(ranked: &[RankedSuggestion]) -> Vec<Recommendation> {
    let mut out = Vec::new();
    if ranked
        .iter()
        .any(|entry| entry.suggestion.confidence >= HIGH_CONFIDENCE_THRESHOLD)
    {
        out.push(Recommendation {
            category: "high_confidence".to_string(),
            message: "At least one suggestion has high confidence; review the top-ranked \
                      correction first"
                .to_string(),
        });
    }
    if ranked.iter().any(|entry| entry.suggestion.auto_apply_eligible) {
        out.push(Recommendation {
            category: "auto_apply".to_string(),
            message: "One or more suggestions are eligible for automatic application"
                .to_string(),
        });
    }
    if ranked
        .iter()
        .any(|entry| entry.suggestion.requires_clinical_review)
    {
        out.push(Recommendation {
            category: "clinical_review".to_string(),
            message: "Advisory suggestions present; route to a clinician before applying"
                .to_string(),
        });
    }
    if out.is_empty() {
        out.push(Recommendation {
            category: if ranked.is_empty() {
                "no_corrections".to_string()
            } else {
                "manual_review".to_string()
            },
            message: if ranked.is_empty() {
                "No plausible correction was found; verify the entry manually".to_string()
            } else {
                "All suggestions are low confidence; verify against the source document"
                    .to_string()
            },
        });
    }
    out
}
