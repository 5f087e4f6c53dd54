//! Within-panel consistency checks, keyed by the two-character test-id
//! prefix. Only the lipid panel has a real checker today; other panels are
//! reported unchecked and pass by default.

use tracing::debug;

use labval_model::{PanelFinding, test_ids};

use crate::index::PanelIndex;

const LIPID_PREFIX: &str = "lp";
/// Friedewald: LDL = total cholesterol - HDL - triglycerides / 2.2 (mmol/L).
const FRIEDEWALD_TG_DIVISOR: f64 = 2.2;
const FRIEDEWALD_TOLERANCE: f64 = 0.3;

pub fn run_all(index: &PanelIndex) -> Vec<PanelFinding> {
    let mut findings = Vec::new();
    for (panel, tests) in index.panels() {
        let finding = if panel == LIPID_PREFIX {
            lipid_panel(index)
        } else {
            PanelFinding {
                panel: panel.clone(),
                valid: true,
                checked: false,
                expected: None,
                actual: None,
                difference: None,
                interpretation: None,
            }
        };
        debug!(panel = %panel, tests = tests.len(), checked = finding.checked, "panel grouped");
        findings.push(finding);
    }
    findings
}

fn lipid_panel(index: &PanelIndex) -> PanelFinding {
    let complete = (|| {
        let total = index.get(test_ids::CHOLESTEROL_TOTAL)?;
        let hdl = index.get(test_ids::HDL)?;
        let triglycerides = index.get(test_ids::TRIGLYCERIDES)?;
        let reported_ldl = index.get(test_ids::LDL)?;
        Some((total, hdl, triglycerides, reported_ldl))
    })();

    let Some((total, hdl, triglycerides, reported_ldl)) = complete else {
        return PanelFinding {
            panel: LIPID_PREFIX.to_string(),
            valid: true,
            checked: false,
            expected: None,
            actual: None,
            difference: None,
            interpretation: Some("incomplete_lipid_panel".to_string()),
        };
    };

    let expected_ldl = total - hdl - triglycerides / FRIEDEWALD_TG_DIVISOR;
    let difference = (reported_ldl - expected_ldl).abs();
    let valid = difference <= FRIEDEWALD_TOLERANCE;
    PanelFinding {
        panel: LIPID_PREFIX.to_string(),
        valid,
        checked: true,
        expected: Some(expected_ldl),
        actual: Some(reported_ldl),
        difference: Some(difference),
        interpretation: Some(if valid {
            "ldl_consistent_with_friedewald_estimate".to_string()
        } else {
            "ldl_inconsistent_with_friedewald_estimate".to_string()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labval_model::{TestRegistry, TestResult};

    fn lipid_index(reported_ldl: f64) -> PanelIndex {
        let registry = TestRegistry::builtin();
        let results = vec![
            TestResult {
                test_id: test_ids::CHOLESTEROL_TOTAL.to_string(),
                value: 5.0,
                unit: "mmol/L".to_string(),
            },
            TestResult {
                test_id: test_ids::HDL.to_string(),
                value: 1.3,
                unit: "mmol/L".to_string(),
            },
            TestResult {
                test_id: test_ids::TRIGLYCERIDES.to_string(),
                value: 1.5,
                unit: "mmol/L".to_string(),
            },
            TestResult {
                test_id: test_ids::LDL.to_string(),
                value: reported_ldl,
                unit: "mmol/L".to_string(),
            },
        ];
        PanelIndex::build(&results, &registry)
    }

    #[test]
    fn friedewald_boundary() {
        // Expected LDL: 5.0 - 1.3 - 1.5 / 2.2 = 3.018.
        let finding = lipid_panel(&lipid_index(3.3));
        assert!(finding.checked);
        assert!(finding.valid);
        assert!((finding.expected.unwrap() - 3.01818).abs() < 1e-4);

        let finding = lipid_panel(&lipid_index(3.4));
        assert!(finding.checked);
        assert!(!finding.valid);
    }

    #[test]
    fn incomplete_lipid_panel_passes_unchecked() {
        let registry = TestRegistry::builtin();
        let results = vec![TestResult {
            test_id: test_ids::HDL.to_string(),
            value: 1.3,
            unit: "mmol/L".to_string(),
        }];
        let index = PanelIndex::build(&results, &registry);
        let findings = run_all(&index);
        assert_eq!(findings.len(), 1);
        assert!(!findings[0].checked);
        assert!(findings[0].valid);
    }

    #[test]
    fn other_panels_pass_by_default() {
        let registry = TestRegistry::builtin();
        let results = vec![TestResult {
            test_id: test_ids::SODIUM.to_string(),
            value: 140.0,
            unit: "mmol/L".to_string(),
        }];
        let index = PanelIndex::build(&results, &registry);
        let findings = run_all(&index);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].panel, "el");
        assert!(!findings[0].checked);
        assert!(findings[0].valid);
    }
}
