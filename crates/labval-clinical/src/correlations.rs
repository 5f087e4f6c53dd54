//! Cross-test physiological correlation rules.
//!
//! Each rule is independent and fires only when every test it needs is in
//! the index; a rule that needs demographics records a skip note when they
//! are missing. All values are in primary units (glucose mmol/L, creatinine
//! umol/L, electrolytes mmol/L, proteins g/L).

use tracing::debug;

use labval_model::{CorrelationFinding, PatientContext, Race, Sex, test_ids};

use crate::index::PanelIndex;

const ADAG_OFFSET: f64 = 2.15;
const ADAG_SLOPE: f64 = 1.59;
const ADAG_TOLERANCE: f64 = 1.0;

const EGFR_TOLERANCE: f64 = 15.0;
const UMOL_PER_MG_DL_CREATININE: f64 = 88.4;

const ANION_GAP_NORMAL: (f64, f64) = (8.0, 16.0);
const ANION_GAP_SIGNIFICANT: f64 = 24.0;

const GLOBULIN_NORMAL: (f64, f64) = (23.0, 35.0);
const AG_RATIO_NORMAL: (f64, f64) = (1.2, 2.2);

const CORRECTED_CA_LOW: f64 = 2.1;
const CORRECTED_CA_HIGH: f64 = 2.6;
const CA_ALBUMIN_SLOPE: f64 = 0.02;
const ALBUMIN_REFERENCE: f64 = 40.0;

/// Run every applicable correlation rule.
pub fn run_all(
    index: &PanelIndex,
    patient: Option<&PatientContext>,
    skipped: &mut Vec<String>,
) -> Vec<CorrelationFinding> {
    let mut findings = Vec::new();
    findings.extend(glucose_hba1c(index));
    findings.extend(creatinine_egfr(index, patient, skipped));
    findings.extend(electrolyte_balance(index));
    findings.extend(protein_fractions(index));
    findings.extend(corrected_calcium(index));
    debug!(count = findings.len(), "correlation rules evaluated");
    findings
}

/// ADAG regression: estimated HbA1c from mean glucose.
fn glucose_hba1c(index: &PanelIndex) -> Option<CorrelationFinding> {
    let glucose = index.get(test_ids::GLUCOSE_FASTING)?;
    let hba1c = index.get(test_ids::HBA1C)?;
    let expected = (glucose + ADAG_OFFSET) / ADAG_SLOPE;
    let difference = (hba1c - expected).abs();
    let valid = difference <= ADAG_TOLERANCE;
    Some(CorrelationFinding {
        rule_id: "glucose_hba1c".to_string(),
        test_ids: vec![
            test_ids::GLUCOSE_FASTING.to_string(),
            test_ids::HBA1C.to_string(),
        ],
        valid,
        expected: Some(expected),
        actual: Some(hba1c),
        difference: Some(difference),
        interpretation: if valid {
            "consistent".to_string()
        } else {
            "glucose_hba1c_discordant_review_both_results".to_string()
        },
    })
}

/// CKD-EPI 2009 creatinine equation, compared against the reported eGFR.
fn creatinine_egfr(
    index: &PanelIndex,
    patient: Option<&PatientContext>,
    skipped: &mut Vec<String>,
) -> Option<CorrelationFinding> {
    let creatinine = index.get(test_ids::CREATININE)?;
    let reported = index.get(test_ids::EGFR)?;
    let Some((age, sex, race)) = patient.and_then(|p| Some((p.age?, p.sex?, p.race))) else {
        skipped.push("creatinine_egfr: requires patient age and sex".to_string());
        return None;
    };

    let expected = ckd_epi_2009(creatinine, age, sex, race);
    let difference = (reported - expected).abs();
    let valid = difference <= EGFR_TOLERANCE;
    Some(CorrelationFinding {
        rule_id: "creatinine_egfr".to_string(),
        test_ids: vec![test_ids::CREATININE.to_string(), test_ids::EGFR.to_string()],
        valid,
        expected: Some(expected),
        actual: Some(reported),
        difference: Some(difference),
        interpretation: if valid {
            "consistent".to_string()
        } else {
            "creatinine_egfr_discordant_verify_creatinine".to_string()
        },
    })
}

fn ckd_epi_2009(creatinine_umol: f64, age: u32, sex: Sex, race: Option<Race>) -> f64 {
    let scr = creatinine_umol / UMOL_PER_MG_DL_CREATININE;
    let (kappa, alpha) = match sex {
        Sex::Female => (0.7, -0.329),
        Sex::Male => (0.9, -0.411),
    };
    let ratio = scr / kappa;
    let mut egfr =
        141.0 * ratio.min(1.0).powf(alpha) * ratio.max(1.0).powf(-1.209) * 0.993f64.powi(age as i32);
    if sex == Sex::Female {
        egfr *= 1.018;
    }
    if race == Some(Race::Black) {
        egfr *= 1.159;
    }
    egfr
}

/// Anion gap `Na - (K + Cl)`.
fn electrolyte_balance(index: &PanelIndex) -> Option<CorrelationFinding> {
    let sodium = index.get(test_ids::SODIUM)?;
    let potassium = index.get(test_ids::POTASSIUM)?;
    let chloride = index.get(test_ids::CHLORIDE)?;
    let gap = sodium - (potassium + chloride);
    let valid = gap >= ANION_GAP_NORMAL.0 && gap <= ANION_GAP_NORMAL.1;
    let interpretation = if gap < ANION_GAP_NORMAL.0 {
        "low_anion_gap_consider_hypoalbuminemia"
    } else if gap <= ANION_GAP_NORMAL.1 {
        "normal_anion_gap"
    } else if gap <= ANION_GAP_SIGNIFICANT {
        "elevated_anion_gap"
    } else {
        "significantly_elevated_anion_gap_investigate_acidosis"
    };
    Some(CorrelationFinding {
        rule_id: "electrolyte_balance".to_string(),
        test_ids: vec![
            test_ids::SODIUM.to_string(),
            test_ids::POTASSIUM.to_string(),
            test_ids::CHLORIDE.to_string(),
        ],
        valid,
        expected: None,
        actual: Some(gap),
        difference: None,
        interpretation: interpretation.to_string(),
    })
}

/// Globulin and albumin/globulin ratio from total protein and albumin.
fn protein_fractions(index: &PanelIndex) -> Option<CorrelationFinding> {
    let total_protein = index.get(test_ids::TOTAL_PROTEIN)?;
    let albumin = index.get(test_ids::ALBUMIN)?;
    let globulin = total_protein - albumin;
    let ratio_ok = globulin > 0.0 && {
        let ratio = albumin / globulin;
        ratio >= AG_RATIO_NORMAL.0 && ratio <= AG_RATIO_NORMAL.1
    };
    let globulin_ok = globulin >= GLOBULIN_NORMAL.0 && globulin <= GLOBULIN_NORMAL.1;
    let valid = globulin_ok && ratio_ok;
    Some(CorrelationFinding {
        rule_id: "protein_fractions".to_string(),
        test_ids: vec![
            test_ids::TOTAL_PROTEIN.to_string(),
            test_ids::ALBUMIN.to_string(),
        ],
        valid,
        expected: None,
        actual: Some(globulin),
        difference: None,
        interpretation: if valid {
            "normal_protein_fractions".to_string()
        } else {
            "abnormal_protein_fractions_review_total_protein_and_albumin".to_string()
        },
    })
}

/// Albumin-corrected calcium. Always valid; the interpretation carries the
/// clinical reading.
fn corrected_calcium(index: &PanelIndex) -> Option<CorrelationFinding> {
    let calcium = index.get(test_ids::CALCIUM)?;
    let albumin = index.get(test_ids::ALBUMIN)?;
    let corrected = calcium + CA_ALBUMIN_SLOPE * (ALBUMIN_REFERENCE - albumin);
    let interpretation = if corrected < CORRECTED_CA_LOW {
        "corrected_hypocalcemia"
    } else if corrected <= CORRECTED_CA_HIGH {
        "corrected_normocalcemia"
    } else {
        "corrected_hypercalcemia"
    };
    Some(CorrelationFinding {
        rule_id: "corrected_calcium".to_string(),
        test_ids: vec![test_ids::CALCIUM.to_string(), test_ids::ALBUMIN.to_string()],
        valid: true,
        expected: None,
        actual: Some(corrected),
        difference: None,
        interpretation: interpretation.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use labval_model::{TestRegistry, TestResult};

    fn index_of(entries: &[(&str, f64, &str)]) -> PanelIndex {
        let registry = TestRegistry::builtin();
        let results: Vec<TestResult> = entries
            .iter()
            .map(|(test_id, value, unit)| TestResult {
                test_id: (*test_id).to_string(),
                value: *value,
                unit: (*unit).to_string(),
            })
            .collect();
        PanelIndex::build(&results, &registry)
    }

    #[test]
    fn adag_consistent_pair_is_valid() {
        // Glucose 7.0 mmol/L estimates HbA1c (7.0 + 2.15) / 1.59 = 5.75.
        let index = index_of(&[
            (test_ids::GLUCOSE_FASTING, 7.0, "mmol/L"),
            (test_ids::HBA1C, 6.2, "%"),
        ]);
        let finding = glucose_hba1c(&index).expect("fires");
        assert!(finding.valid);
        assert!((finding.expected.unwrap() - 5.7547).abs() < 1e-3);

        let index = index_of(&[
            (test_ids::GLUCOSE_FASTING, 7.0, "mmol/L"),
            (test_ids::HBA1C, 9.0, "%"),
        ]);
        let finding = glucose_hba1c(&index).expect("fires");
        assert!(!finding.valid);
    }

    #[test]
    fn ckd_epi_reference_male_50() {
        // 88.4 umol/L is exactly 1.0 mg/dL.
        let expected = ckd_epi_2009(88.4, 50, Sex::Male, None);
        assert!((expected - 87.37).abs() < 0.05, "got {expected}");
        // Black race multiplier.
        let black = ckd_epi_2009(88.4, 50, Sex::Male, Some(Race::Black));
        assert!((black / expected - 1.159).abs() < 1e-9);
    }

    #[test]
    fn egfr_rule_needs_demographics() {
        let index = index_of(&[
            (test_ids::CREATININE, 88.4, "umol/L"),
            (test_ids::EGFR, 88.0, "mL/min/1.73m2"),
        ]);
        let mut skipped = Vec::new();
        assert!(creatinine_egfr(&index, None, &mut skipped).is_none());
        assert_eq!(skipped.len(), 1);

        let patient = PatientContext {
            age: Some(50),
            sex: Some(Sex::Male),
            race: None,
        };
        let finding = creatinine_egfr(&index, Some(&patient), &mut skipped).expect("fires");
        assert!(finding.valid);
        assert!((finding.expected.unwrap() - 87.37).abs() < 0.05);
    }

    #[test]
    fn significantly_elevated_anion_gap() {
        let index = index_of(&[
            (test_ids::SODIUM, 140.0, "mmol/L"),
            (test_ids::POTASSIUM, 4.0, "mmol/L"),
            (test_ids::CHLORIDE, 100.0, "mmol/L"),
        ]);
        let finding = electrolyte_balance(&index).expect("fires");
        assert!(!finding.valid);
        assert_eq!(finding.actual, Some(36.0));
        assert_eq!(
            finding.interpretation,
            "significantly_elevated_anion_gap_investigate_acidosis"
        );
    }

    #[test]
    fn normal_anion_gap_is_valid() {
        let index = index_of(&[
            (test_ids::SODIUM, 140.0, "mmol/L"),
            (test_ids::POTASSIUM, 4.0, "mmol/L"),
            (test_ids::CHLORIDE, 124.0, "mmol/L"),
        ]);
        let finding = electrolyte_balance(&index).expect("fires");
        assert!(finding.valid);
        assert_eq!(finding.interpretation, "normal_anion_gap");
    }

    #[test]
    fn protein_fractions_boundaries() {
        // TP 70, albumin 42: globulin 28, ratio 1.5.
        let index = index_of(&[
            (test_ids::TOTAL_PROTEIN, 70.0, "g/L"),
            (test_ids::ALBUMIN, 42.0, "g/L"),
        ]);
        let finding = protein_fractions(&index).expect("fires");
        assert!(finding.valid);

        // TP 90, albumin 40: globulin 50 is above the normal band.
        let index = index_of(&[
            (test_ids::TOTAL_PROTEIN, 90.0, "g/L"),
            (test_ids::ALBUMIN, 40.0, "g/L"),
        ]);
        let finding = protein_fractions(&index).expect("fires");
        assert!(!finding.valid);
    }

    #[test]
    fn corrected_calcium_is_always_valid() {
        // Ca 2.2 with albumin 30: corrected 2.2 + 0.02 * 10 = 2.4.
        let index = index_of(&[
            (test_ids::CALCIUM, 2.2, "mmol/L"),
            (test_ids::ALBUMIN, 30.0, "g/L"),
        ]);
        let finding = corrected_calcium(&index).expect("fires");
        assert!(finding.valid);
        assert!((finding.actual.unwrap() - 2.4).abs() < 1e-9);
        assert_eq!(finding.interpretation, "corrected_normocalcemia");

        // Low corrected value still reports valid with the hypo reading.
        let index = index_of(&[
            (test_ids::CALCIUM, 1.8, "mmol/L"),
            (test_ids::ALBUMIN, 40.0, "g/L"),
        ]);
        let finding = corrected_calcium(&index).expect("fires");
        assert!(finding.valid);
        assert_eq!(finding.interpretation, "corrected_hypocalcemia");
    }
}
