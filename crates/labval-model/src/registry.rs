//! In-memory test definition registry.
//!
//! The registry is the contract boundary to the (out of scope) test
//! definition service: lookup by test id, with a graceful "no definition"
//! answer that makes both engines short-circuit instead of failing.
//!
//! `TestRegistry::builtin()` ships the definitions needed by the built-in
//! correlation rules and panel checkers; additional or replacement
//! definitions load from a JSON file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::definition::{AlternativeUnit, TestDefinition, UnitLimits};
use crate::error::Result;

/// Well-known test ids. The first two characters encode the panel.
pub mod test_ids {
    pub const GLUCOSE_FASTING: &str = "ch_glucose_fasting";
    pub const GLUCOSE_2H: &str = "ch_glucose_2h";
    pub const HBA1C: &str = "ch_hba1c";
    pub const CREATININE: &str = "ch_creatinine";
    pub const EGFR: &str = "ch_egfr";

    pub const SODIUM: &str = "el_sodium";
    pub const POTASSIUM: &str = "el_potassium";
    pub const CHLORIDE: &str = "el_chloride";
    pub const CALCIUM: &str = "el_calcium";

    pub const TOTAL_PROTEIN: &str = "pr_total_protein";
    pub const ALBUMIN: &str = "pr_albumin";

    pub const CHOLESTEROL_TOTAL: &str = "lp_cholesterol_total";
    pub const HDL: &str = "lp_hdl";
    pub const LDL: &str = "lp_ldl";
    pub const TRIGLYCERIDES: &str = "lp_triglycerides";

    pub const TROPONIN: &str = "cd_troponin";
    pub const CK_MB: &str = "cd_ck_mb";

    pub const ALT: &str = "li_alt";
    pub const AST: &str = "li_ast";
    pub const BILIRUBIN_TOTAL: &str = "li_bilirubin_total";

    pub const TSH: &str = "en_tsh";
    pub const FT4: &str = "en_ft4";
}

/// Registry of test definitions keyed by test id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestRegistry {
    pub tests: BTreeMap<String, TestDefinition>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup by test id. `None` means "no definition" and callers must
    /// short-circuit gracefully.
    pub fn get(&self, test_id: &str) -> Option<&TestDefinition> {
        self.tests.get(test_id)
    }

    pub fn insert(&mut self, definition: TestDefinition) {
        self.tests.insert(definition.test_id.clone(), definition);
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Load a registry from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Registry covering the tests consumed by the built-in correlation
    /// rules, disease patterns, and panel checkers.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for definition in builtin_definitions() {
            registry.insert(definition);
        }
        registry
    }
}

struct Band {
    absolute: (f64, f64),
    physiological: (f64, f64),
    critical: Option<(f64, f64)>,
    panic: Option<(f64, f64)>,
}

fn unit_limits(band: &Band) -> UnitLimits {
    UnitLimits {
        absolute_min: Some(band.absolute.0),
        absolute_max: Some(band.absolute.1),
        physiological_min: Some(band.physiological.0),
        physiological_max: Some(band.physiological.1),
        critical_low: band.critical.map(|(low, _)| low),
        critical_high: band.critical.map(|(_, high)| high),
        panic_low: band.panic.map(|(low, _)| low),
        panic_high: band.panic.map(|(_, high)| high),
    }
}

struct DefinitionSpec {
    test_id: &'static str,
    name: &'static str,
    primary_unit: &'static str,
    primary_precision: u8,
    alternatives: Vec<(&'static str, f64, u8)>,
    limits: Vec<(&'static str, Band)>,
}

fn build(spec: DefinitionSpec) -> TestDefinition {
    TestDefinition {
        test_id: spec.test_id.to_string(),
        name: spec.name.to_string(),
        primary_unit: spec.primary_unit.to_string(),
        primary_precision: spec.primary_precision,
        alternative_units: spec
            .alternatives
            .into_iter()
            .map(|(unit, factor, precision)| AlternativeUnit {
                unit: unit.to_string(),
                factor,
                precision,
            })
            .collect(),
        limits: spec
            .limits
            .into_iter()
            .map(|(unit, band)| (unit.to_string(), unit_limits(&band)))
            .collect(),
    }
}

// Conversion factors to primary units.
const MG_DL_TO_MMOL_GLUCOSE: f64 = 1.0 / 18.016;
const MG_DL_TO_UMOL_CREATININE: f64 = 88.4;
const MG_DL_TO_MMOL_CALCIUM: f64 = 1.0 / 4.008;
const MG_DL_TO_MMOL_CHOLESTEROL: f64 = 1.0 / 38.67;
const MG_DL_TO_MMOL_TRIGLYCERIDES: f64 = 1.0 / 88.57;
const G_DL_TO_G_L: f64 = 10.0;

fn glucose_bands() -> Vec<(&'static str, Band)> {
    vec![
        (
            "mmol/L",
            Band {
                absolute: (0.5, 50.0),
                physiological: (3.0, 25.0),
                critical: Some((2.8, 22.0)),
                panic: Some((2.2, 25.0)),
            },
        ),
        (
            "mg/dL",
            Band {
                absolute: (9.0, 900.0),
                physiological: (54.0, 450.0),
                critical: Some((50.0, 400.0)),
                panic: Some((40.0, 450.0)),
            },
        ),
    ]
}

fn builtin_definitions() -> Vec<TestDefinition> {
    vec![
        build(DefinitionSpec {
            test_id: test_ids::GLUCOSE_FASTING,
            name: "Fasting glucose",
            primary_unit: "mmol/L",
            primary_precision: 2,
            alternatives: vec![("mg/dL", MG_DL_TO_MMOL_GLUCOSE, 0)],
            limits: glucose_bands(),
        }),
        build(DefinitionSpec {
            test_id: test_ids::GLUCOSE_2H,
            name: "Glucose, 2-hour post-load",
            primary_unit: "mmol/L",
            primary_precision: 2,
            alternatives: vec![("mg/dL", MG_DL_TO_MMOL_GLUCOSE, 0)],
            limits: glucose_bands(),
        }),
        build(DefinitionSpec {
            test_id: test_ids::HBA1C,
            name: "Hemoglobin A1c",
            primary_unit: "%",
            primary_precision: 1,
            alternatives: vec![],
            limits: vec![(
                "%",
                Band {
                    absolute: (2.0, 25.0),
                    physiological: (3.5, 20.0),
                    critical: Some((3.0, 15.0)),
                    panic: None,
                },
            )],
        }),
        build(DefinitionSpec {
            test_id: test_ids::CREATININE,
            name: "Creatinine",
            primary_unit: "umol/L",
            primary_precision: 0,
            alternatives: vec![("mg/dL", MG_DL_TO_UMOL_CREATININE, 2)],
            limits: vec![
                (
                    "umol/L",
                    Band {
                        absolute: (5.0, 5000.0),
                        physiological: (20.0, 2500.0),
                        critical: Some((10.0, 1500.0)),
                        panic: Some((8.0, 2200.0)),
                    },
                ),
                (
                    "mg/dL",
                    Band {
                        absolute: (0.06, 56.6),
                        physiological: (0.23, 28.3),
                        critical: Some((0.11, 17.0)),
                        panic: Some((0.09, 25.0)),
                    },
                ),
            ],
        }),
        build(DefinitionSpec {
            test_id: test_ids::EGFR,
            name: "Estimated GFR",
            primary_unit: "mL/min/1.73m2",
            primary_precision: 0,
            alternatives: vec![],
            limits: vec![(
                "mL/min/1.73m2",
                Band {
                    absolute: (0.0, 250.0),
                    physiological: (1.0, 200.0),
                    critical: Some((15.0, 250.0)),
                    panic: Some((10.0, 250.0)),
                },
            )],
        }),
        build(DefinitionSpec {
            test_id: test_ids::SODIUM,
            name: "Sodium",
            primary_unit: "mmol/L",
            primary_precision: 0,
            alternatives: vec![("mEq/L", 1.0, 0)],
            limits: vec![
                (
                    "mmol/L",
                    Band {
                        absolute: (80.0, 220.0),
                        physiological: (100.0, 180.0),
                        critical: Some((120.0, 160.0)),
                        panic: Some((115.0, 165.0)),
                    },
                ),
                (
                    "mEq/L",
                    Band {
                        absolute: (80.0, 220.0),
                        physiological: (100.0, 180.0),
                        critical: Some((120.0, 160.0)),
                        panic: Some((115.0, 165.0)),
                    },
                ),
            ],
        }),
        build(DefinitionSpec {
            test_id: test_ids::POTASSIUM,
            name: "Potassium",
            primary_unit: "mmol/L",
            primary_precision: 1,
            alternatives: vec![("mEq/L", 1.0, 1)],
            limits: vec![(
                "mmol/L",
                Band {
                    absolute: (1.0, 15.0),
                    physiological: (1.5, 10.0),
                    critical: Some((2.8, 6.2)),
                    panic: Some((2.5, 7.0)),
                },
            )],
        }),
        build(DefinitionSpec {
            test_id: test_ids::CHLORIDE,
            name: "Chloride",
            primary_unit: "mmol/L",
            primary_precision: 0,
            alternatives: vec![("mEq/L", 1.0, 0)],
            limits: vec![(
                "mmol/L",
                Band {
                    absolute: (50.0, 160.0),
                    physiological: (70.0, 140.0),
                    critical: Some((80.0, 125.0)),
                    panic: Some((75.0, 130.0)),
                },
            )],
        }),
        build(DefinitionSpec {
            test_id: test_ids::CALCIUM,
            name: "Calcium, total",
            primary_unit: "mmol/L",
            primary_precision: 2,
            alternatives: vec![("mg/dL", MG_DL_TO_MMOL_CALCIUM, 1)],
            limits: vec![(
                "mmol/L",
                Band {
                    absolute: (0.5, 5.0),
                    physiological: (1.0, 4.0),
                    critical: Some((1.6, 3.3)),
                    panic: Some((1.5, 3.5)),
                },
            )],
        }),
        build(DefinitionSpec {
            test_id: test_ids::TOTAL_PROTEIN,
            name: "Total protein",
            primary_unit: "g/L",
            primary_precision: 0,
            alternatives: vec![("g/dL", G_DL_TO_G_L, 1)],
            limits: vec![(
                "g/L",
                Band {
                    absolute: (20.0, 120.0),
                    physiological: (30.0, 100.0),
                    critical: None,
                    panic: None,
                },
            )],
        }),
        build(DefinitionSpec {
            test_id: test_ids::ALBUMIN,
            name: "Albumin",
            primary_unit: "g/L",
            primary_precision: 0,
            alternatives: vec![("g/dL", G_DL_TO_G_L, 1)],
            limits: vec![(
                "g/L",
                Band {
                    absolute: (10.0, 70.0),
                    physiological: (15.0, 60.0),
                    critical: Some((20.0, 70.0)),
                    panic: Some((15.0, 70.0)),
                },
            )],
        }),
        build(DefinitionSpec {
            test_id: test_ids::CHOLESTEROL_TOTAL,
            name: "Cholesterol, total",
            primary_unit: "mmol/L",
            primary_precision: 2,
            alternatives: vec![("mg/dL", MG_DL_TO_MMOL_CHOLESTEROL, 0)],
            limits: vec![(
                "mmol/L",
                Band {
                    absolute: (0.5, 30.0),
                    physiological: (1.5, 20.0),
                    critical: None,
                    panic: None,
                },
            )],
        }),
        build(DefinitionSpec {
            test_id: test_ids::HDL,
            name: "HDL cholesterol",
            primary_unit: "mmol/L",
            primary_precision: 2,
            alternatives: vec![("mg/dL", MG_DL_TO_MMOL_CHOLESTEROL, 0)],
            limits: vec![(
                "mmol/L",
                Band {
                    absolute: (0.1, 5.0),
                    physiological: (0.3, 4.0),
                    critical: None,
                    panic: None,
                },
            )],
        }),
        build(DefinitionSpec {
            test_id: test_ids::LDL,
            name: "LDL cholesterol",
            primary_unit: "mmol/L",
            primary_precision: 2,
            alternatives: vec![("mg/dL", MG_DL_TO_MMOL_CHOLESTEROL, 0)],
            limits: vec![(
                "mmol/L",
                Band {
                    absolute: (0.1, 20.0),
                    physiological: (0.5, 15.0),
                    critical: None,
                    panic: None,
                },
            )],
        }),
        build(DefinitionSpec {
            test_id: test_ids::TRIGLYCERIDES,
            name: "Triglycerides",
            primary_unit: "mmol/L",
            primary_precision: 2,
            alternatives: vec![("mg/dL", MG_DL_TO_MMOL_TRIGLYCERIDES, 0)],
            limits: vec![(
                "mmol/L",
                Band {
                    absolute: (0.1, 50.0),
                    physiological: (0.2, 30.0),
                    critical: None,
                    panic: None,
                },
            )],
        }),
        build(DefinitionSpec {
            test_id: test_ids::TROPONIN,
            name: "Troponin I, high sensitivity",
            primary_unit: "ng/L",
            primary_precision: 0,
            alternatives: vec![],
            limits: vec![(
                "ng/L",
                Band {
                    absolute: (0.0, 100_000.0),
                    physiological: (0.0, 50_000.0),
                    critical: None,
                    panic: None,
                },
            )],
        }),
        build(DefinitionSpec {
            test_id: test_ids::CK_MB,
            name: "Creatine kinase MB",
            primary_unit: "ug/L",
            primary_precision: 1,
            alternatives: vec![],
            limits: vec![(
                "ug/L",
                Band {
                    absolute: (0.0, 10_000.0),
                    physiological: (0.0, 5_000.0),
                    critical: None,
                    panic: None,
                },
            )],
        }),
        build(DefinitionSpec {
            test_id: test_ids::ALT,
            name: "Alanine aminotransferase",
            primary_unit: "U/L",
            primary_precision: 0,
            alternatives: vec![],
            limits: vec![(
                "U/L",
                Band {
                    absolute: (0.0, 20_000.0),
                    physiological: (1.0, 10_000.0),
                    critical: None,
                    panic: None,
                },
            )],
        }),
        build(DefinitionSpec {
            test_id: test_ids::AST,
            name: "Aspartate aminotransferase",
            primary_unit: "U/L",
            primary_precision: 0,
            alternatives: vec![],
            limits: vec![(
                "U/L",
                Band {
                    absolute: (0.0, 20_000.0),
                    physiological: (1.0, 10_000.0),
                    critical: None,
                    panic: None,
                },
            )],
        }),
        build(DefinitionSpec {
            test_id: test_ids::BILIRUBIN_TOTAL,
            name: "Bilirubin, total",
            primary_unit: "umol/L",
            primary_precision: 0,
            alternatives: vec![],
            limits: vec![(
                "umol/L",
                Band {
                    absolute: (0.0, 1_000.0),
                    physiological: (1.0, 600.0),
                    critical: None,
                    panic: None,
                },
            )],
        }),
        build(DefinitionSpec {
            test_id: test_ids::TSH,
            name: "Thyroid stimulating hormone",
            primary_unit: "mIU/L",
            primary_precision: 2,
            alternatives: vec![],
            limits: vec![(
                "mIU/L",
                Band {
                    absolute: (0.0, 500.0),
                    physiological: (0.005, 200.0),
                    critical: None,
                    panic: None,
                },
            )],
        }),
        build(DefinitionSpec {
            test_id: test_ids::FT4,
            name: "Free thyroxine",
            primary_unit: "pmol/L",
            primary_precision: 1,
            alternatives: vec![],
            limits: vec![(
                "pmol/L",
                Band {
                    absolute: (0.0, 300.0),
                    physiological: (1.0, 150.0),
                    critical: None,
                    panic: None,
                },
            )],
        }),
    ]
}
