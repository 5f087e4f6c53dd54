use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, info_span};

use labval_clinical::{validate_clinical_logic, write_clinical_report_json};
use labval_correct::{CorrectionEngine, write_correction_report_json};
use labval_model::{
    ClinicalReport, CorrectionPackage, HistoricalValue, PatientContext, TestRegistry, TestResult,
    ValidationResult,
};

use crate::cli::{CorrectArgs, PanelArgs, TestsArgs};
use crate::summary::{print_correction_package, print_registry, print_clinical_report};

const CORRECTION_REPORT_FILE: &str = "correction_report.json";
const CLINICAL_REPORT_FILE: &str = "clinical_report.json";

/// Input document for `labval correct`.
#[derive(Deserialize)]
pub struct CorrectInput {
    pub result: ValidationResult,
    #[serde(default)]
    pub history: Vec<HistoricalValue>,
    #[serde(default)]
    pub patient: Option<PatientContext>,
}

/// Input document for `labval panel`.
#[derive(Deserialize)]
pub struct PanelInput {
    pub results: Vec<TestResult>,
    #[serde(default)]
    pub patient: Option<PatientContext>,
}

pub fn run_correct(args: &CorrectArgs) -> Result<CorrectionPackage> {
    let span = info_span!("correct", input = %args.input.display());
    let _guard = span.enter();

    let input: CorrectInput = read_json(&args.input)?;
    let registry = load_registry(args.registry.as_deref())?;
    let mut engine = CorrectionEngine::new(registry);
    let package = engine
        .generate(&input.result, input.patient.as_ref(), &input.history)
        .context("generate corrections")?;

    print_correction_package(&package);

    if args.dry_run {
        info!("dry run; skipping report file");
    } else {
        let path = report_path(&args.input, args.output_dir.as_deref(), CORRECTION_REPORT_FILE);
        write_correction_report_json(&package, &path)
            .with_context(|| format!("write {}", path.display()))?;
        println!("Report: {}", path.display());
    }
    Ok(package)
}

pub fn run_panel(args: &PanelArgs) -> Result<ClinicalReport> {
    let span = info_span!("panel", input = %args.input.display());
    let _guard = span.enter();

    let input: PanelInput = read_json(&args.input)?;
    let registry = load_registry(args.registry.as_deref())?;
    let report = validate_clinical_logic(&input.results, input.patient.as_ref(), &registry)
        .context("validate panel")?;

    print_clinical_report(&report);

    if args.dry_run {
        info!("dry run; skipping report file");
    } else {
        let path = report_path(&args.input, args.output_dir.as_deref(), CLINICAL_REPORT_FILE);
        write_clinical_report_json(&report, &path)
            .with_context(|| format!("write {}", path.display()))?;
        println!("Report: {}", path.display());
    }
    Ok(report)
}

pub fn run_tests(args: &TestsArgs) -> Result<()> {
    let registry = load_registry(args.registry.as_deref())?;
    print_registry(&registry);
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

fn load_registry(path: Option<&Path>) -> Result<TestRegistry> {
    match path {
        Some(path) => {
            let registry = TestRegistry::from_path(path)
                .with_context(|| format!("load registry {}", path.display()))?;
            info!(tests = registry.len(), "registry loaded");
            Ok(registry)
        }
        None => Ok(TestRegistry::builtin()),
    }
}

fn report_path(input: &Path, output_dir: Option<&Path>, file_name: &str) -> PathBuf {
    let dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.parent().unwrap_or(Path::new(".")).to_path_buf());
    dir.join(file_name)
}
