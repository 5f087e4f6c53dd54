//! CLI argument definitions for the lab-value validator.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "labval",
    version,
    about = "Laboratory result decision engine - corrections and clinical plausibility",
    long_about = "Propose confidence-scored corrections for implausible laboratory values\n\
                  and validate panels against cross-test physiological correlations,\n\
                  disease patterns, and within-panel consistency checks."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Propose corrections for one flagged test result.
    Correct(CorrectArgs),

    /// Validate the clinical plausibility of a panel of results.
    Panel(PanelArgs),

    /// List the test definitions in the registry.
    Tests(TestsArgs),
}

#[derive(Parser)]
pub struct CorrectArgs {
    /// JSON file with the validation result, optional history, and patient.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Test definition registry JSON (default: built-in definitions).
    #[arg(long = "registry", value_name = "PATH")]
    pub registry: Option<PathBuf>,

    /// Directory for correction_report.json (default: alongside the input).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print suggestions without writing the report file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct PanelArgs {
    /// JSON file with the panel's test results and optional patient.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Test definition registry JSON (default: built-in definitions).
    #[arg(long = "registry", value_name = "PATH")]
    pub registry: Option<PathBuf>,

    /// Directory for clinical_report.json (default: alongside the input).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print findings without writing the report file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct TestsArgs {
    /// Test definition registry JSON (default: built-in definitions).
    #[arg(long = "registry", value_name = "PATH")]
    pub registry: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
