use thiserror::Error;

/// Errors that abort a whole panel validation. Individual rule problems
/// (missing tests, missing demographics, unconvertible units) never surface
/// here; they become `skipped` notes on the report.
#[derive(Debug, Error)]
pub enum ClinicalError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("report serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClinicalError>;
