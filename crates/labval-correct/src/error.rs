use thiserror::Error;

/// Errors that abort a whole correction request.
#[derive(Debug, Error)]
pub enum CorrectError {
    #[error("value for {test_id} is not finite")]
    NonFiniteValue { test_id: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("report serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors local to one sub-generator. These are isolated by the engine and
/// surfaced as `GeneratorFault` entries instead of aborting the request.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("historical series contains a non-finite value")]
    NonFiniteHistory,
}

pub type Result<T> = std::result::Result<T, CorrectError>;
