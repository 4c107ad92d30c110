//! Error types for the chart engine.
//!
//! Expected "no data" conditions are never errors here — transformers report
//! those through [`crate::chart::EmptyCause`]. `QaError` covers the genuine
//! failures: a parameter name that does not exist for the chosen data type,
//! and I/O or serialization problems at the crate boundary.

use thiserror::Error;

use crate::params::PipelineVersion;
use crate::record::DataType;

/// Convenience alias for results using the engine error type.
pub type Result<T> = std::result::Result<T, QaError>;

/// Primary error type for the chart engine.
#[derive(Error, Debug)]
pub enum QaError {
    /// The requested parameter is not defined for the data type and pipeline
    /// version. Raised by validation before any numeric work is attempted.
    #[error("unknown parameter '{parameter}' for data type '{data_type}' ({version})")]
    UnknownParameter {
        data_type: DataType,
        version: PipelineVersion,
        parameter: String,
    },

    /// Reading or writing an external payload failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON payload failed to (de)serialize.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
