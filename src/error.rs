//! Error types for the alignment pipeline.
//!
//! Every variant is fatal for the session being processed. Samples recorded
//! during a pause are not an error; the time mapper drops them silently.

use std::path::PathBuf;
use thiserror::Error;

/// Convenient `Result` alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised while resolving, loading, merging or cleaning a session.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The recording event log has an odd row count or broken start/pause pairs.
    #[error("malformed schedule {}: {reason}", .path.display())]
    MalformedSchedule { path: PathBuf, reason: String },

    /// The recording event log resolved to no intervals.
    #[error("no recording intervals found in {}", .path.display())]
    EmptySchedule { path: PathBuf },

    /// A declared sensor's raw file does not exist.
    #[error("missing source file for {sensor}: {}", .path.display())]
    MissingSourceFile { sensor: String, path: PathBuf },

    /// An expected column is absent from a file or from the aligned table.
    #[error("missing column '{column}' in {context}")]
    Schema { column: String, context: String },

    /// A cell could not be parsed as a number or a timestamp.
    #[error("invalid value '{value}' in column '{column}' of {} (record {record})", .path.display())]
    InvalidValue {
        path: PathBuf,
        column: String,
        record: u64,
        value: String,
    },

    /// A structural guarantee of the pipeline was broken.
    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl PipelineError {
    pub(crate) fn schema(column: impl Into<String>, context: impl Into<String>) -> Self {
        PipelineError::Schema {
            column: column.into(),
            context: context.into(),
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        PipelineError::Csv {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}
