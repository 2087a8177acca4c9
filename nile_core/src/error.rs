//! Errors raised while assembling, loading or persisting study data.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Results table has {found} columns, lever slice needs {needed}")]
    MissingLeverColumns { needed: usize, found: usize },

    #[error("Row {row}, column `{column}`: `{value}` is not a number")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Scenario `{scenario}` has no value for uncertainty `{uncertainty}`")]
    MissingUncertainty { scenario: String, uncertainty: String },

    #[error("Scenario `{scenario}` sets undeclared uncertainty `{uncertainty}`")]
    UnknownUncertainty { scenario: String, uncertainty: String },

    #[error("{policy} has {found} lever values but the model declares {expected}")]
    LeverCountMismatch {
        policy: String,
        expected: usize,
        found: usize,
    },

    #[error("{policy}: lever #{position} is `{found}`, model expects `{expected}`")]
    LeverNameMismatch {
        policy: String,
        position: usize,
        expected: String,
        found: String,
    },

    #[error("Experiment {experiment} did not report outcome `{outcome}`")]
    MissingOutcome { experiment: usize, outcome: String },

    #[error("Output directory {0} does not exist")]
    MissingOutputDir(PathBuf),

    #[error("Malformed table: {0}")]
    MalformedTable(String),
}

impl CoreError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
