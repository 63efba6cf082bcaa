//! Error types for artifact loading and pipeline evaluation.

use std::path::PathBuf;

/// Result type for artifact operations
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Error type for artifact operations
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// The artifact file could not be read.
    #[error("Failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact file is not valid JSON for its type.
    #[error("Failed to decode artifact {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A tabular dataset could not be parsed into typed rows.
    #[error("Failed to parse table {path}: {source}")]
    Table {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A single artifact violates its own invariants.
    #[error("Invalid {artifact}: {message}")]
    Invalid {
        artifact: &'static str,
        message: String,
    },

    /// Two artifacts disagree with each other.
    #[error("Inconsistent artifacts: {0}")]
    Inconsistent(String),

    /// The encoder saw a category value it was not fit on.
    #[error("Unknown category {value} for column '{column}'")]
    UnknownCategory { column: String, value: f64 },

    /// A stage received a vector of the wrong width.
    #[error("Shape mismatch in {stage}: expected {expected} features, got {actual}")]
    ShapeMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The model URI scheme cannot be loaded from local storage.
    #[error("Unsupported model URI: {0}")]
    UnsupportedUri(String),
}

impl ArtifactError {
    pub fn invalid(artifact: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            artifact,
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
