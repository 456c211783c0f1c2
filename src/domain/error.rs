// ============================================================
// Layer 3 - Error Taxonomy
// ============================================================
// Every failure the model lifecycle can produce, normalised
// at the layer boundary where it happens:
//
//   Configuration  - the model definition is inconsistent (fatal)
//   Network        - a hosted artifact could not be fetched
//   Storage        - local artifact missing, corrupt or unwritable
//   ModelNotReady  - no model in the session yet (user-correctable)
//   Numerical      - training diverged (fatal for that run)
//   Input          - manual input has the wrong width or bad values
//
// The application layer wraps these in anyhow::Error when it
// needs extra context; the controller renders them as status text.
//
// Reference: Rust Book §9 (Error Handling)

use thiserror::Error;

pub type LabResult<T> = std::result::Result<T, LabError>;

#[derive(Debug, Error)]
pub enum LabError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("network error for '{url}': {message}")]
    Network { url: String, message: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("no model is loaded: train or load a model first")]
    ModelNotReady,

    #[error("training diverged at epoch {epoch} (loss = {loss})")]
    Numerical { epoch: usize, loss: f64 },

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("expected {expected} feature values, got {actual}")]
    InputWidth { expected: usize, actual: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("tensor error: {0}")]
    Tensor(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no model stored under '{key}'")]
    NotFound { key: String },

    #[error("stored model is corrupt: {0}")]
    Corrupt(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LabError {
    pub fn network(url: impl Into<String>, message: impl std::fmt::Display) -> Self {
        LabError::Network { url: url.into(), message: message.to_string() }
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        LabError::Storage(StorageError::Corrupt(message.into()))
    }

    /// Fatal errors mean the operation cannot succeed without fixing
    /// code, configuration or data; the rest are expected at runtime
    /// (missing artifacts, unreachable hosts, no model yet, bad input).
    pub fn is_fatal(&self) -> bool {
        match self {
            LabError::Configuration(_)
            | LabError::Numerical { .. }
            | LabError::Dataset(_)
            | LabError::Tensor(_) => true,
            LabError::Storage(StorageError::Corrupt(_)) => true,
            LabError::Storage(StorageError::Io(_)) => true,
            LabError::Storage(StorageError::NotFound { .. })
            | LabError::Network { .. }
            | LabError::ModelNotReady
            | LabError::InputWidth { .. }
            | LabError::InvalidInput(_) => false,
        }
    }
}

impl From<std::io::Error> for LabError {
    fn from(e: std::io::Error) -> Self {
        LabError::Storage(StorageError::Io(e))
    }
}
