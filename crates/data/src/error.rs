use aviator_domain::RunId;
use std::path::PathBuf;
use thiserror::Error;

/// Storage backend errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// History store errors.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to encode history: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("stored history is corrupt: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("no run with id {0}")]
    NotFound(RunId),
}

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("export I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("export produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
