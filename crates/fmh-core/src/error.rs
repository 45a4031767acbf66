use std::path::PathBuf;

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum LogbookError {
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("no procedures recognised in the logbook PDF")]
    NoProcedures,

    #[error("authentication required to import a logbook")]
    AuthenticationRequired,

    #[error("staging failed for import run {run_id}: {failed} of {total} rows could not be written")]
    StagingWrite {
        run_id: Uuid,
        written: usize,
        failed: usize,
        total: usize,
    },

    #[error("import run {0} not found")]
    RunNotFound(Uuid),

    #[error("failed to load catalog from {path}: {reason}")]
    CatalogLoad { path: PathBuf, reason: String },

    #[error("invalid catalog: {0}")]
    CatalogInvalid(String),

    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("background task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<tokio::task::JoinError> for LogbookError {
    fn from(err: tokio::task::JoinError) -> Self {
        LogbookError::Task(err.to_string())
    }
}

impl LogbookError {
    /// True for failures caused by the uploaded document rather than the system.
    pub fn is_extraction(&self) -> bool {
        matches!(
            self,
            LogbookError::Extraction(_) | LogbookError::PdftotextFailed { .. }
        )
    }
}
