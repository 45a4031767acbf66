//! Storage collaborators of the import pipeline.
//!
//! Every boundary is a blocking, insert-and-return trait so the pipeline can be
//! exercised against SQLite in production and against small fakes in tests.

pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::LogbookError;
use crate::model::{
    Identity, ImportRun, ImportSource, ImportStatus, NewProcedureLog, Procedure, ProcedureLog,
    ProcedureRecord, StagedProcedure, StagedStatus,
};
use uuid::Uuid;

/// Import runs and their staged procedure rows.
pub trait StagingStore: Send + Sync {
    /// Create a run in `running` state and return the stored row.
    fn create_run(
        &self,
        user_id: &str,
        pdf_filename: &str,
        source: ImportSource,
    ) -> Result<ImportRun, LogbookError>;

    fn get_run(&self, run_id: Uuid) -> Result<Option<ImportRun>, LogbookError>;

    fn set_run_status(&self, run_id: Uuid, status: ImportStatus) -> Result<(), LogbookError>;

    /// Stage one parsed record under a run, in `pending` state. `position` is
    /// the record's index in the parsed document.
    fn insert_staged(
        &self,
        run_id: Uuid,
        position: u32,
        record: &ProcedureRecord,
    ) -> Result<StagedProcedure, LogbookError>;

    /// Staged rows of a run, in document order.
    fn staged_for_run(&self, run_id: Uuid) -> Result<Vec<StagedProcedure>, LogbookError>;

    fn set_staged_status(&self, staged_id: i64, status: StagedStatus) -> Result<(), LogbookError>;
}

/// Read access to the canonical procedure catalog.
pub trait CatalogStore: Send + Sync {
    /// All procedures, in catalog order.
    fn load_catalog(&self) -> Result<Vec<Procedure>, LogbookError>;

    /// Insert or update procedures by id. New ids are appended to the catalog order.
    fn upsert_procedures(&self, procedures: &[Procedure]) -> Result<usize, LogbookError>;
}

/// One-row-at-a-time writes of procedure occurrences.
pub trait LogStore: Send + Sync {
    fn insert_log(&self, log: &NewProcedureLog) -> Result<ProcedureLog, LogbookError>;

    fn count_logs(&self, user_id: &str) -> Result<usize, LogbookError>;
}

/// Bearer tokens for the HTTP import endpoint.
pub trait IdentityStore: Send + Sync {
    /// Issue a new token for the identity. Only its hash is stored.
    fn issue_token(&self, identity: &Identity) -> Result<String, LogbookError>;

    fn resolve_token(&self, token: &str) -> Result<Option<Identity>, LogbookError>;
}

/// Everything the import pipeline reads and writes.
pub trait LogbookStore: StagingStore + CatalogStore + LogStore {}

impl<T: StagingStore + CatalogStore + LogStore + ?Sized> LogbookStore for T {}

/// SHA-256 of a bearer token, as stored in `api_tokens.token_hash`.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
