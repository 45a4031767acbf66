use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::error::LogbookError;
use crate::model::{ImportRun, ImportSource, ImportStatus, ProcedureRecord, StagedProcedure};
use crate::session::SessionContext;
use crate::store::StagingStore;

/// A run whose records were all staged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingReport {
    pub run: ImportRun,
    /// Staged rows in document order.
    pub staged: Vec<StagedProcedure>,
}

/// Create an import run for the signed-in user and stage one row per record.
///
/// Row inserts are independent and issued concurrently; all of them are
/// awaited before returning. Each row keeps the index of its record, so the
/// run reads back in document order whatever order the inserts finish in. If any insert fails the run is marked `failed`
/// and the error reports how many of the rows were written.
pub async fn stage_records<S>(
    store: Arc<S>,
    session: &SessionContext,
    pdf_filename: &str,
    source: ImportSource,
    records: Vec<ProcedureRecord>,
) -> Result<StagingReport, LogbookError>
where
    S: StagingStore + ?Sized + 'static,
{
    let identity = session.require()?;

    let run = {
        let store = Arc::clone(&store);
        let pdf_filename = pdf_filename.to_string();
        tokio::task::spawn_blocking(move || {
            store.create_run(&identity.user_id, &pdf_filename, source)
        })
        .await??
    };
    tracing::info!(run_id = %run.id, records = records.len(), "staging import run");

    let total = records.len();
    let mut tasks = JoinSet::new();
    for (position, record) in (0u32..).zip(records) {
        let store = Arc::clone(&store);
        let run_id = run.id;
        tasks.spawn_blocking(move || store.insert_staged(run_id, position, &record));
    }

    let mut staged = Vec::with_capacity(total);
    let mut failed = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(row)) => staged.push(row),
            Ok(Err(e)) => {
                tracing::warn!(run_id = %run.id, error = %e, "failed to stage procedure");
                failed += 1;
            }
            Err(e) => {
                tracing::warn!(run_id = %run.id, error = %e, "staging task did not complete");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        let run_id = run.id;
        let status_store = Arc::clone(&store);
        let marked = tokio::task::spawn_blocking(move || {
            status_store.set_run_status(run_id, ImportStatus::Failed)
        })
        .await;
        if !matches!(marked, Ok(Ok(()))) {
            tracing::warn!(%run_id, "could not mark import run as failed");
        }
        return Err(LogbookError::StagingWrite {
            run_id,
            written: staged.len(),
            failed,
            total,
        });
    }

    staged.sort_by_key(|row| row.position);
    Ok(StagingReport { run, staged })
}
