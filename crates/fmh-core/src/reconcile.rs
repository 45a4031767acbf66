use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::matcher::match_procedure;
use crate::error::LogbookError;
use crate::materialize::materialize;
use crate::model::{ImportOptions, ImportStatus, Procedure, StagedStatus};
use crate::store::{LogStore, StagingStore};

/// Outcome of reconciling one import run against the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub run_id: Uuid,
    /// Distinct modules among the processed staged rows.
    pub modules_processed: usize,
    pub records_matched: usize,
    /// Names of staged rows with no catalog entry.
    pub unmatched: Vec<String>,
    /// Log rows actually written.
    pub procedures_imported: usize,
    pub failed_inserts: usize,
}

/// Match every pending staged row of a run and write its log rows.
///
/// Rows are processed one after another. A name without a catalog entry is
/// logged, marked `unmatched` and skipped; failed log inserts are counted but
/// never abort the run. The run ends up `completed`.
pub fn reconcile_run(
    staging: &dyn StagingStore,
    logs: &dyn LogStore,
    catalog: &[Procedure],
    run_id: Uuid,
    user_id: &str,
    options: &ImportOptions,
) -> Result<ImportSummary, LogbookError> {
    let run = staging
        .get_run(run_id)?
        .filter(|run| run.user_id == user_id)
        .ok_or(LogbookError::RunNotFound(run_id))?;

    let pending: Vec<_> = staging
        .staged_for_run(run.id)?
        .into_iter()
        .filter(|s| s.status == StagedStatus::Pending)
        .collect();

    let mut summary = ImportSummary {
        run_id,
        ..Default::default()
    };
    let mut modules = HashSet::new();

    for staged in &pending {
        modules.insert(staged.module_name.as_str());

        let status = match match_procedure(&staged.proc_name, catalog) {
            None => {
                tracing::warn!(
                    %run_id,
                    procedure = %staged.proc_name,
                    "no catalog entry matches staged procedure, skipping"
                );
                summary.unmatched.push(staged.proc_name.clone());
                StagedStatus::Unmatched
            }
            Some(procedure) => {
                tracing::debug!(
                    procedure = %staged.proc_name,
                    catalog_id = %procedure.id,
                    "matched staged procedure"
                );
                let outcome = materialize(logs, staged, &procedure.id, user_id, options);
                summary.records_matched += 1;
                summary.procedures_imported += outcome.imported;
                summary.failed_inserts += outcome.failed();
                StagedStatus::Imported
            }
        };

        if let Err(e) = staging.set_staged_status(staged.id, status) {
            tracing::warn!(staged_id = staged.id, error = %e, "failed to update staged status");
        }
    }

    summary.modules_processed = modules.len();
    staging.set_run_status(run_id, ImportStatus::Completed)?;

    tracing::info!(
        %run_id,
        matched = summary.records_matched,
        unmatched = summary.unmatched.len(),
        imported = summary.procedures_imported,
        failed = summary.failed_inserts,
        "import run reconciled"
    );

    Ok(summary)
}
