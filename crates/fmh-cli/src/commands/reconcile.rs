use std::path::Path;

use fmh_core::error::LogbookError;
use fmh_core::model::ImportOptions;
use fmh_core::pipeline::ensure_catalog;
use fmh_core::reconcile_run;
use uuid::Uuid;

use crate::output;

pub fn run(
    db: &Path,
    run_id: Uuid,
    user: &str,
    options: ImportOptions,
) -> Result<(), LogbookError> {
    let store = super::open_store(db)?;
    let catalog = ensure_catalog(&*store)?;
    let summary = reconcile_run(&*store, &*store, &catalog, run_id, user, &options)?;
    output::table::print_summary(&summary);
    Ok(())
}
