use std::path::{Path, PathBuf};

use fmh_core::error::LogbookError;
use fmh_core::extraction::pdftotext::PdftotextExtractor;
use fmh_core::model::{Identity, ImportSource};
use fmh_core::{stage_records, SessionContext};

use crate::output;

pub async fn run(db: &Path, pdf_file: PathBuf, user: &str) -> Result<(), LogbookError> {
    let pdf_bytes = std::fs::read(&pdf_file)?;
    let parsed = fmh_core::parse_pdf(&pdf_bytes, &PdftotextExtractor::new())?;
    if parsed.records.is_empty() {
        return Err(LogbookError::NoProcedures);
    }

    let store = super::open_store(db)?;
    let session = SessionContext::signed_in(Identity::new(user));
    let report = stage_records(
        store,
        &session,
        &file_name(&pdf_file),
        ImportSource::ClientAiParse,
        parsed.records,
    )
    .await?;

    output::table::print_staging(&report);
    eprintln!(
        "Review the staged rows, then run `fmh reconcile {}`",
        report.run.id
    );
    Ok(())
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "logbook.pdf".into())
}
