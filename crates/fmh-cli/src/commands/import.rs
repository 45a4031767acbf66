use std::path::{Path, PathBuf};
use std::sync::Arc;

use fmh_core::error::LogbookError;
use fmh_core::extraction::pdftotext::PdftotextExtractor;
use fmh_core::model::{Identity, ImportOptions, ImportSource};
use fmh_core::{import_pdf, PdfUpload, SessionContext};

use super::stage::file_name;
use crate::output;

pub async fn run(
    db: &Path,
    pdf_file: PathBuf,
    user: &str,
    options: ImportOptions,
) -> Result<(), LogbookError> {
    let upload = PdfUpload {
        bytes: std::fs::read(&pdf_file)?,
        filename: file_name(&pdf_file),
        source: ImportSource::CliImport,
    };

    let store = super::open_store(db)?;
    let session = SessionContext::signed_in(Identity::new(user));
    let summary = import_pdf(
        store,
        Arc::new(PdftotextExtractor::new()),
        &session,
        upload,
        options,
    )
    .await?;

    output::table::print_summary(&summary);
    Ok(())
}
