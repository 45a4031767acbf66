use std::sync::Arc;

use crate::catalog::builtin_catalog;
use crate::error::LogbookError;
use crate::extraction::{join_pages, PdfExtractor};
use crate::model::{ImportOptions, ImportSource, Procedure};
use crate::parsing::{parse_logbook, ParsedLogbook};
use crate::reconcile::{reconcile_run, ImportSummary};
use crate::session::SessionContext;
use crate::staging::stage_records;
use crate::store::{CatalogStore, LogbookStore};

/// An uploaded logbook PDF.
#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub source: ImportSource,
}

/// Extract and parse a logbook PDF without touching storage.
pub fn parse_pdf(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
) -> Result<ParsedLogbook, LogbookError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    let raw = join_pages(&pages);
    let parsed = parse_logbook(&raw);
    tracing::debug!(
        backend = extractor.backend_name(),
        pages = pages.len(),
        records = parsed.records.len(),
        discarded = parsed.discarded.len(),
        "parsed logbook"
    );
    Ok(parsed)
}

/// The stored catalog, seeded with the builtin one when the store has none.
pub fn ensure_catalog(store: &dyn CatalogStore) -> Result<Vec<Procedure>, LogbookError> {
    let catalog = store.load_catalog()?;
    if !catalog.is_empty() {
        return Ok(catalog);
    }
    let seeded = store.upsert_procedures(builtin_catalog())?;
    tracing::info!(procedures = seeded, "seeded empty catalog with builtin procedures");
    store.load_catalog()
}

/// Extract, parse, stage and reconcile one PDF for the signed-in user.
pub async fn import_pdf<S>(
    store: Arc<S>,
    extractor: Arc<dyn PdfExtractor>,
    session: &SessionContext,
    upload: PdfUpload,
    options: ImportOptions,
) -> Result<ImportSummary, LogbookError>
where
    S: LogbookStore + 'static,
{
    let identity = session.require()?;
    let PdfUpload {
        bytes,
        filename,
        source,
    } = upload;

    let parsed =
        tokio::task::spawn_blocking(move || parse_pdf(&bytes, extractor.as_ref())).await??;
    if parsed.records.is_empty() {
        return Err(LogbookError::NoProcedures);
    }
    tracing::info!(
        file = %filename,
        records = parsed.records.len(),
        modules = parsed.modules_with_records(),
        "logbook parsed"
    );

    let report =
        stage_records(Arc::clone(&store), session, &filename, source, parsed.records).await?;
    let run_id = report.run.id;

    tokio::task::spawn_blocking(move || {
        let catalog = ensure_catalog(&*store)?;
        reconcile_run(
            &*store,
            &*store,
            &catalog,
            run_id,
            &identity.user_id,
            &options,
        )
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::PageContent;

    struct FixedExtractor(Result<Vec<String>, ()>);

    impl PdfExtractor for FixedExtractor {
        fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageContent>, LogbookError> {
            match &self.0 {
                Ok(lines) => Ok(vec![PageContent {
                    page_number: 1,
                    lines: lines.clone(),
                }]),
                Err(()) => Err(LogbookError::Extraction("not a pdf".into())),
            }
        }

        fn backend_name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_parse_pdf_propagates_extraction_failure() {
        let err = parse_pdf(b"garbage", &FixedExtractor(Err(()))).unwrap_err();
        assert!(err.is_extraction());
    }

    #[test]
    fn test_parse_pdf_segments_extracted_text() {
        let lines = ["Basis Chirurgie", "Hautnaht", "20", "4", "1", "2"];
        let extractor = FixedExtractor(Ok(lines.iter().map(|s| s.to_string()).collect()));

        let parsed = parse_pdf(b"%PDF", &extractor).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].total, 7);
    }

    #[test]
    fn test_ensure_catalog_seeds_builtin_once() {
        let store = crate::store::SqliteStore::open_in_memory().unwrap();
        let first = ensure_catalog(&store).unwrap();
        assert_eq!(first.len(), builtin_catalog().len());
        assert_eq!(first[0].id, builtin_catalog()[0].id);

        let second = ensure_catalog(&store).unwrap();
        assert_eq!(second, first);
    }
}
