use std::sync::Arc;

use fmh_core::extraction::PdfExtractor;
use fmh_core::store::SqliteStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub extractor: Arc<dyn PdfExtractor>,
    /// Hospital recorded on every imported log row.
    pub hospital: Option<String>,
}

impl AppState {
    pub fn new(store: Arc<SqliteStore>, extractor: Arc<dyn PdfExtractor>) -> Self {
        AppState {
            store,
            extractor,
            hospital: None,
        }
    }

    pub fn with_hospital(mut self, hospital: Option<String>) -> Self {
        self.hospital = hospital;
        self
    }
}
