//! Import of FMH/SIWF surgical logbook PDFs into a per-user procedure log.
//!
//! PDF bytes are turned into text by an extractor, segmented into procedure
//! records, staged under an import run, matched against the procedure catalog
//! and finally expanded into one log row per performed procedure.

pub mod catalog;
pub mod error;
pub mod extraction;
pub mod materialize;
pub mod model;
pub mod parsing;
pub mod pipeline;
pub mod reconcile;
pub mod session;
pub mod staging;
pub mod store;

pub use error::LogbookError;
pub use pipeline::{import_pdf, parse_pdf, PdfUpload};
pub use reconcile::{reconcile_run, ImportSummary};
pub use session::SessionContext;
pub use staging::{stage_records, StagingReport};
