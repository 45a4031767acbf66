pub mod catalog;
pub mod import;
pub mod parse;
pub mod reconcile;
pub mod serve;
pub mod stage;
pub mod token;

use std::path::Path;
use std::sync::Arc;

use fmh_core::error::LogbookError;
use fmh_core::store::SqliteStore;

fn open_store(db: &Path) -> Result<Arc<SqliteStore>, LogbookError> {
    tracing::debug!(db = %db.display(), "opening logbook database");
    Ok(Arc::new(SqliteStore::open(db)?))
}
