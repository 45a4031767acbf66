use std::path::Path;

use fmh_core::catalog::{builtin_catalog, load_catalog};
use fmh_core::error::LogbookError;
use fmh_core::store::CatalogStore;

use crate::output;

pub fn list(db: &Path) -> Result<(), LogbookError> {
    let store = super::open_store(db)?;
    output::table::print_catalog(&store.load_catalog()?);
    Ok(())
}

pub fn load(db: &Path, file: Option<&Path>) -> Result<(), LogbookError> {
    let procedures = match file {
        Some(path) => load_catalog(path)?,
        None => builtin_catalog().to_vec(),
    };

    let store = super::open_store(db)?;
    let written = store.upsert_procedures(&procedures)?;
    println!("Loaded {written} procedure(s) into the catalog");
    Ok(())
}
