pub mod matcher;

use crate::error::LogbookError;
use crate::model::Procedure;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

const BUILTIN_CATALOG_JSON: &str = include_str!("../../../../catalog/procedures.json");

static BUILTIN_CATALOG: LazyLock<Vec<Procedure>> = LazyLock::new(|| {
    serde_json::from_str(BUILTIN_CATALOG_JSON).expect("embedded procedures.json is valid")
});

/// Get the procedure catalog shipped with the binary.
pub fn builtin_catalog() -> &'static [Procedure] {
    &BUILTIN_CATALOG
}

/// Load a procedure catalog from a JSON file (an array of procedures).
pub fn load_catalog(path: &Path) -> Result<Vec<Procedure>, LogbookError> {
    let content = std::fs::read_to_string(path).map_err(|e| LogbookError::CatalogLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let catalog: Vec<Procedure> =
        serde_json::from_str(&content).map_err(|e| LogbookError::CatalogLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Parse a procedure catalog from a JSON string (no file path context).
pub fn parse_catalog_str(json: &str) -> Result<Vec<Procedure>, LogbookError> {
    let catalog: Vec<Procedure> = serde_json::from_str(json)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Validate that a catalog is well-formed.
pub fn validate_catalog(catalog: &[Procedure]) -> Result<(), LogbookError> {
    let mut seen = HashSet::new();

    for procedure in catalog {
        if procedure.id.trim().is_empty() {
            return Err(LogbookError::CatalogInvalid(
                "procedure id must not be empty".into(),
            ));
        }

        if procedure.title_de.trim().is_empty() {
            return Err(LogbookError::CatalogInvalid(format!(
                "procedure '{}' has an empty German title",
                procedure.id
            )));
        }

        if !seen.insert(procedure.id.as_str()) {
            return Err(LogbookError::CatalogInvalid(format!(
                "duplicate procedure id '{}'",
                procedure.id
            )));
        }
    }

    Ok(())
}
