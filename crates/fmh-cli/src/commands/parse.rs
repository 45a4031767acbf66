use fmh_core::error::LogbookError;
use fmh_core::extraction::pdftotext::PdftotextExtractor;
use std::path::PathBuf;

use crate::output;

pub fn run(
    pdf_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), LogbookError> {
    let pdf_bytes = std::fs::read(&pdf_file)?;
    let extractor = PdftotextExtractor::new();
    let parsed = fmh_core::parse_pdf(&pdf_bytes, &extractor)?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&parsed)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Parsed {} procedure(s) in {} module(s), written to {}",
                parsed.records.len(),
                parsed.modules_with_records(),
                path.display()
            );
            if !parsed.discarded.is_empty() {
                eprintln!(
                    "  {} line(s) without counts skipped",
                    parsed.discarded.len()
                );
            }
        }
        None => match output_format {
            "json" => output::json::print(&parsed)?,
            _ => print!("{}", output::table::format_parsed(&parsed)),
        },
    }

    Ok(())
}
