use fmh_core::model::Procedure;
use fmh_core::parsing::ParsedLogbook;
use fmh_core::{ImportSummary, StagingReport};

pub fn format_parsed(parsed: &ParsedLogbook) -> String {
    let mut out = String::new();

    if parsed.records.is_empty() {
        out.push_str("No procedures recognised.\n");
    }

    let name_width = parsed
        .records
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(10)
        .max(9);

    let mut current_module: Option<&str> = None;
    for record in &parsed.records {
        if current_module != Some(record.module_name.as_str()) {
            if current_module.is_some() {
                out.push('\n');
            }
            out.push_str(&format!("=== {} ===\n\n", record.module_name));
            out.push_str(&format!(
                "  {:<width$}  {:>5}  {:>5}  {:>5}  {:>5}  {:>5}\n",
                "Procedure",
                "Min",
                "Resp",
                "Instr",
                "Asst",
                "Total",
                width = name_width
            ));
            current_module = Some(record.module_name.as_str());
        }
        out.push_str(&format!(
            "  {:<width$}  {:>5}  {:>5}  {:>5}  {:>5}  {:>5}\n",
            record.name,
            record.minimum,
            record.responsible,
            record.instructing,
            record.assistant,
            record.total,
            width = name_width
        ));
    }

    if !parsed.discarded.is_empty() {
        out.push_str(&format!(
            "\n{} line(s) without counts skipped: {}\n",
            parsed.discarded.len(),
            parsed.discarded.join(", ")
        ));
    }

    out
}

pub fn print_staging(report: &StagingReport) {
    println!("Import run {}", report.run.id);
    println!("  File:    {}", report.run.pdf_filename);
    println!("  Status:  {}", report.run.status);
    println!("  Staged:  {} procedure(s)", report.staged.len());
}

pub fn print_summary(summary: &ImportSummary) {
    println!("Import run {}", summary.run_id);
    println!("  Modules processed:   {}", summary.modules_processed);
    println!("  Records matched:     {}", summary.records_matched);
    println!("  Procedures imported: {}", summary.procedures_imported);
    if summary.failed_inserts > 0 {
        println!("  Failed inserts:      {}", summary.failed_inserts);
    }
    if !summary.unmatched.is_empty() {
        println!("\n  Not in catalog ({}):", summary.unmatched.len());
        for name in &summary.unmatched {
            println!("    {name}");
        }
    }
}

pub fn print_catalog(catalog: &[Procedure]) {
    if catalog.is_empty() {
        println!("Catalog is empty. Run `fmh catalog load` to load the builtin procedures.");
        return;
    }

    let id_width = catalog.iter().map(|p| p.id.len()).max().unwrap_or(2);
    for procedure in catalog {
        let english = procedure
            .title_en
            .as_deref()
            .map(|t| format!(" ({t})"))
            .unwrap_or_default();
        println!(
            "  {:<width$}  {}{}",
            procedure.id,
            procedure.title_de,
            english,
            width = id_width
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmh_core::parsing::parse_logbook;

    #[test]
    fn test_parsed_table_groups_by_module() {
        let parsed = parse_logbook(
            "Basis Allgemeinchirurgie\nAppendektomie\n30\n2\n1\n0\n\
             Modul Viszeralchirurgie\nCholezystektomie\n25\n1\n0\n1\nWhipple\n",
        );
        let table = format_parsed(&parsed);

        assert!(table.contains("=== Basis Allgemeinchirurgie ==="));
        assert!(table.contains("=== Modul Viszeralchirurgie ==="));
        assert!(table.contains("Appendektomie"));
        assert!(table.contains("1 line(s) without counts skipped: Whipple"));
    }

    #[test]
    fn test_empty_parse_says_so() {
        let table = format_parsed(&ParsedLogbook::default());
        assert!(table.starts_with("No procedures recognised."));
    }
}
