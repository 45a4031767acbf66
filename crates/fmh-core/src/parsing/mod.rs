pub mod line;
pub mod values;

use crate::model::ProcedureRecord;
use line::{classify_line, LineKind};
use serde::{Deserialize, Serialize};

/// How many lines after a procedure name may hold its counts.
pub const LOOKAHEAD: usize = 9;

/// Result of one segmentation pass over a logbook's text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedLogbook {
    pub records: Vec<ProcedureRecord>,
    /// Module names in the order they first appeared.
    pub modules: Vec<String>,
    /// Candidate lines inside a module that had no count block.
    pub discarded: Vec<String>,
}

impl ParsedLogbook {
    /// Number of distinct modules that contributed at least one record.
    pub fn modules_with_records(&self) -> usize {
        self.modules
            .iter()
            .filter(|m| self.records.iter().any(|r| &r.module_name == *m))
            .count()
    }
}

/// Parse raw logbook text into procedure records.
pub fn parse_procedures(raw_text: &str) -> Vec<ProcedureRecord> {
    parse_logbook(raw_text).records
}

/// Parse raw logbook text, keeping the module list and discarded candidates.
///
/// The text is scanned line by line. A module header sets the active module;
/// a procedure name inside a module is followed by up to [`LOOKAHEAD`] count
/// lines (minimum, responsible, instructing, assistant, total). Names without
/// counts, lines before the first module and page furniture are skipped.
/// Never fails: malformed input yields fewer records.
pub fn parse_logbook(raw_text: &str) -> ParsedLogbook {
    let lines: Vec<&str> = raw_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let kinds: Vec<LineKind> = lines.iter().map(|l| classify_line(l)).collect();

    let mut parsed = ParsedLogbook::default();
    let mut current_module: Option<&str> = None;
    let mut i = 0;

    while i < lines.len() {
        match kinds[i] {
            LineKind::Noise | LineKind::Numeric(_) => {
                i += 1;
            }
            LineKind::ModuleHeader => {
                let module = lines[i];
                if !parsed.modules.iter().any(|m| m == module) {
                    parsed.modules.push(module.to_string());
                }
                current_module = Some(module);
                i += 1;
            }
            LineKind::Candidate => {
                let Some(module) = current_module else {
                    i += 1;
                    continue;
                };

                let nums = collect_counts(&kinds[i + 1..]);
                if nums.is_empty() {
                    tracing::debug!(line = lines[i], "discarding candidate without counts");
                    parsed.discarded.push(lines[i].to_string());
                    i += 1;
                    continue;
                }

                parsed
                    .records
                    .push(ProcedureRecord::from_counts(lines[i], module, &nums));
                i += 1 + nums.len();
            }
        }
    }

    parsed
}

/// Collect the run of count lines directly following a procedure name.
fn collect_counts(following: &[LineKind]) -> Vec<u32> {
    following
        .iter()
        .take(LOOKAHEAD)
        .map_while(|kind| match kind {
            LineKind::Numeric(n) => Some(*n),
            _ => None,
        })
        .collect()
}
