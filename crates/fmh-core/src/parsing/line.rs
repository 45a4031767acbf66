use regex::Regex;
use std::sync::LazyLock;

use super::values::{is_digits, parse_count};

/// What a single trimmed logbook line is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Page furniture: date stamps, page footers, title banners, captions.
    Noise,
    /// Start of a new module ("Basis ..." or "Modul ...").
    ModuleHeader,
    /// A count cell.
    Numeric(u32),
    /// Anything else; possibly a procedure name.
    Candidate,
}

static MODULE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(basis|modul)\s+.+$").expect("module header pattern is valid"));

static PAGE_FOOTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(seite|page)\s+\d+(\s*(von|of|/)\s*\d+)?$").expect("page footer pattern is valid")
});

/// Lowercase prefixes of boilerplate lines.
const NOISE_PREFIXES: &[&str] = &["stand:", "siwf", "fmh", "erfasste prozeduren"];

/// Classify one trimmed, non-empty line.
pub fn classify_line(line: &str) -> LineKind {
    let lower = line.to_lowercase();

    if NOISE_PREFIXES.iter().any(|p| lower.starts_with(p)) || PAGE_FOOTER.is_match(line) {
        return LineKind::Noise;
    }

    if MODULE_HEADER.is_match(line) {
        return LineKind::ModuleHeader;
    }

    if is_digits(line) {
        // A digit run too large for a count is a reference number, not a cell.
        return match parse_count(line) {
            Some(n) => LineKind::Numeric(n),
            None => LineKind::Noise,
        };
    }

    LineKind::Candidate
}
