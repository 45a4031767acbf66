/// Largest count a logbook cell can plausibly hold. Each unit of a count
/// becomes one log row, so larger values are read as reference numbers.
pub const MAX_COUNT: u32 = 10_000;

/// Parse a count cell from a logbook table.
///
/// Only plain decimal digits are accepted: no sign, no thousands separators,
/// no decimals. Returns None for anything else, including values above
/// [`MAX_COUNT`].
pub fn parse_count(s: &str) -> Option<u32> {
    if !is_digits(s) {
        return None;
    }
    s.parse().ok().filter(|n| *n <= MAX_COUNT)
}

/// True if the string is non-empty and made only of ASCII digits.
pub fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
