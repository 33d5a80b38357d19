// Helpers for cleaning spreadsheet cells and formatting console output.
//
// Everything the loader needs to turn loose text into typed values lives here
// so the rest of the code can assume one encoding for an absent cell.
use num_format::{Locale, ToFormattedString};

/// Map empty or whitespace-only text to `None`. Anything else is kept as written,
/// so `"ICFR "` stays distinct from `"ICFR"`.
pub fn clean_text(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

/// Parse a Year cell.
///
/// - `Ok(None)` for an empty cell.
/// - Accepts integral floats such as `2022.0`, which is what spreadsheet
///   exports emit for numeric columns that contain blanks.
/// - `Err(())` for anything else; the caller attaches row context.
pub(crate) fn parse_year_safe(s: Option<&str>) -> Result<Option<i32>, ()> {
    let Some(s) = s.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if let Ok(y) = s.parse::<i32>() {
        return Ok(Some(y));
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() <= i32::MAX as f64 => {
            Ok(Some(f as i32))
        }
        _ => Err(()),
    }
}

/// Normalize a header cell: strip a BOM, trim, collapse inner whitespace.
pub fn normalize_header(raw: &str) -> String {
    raw.trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// A text bar scaled so that `max` fills `width` cells. Non-zero counts get at least one cell.
pub fn bar(count: usize, max: usize, width: usize) -> String {
    if count == 0 || max == 0 {
        return String::new();
    }
    let cells = (count * width).div_ceil(max).clamp(1, width);
    "█".repeat(cells)
}

/// Parse a comma or space separated list of 1-based menu numbers.
///
/// Returns zero-based indices, or `None` if any token is not a number in `1..=len`.
pub fn parse_indices(input: &str, len: usize) -> Option<Vec<usize>> {
    let mut out = Vec::new();
    for token in input.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }
        let n: usize = token.parse().ok()?;
        if n == 0 || n > len {
            return None;
        }
        if !out.contains(&(n - 1)) {
            out.push(n - 1);
        }
    }
    Some(out)
}
