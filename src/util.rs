// Utility helpers for parsing CSV fields and formatting table cells.
//
// Everything here is pure: the same input always renders the same string,
// so table widths stay predictable across runs.
use num_format::{Locale, ToFormattedString};

/// Cell width used when each day gets its own full-width table page.
pub const SEPARATE_CELL_WIDTH: usize = 45;
/// Cell width used by the side-by-side table and chart page.
pub const COMBINED_CELL_WIDTH: usize = 25;

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i32>().ok()
}

/// Parse a late flag. Missing or blank means "not late"; anything that is
/// not a recognizable boolean yields `None`.
pub fn parse_bool_safe(s: Option<&str>) -> Option<bool> {
    let Some(s) = s else { return Some(false) };
    match s.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" | "n" => Some(false),
        "true" | "1" | "yes" | "y" => Some(true),
        _ => None,
    }
}

/// Hard cutoff at `max` characters. No ellipsis, no word-boundary handling.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Render a name list as `"0"` when empty, otherwise `"<count> (<a, b, ...>)"`,
/// optionally cut to `width` characters.
pub fn format_name_cell(names: &[String], width: Option<usize>) -> String {
    let full = if names.is_empty() {
        "0".to_string()
    } else {
        format!("{} ({})", names.len(), names.join(", "))
    };
    match width {
        Some(w) => truncate_chars(&full, w),
        None => full,
    }
}

/// Last whitespace-delimited token of a display name.
pub fn surname(name: &str) -> &str {
    name.split_whitespace().last().unwrap_or(name)
}

/// `100 * present / total`, or `0.0` for an empty day.
pub fn accountability_pct(present: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    present as f64 / total as f64 * 100.0
}

/// One decimal place, as printed in the page header.
pub fn format_pct(pct: f64) -> String {
    format!("{:.1}", pct)
}

/// Pad `s` on both sides to `width` characters. Extra padding goes right.
pub fn center(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.to_string();
    }
    let left = (width - len) / 2;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(width - len - left))
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages, e.g. `1,204 rows loaded`.
    n.to_formatted_string(&Locale::en)
}
