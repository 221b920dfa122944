//! Date helper functions

use crate::content::parse_date_string;

/// Format a front-matter date for display.
///
/// Dates that do not parse are shown as written.
///
/// # Examples
/// ```ignore
/// display_date("2024-01-15", "%Y.%m.%d") // -> "2024.01.15"
/// ```
pub fn display_date(raw: &str, format: &str) -> String {
    match parse_date_string(raw) {
        Some(date) => date.format(format).to_string(),
        None => raw.trim().to_string(),
    }
}

/// ISO 8601 form, for machine-readable output
pub fn date_iso(raw: &str) -> Option<String> {
    parse_date_string(raw).map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string())
}
