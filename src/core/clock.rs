//! Wall-clock parsing and offset conversions.
//!
//! All timestamps in the pipeline are timezone-naive. Text carrying an
//! offset keeps the local wall time as written and discards the offset, so
//! that sensors exported with and without zone information can be compared.

use chrono::{DateTime, Duration, NaiveDateTime};

/// Format used for the `Time` column of every written table.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Formats carrying a UTC offset, tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %:z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Naive formats.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
];

/// Parse wall-clock text into a naive timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.fff]` with an optional
/// `UTC±HH:MM`, `±HH:MM`, `±HHMM` or `Z` suffix, the `T`-separated variant
/// and minute precision. Returns `None` for anything else.
pub fn parse_wall_clock(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    // Phyphox writes the offset as "UTC+01:00".
    let normalized = match text.rfind(" UTC") {
        Some(pos) if text.len() > pos + 4 => format!("{} {}", &text[..pos], &text[pos + 4..]),
        Some(pos) => text[..pos].to_string(),
        None => text.to_string(),
    };
    let normalized = normalized.strip_suffix('Z').unwrap_or(&normalized);

    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(normalized, fmt).ok())
        .map(|dt| dt.naive_local())
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(normalized, fmt).ok())
        })
}

/// Format a timestamp for output.
pub fn format_wall_clock(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIME_FORMAT).to_string()
}

/// Convert fractional seconds to a duration with nanosecond resolution.
pub fn offset_from_secs(secs: f64) -> Option<Duration> {
    if !secs.is_finite() {
        return None;
    }
    Some(Duration::nanoseconds((secs * 1e9).round() as i64))
}

/// Signed number of seconds from `from` to `to`.
pub fn seconds_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let delta = to - from;
    delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) / 1e9
}

#[cfg(test)]
pub(crate) fn ts(text: &str) -> NaiveDateTime {
    parse_wall_clock(text).expect("valid test timestamp")
}
