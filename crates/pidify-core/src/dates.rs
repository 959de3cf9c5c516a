//! Free-form date normalization.
//!
//! Plan exports print dates in whatever form the author typed them. Everything
//! is reduced to a [`NaiveDate`] and reported as `YYYY-MM-DD`; time of day and
//! time zone are discarded.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Date-only layouts, tried in order. Numeric forms are month-first; the
/// day-first variants only succeed when the first number cannot be a month.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%d-%B-%Y",
    "%Y %B %d",
    "%m/%d/%y",
    "%d/%m/%y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

static WEEKDAY_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").unwrap()
});

static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").unwrap());

static ZONE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:z|utc|gmt)$").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Parse a free-form date string. Returns `None` for anything that is not a
/// complete calendar date.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim().trim_end_matches(['.', ',', ';']);
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return plausible(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return plausible(dt.date_naive());
    }

    let cleaned = WEEKDAY_PREFIX.replace(trimmed, "");
    let cleaned = ORDINAL_SUFFIX.replace_all(&cleaned, "$1");
    let cleaned = ZONE_SUFFIX.replace(&cleaned, "");
    let cleaned = WHITESPACE.replace_all(cleaned.trim(), " ");

    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
        .chain(
            DATETIME_FORMATS
                .iter()
                .filter_map(|fmt| NaiveDateTime::parse_from_str(&cleaned, fmt).ok())
                .map(|dt| dt.date()),
        )
        .find_map(plausible)
}

/// Format a date the way the report carries it.
pub fn to_iso(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `normalize_date` followed by [`to_iso`].
pub fn normalize_to_iso(raw: &str) -> Option<String> {
    normalize_date(raw).map(|d| to_iso(&d))
}

// Rejects short years that %Y happily accepts ("3/4/24" as year 24).
fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    (1000..=9999).contains(&date.year()).then_some(date)
}
