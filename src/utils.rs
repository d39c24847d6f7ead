//! Utility functions for text cleanup, truncation and date normalization.
//!
//! This module provides helper functions used throughout the application:
//! - HTML tag stripping and whitespace collapsing for feed descriptions and pages
//! - Length truncation for extracted article text and log previews
//! - Best-effort normalization of free-text publication dates
//! - Hostname extraction for compact output labels

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Marker appended to text cut down to the configured maximum length.
pub const ELLIPSIS: &str = "...";

/// Remove HTML tags from a string and trim the result.
///
/// Inner whitespace is left alone, so `"a <br/> b"` becomes `"a  b"`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(strip_html("<p>Hello <b>world</b>!</p>"), "Hello world!");
/// ```
pub fn strip_html(s: &str) -> String {
    TAG_RE.replace_all(s, "").trim().to_string()
}

/// Collapse every run of whitespace to a single space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RE.replace_all(s, " ").trim().to_string()
}

/// Cut `text` to `max` characters and append [`ELLIPSIS`] when it was longer.
///
/// Lengths are counted in characters, not bytes.
pub fn truncate_content(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}…(+{} bytes)", &s[..byte_idx], s.len() - byte_idx),
        None => s.to_string(),
    }
}

/// Hostname of a URL, or `None` when it does not parse or has no host.
pub fn hostname(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
}

/// One way of reading a publication date.
enum DatePattern {
    Rfc2822,
    Rfc3339,
    /// `chrono` format for a date and time, applied after dropping a trailing zone token.
    DateTime(&'static str),
    /// `chrono` format for a bare date.
    Date(&'static str),
}

/// Patterns tried in order; the first one that parses wins.
const DATE_PATTERNS: &[DatePattern] = &[
    DatePattern::Rfc2822,
    DatePattern::Rfc3339,
    // Two-digit years first: `%Y` would happily read "06" as year 6.
    DatePattern::DateTime("%d %b %y %H:%M:%S"),
    DatePattern::DateTime("%d %b %y %H:%M"),
    DatePattern::DateTime("%d %b %Y %H:%M:%S"),
    DatePattern::DateTime("%d %b %Y %H:%M"),
    DatePattern::DateTime("%Y-%m-%d %H:%M:%S"),
    DatePattern::DateTime("%Y-%m-%dT%H:%M:%S"),
    DatePattern::Date("%Y-%m-%d"),
    DatePattern::Date("%d %b %Y"),
];

impl DatePattern {
    fn parse(&self, s: &str) -> Option<NaiveDate> {
        match self {
            DatePattern::Rfc2822 => DateTime::parse_from_rfc2822(s).ok().map(|d| d.date_naive()),
            DatePattern::Rfc3339 => DateTime::parse_from_rfc3339(s).ok().map(|d| d.date_naive()),
            DatePattern::DateTime(fmt) => NaiveDateTime::parse_from_str(without_zone(s), fmt)
                .ok()
                .map(|d| d.date()),
            DatePattern::Date(fmt) => NaiveDate::parse_from_str(without_zone(s), fmt).ok(),
        }
    }
}

/// Drop a leading `"Mon,"`-style weekday. It is never checked against the date.
fn without_weekday(s: &str) -> &str {
    match s.split_once(',') {
        Some((head, tail))
            if !head.trim().is_empty() && head.trim().chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            tail.trim()
        }
        _ => s,
    }
}

/// Drop a trailing zone token such as `GMT`, `MST` or `+0200`.
fn without_zone(s: &str) -> &str {
    let Some((head, last)) = s.rsplit_once(' ') else {
        return s;
    };
    let is_name = last.chars().all(|c| c.is_ascii_alphabetic());
    let is_offset = (last.starts_with('+') || last.starts_with('-'))
        && last.len() > 1
        && last[1..].chars().all(|c| c.is_ascii_digit() || c == ':');
    if is_name || is_offset { head.trim_end() } else { s }
}

/// Normalize a free-text publication date to `DD-MM-YYYY`.
///
/// Empty input stays empty. A string no pattern understands is returned
/// unchanged so the caller still has something to show.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_date("Mon, 15 Mar 2023 10:30:00 GMT"), "15-03-2023");
/// assert_eq!(normalize_date("not a date"), "not a date");
/// ```
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let candidate = without_weekday(trimmed);
    DATE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.parse(candidate))
        .map(|date| date.format("%d-%m-%Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}
