//! # Calendar Text Parsing
//!
//! Lenient parsers for the common calendar text forms accepted by the
//! `date`, `datetime` and `time` built-in kinds.
//!
//! Offset-less date-times are interpreted as UTC. Out-of-range components
//! (month 13, hour 30) are rejected by every parser, with one exception: the
//! date parser ignores a time-of-day suffix entirely, so
//! `"2011-11-03 30:23:45"` still yields `2011-11-03`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%d %H:%M:%S%.f%:z"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Parse a calendar date.
///
/// Accepts the plain date forms, RFC 3339 date-times, and a leading
/// `YYYY-MM-DD` followed by a time-of-day suffix.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Some(date) = parse_plain_date(text) {
        return Some(date);
    }
    if let Some(dt) = parse_datetime(text) {
        return Some(dt.date_naive());
    }
    date_with_time_suffix(text)
}

/// Parse a date-time. Plain dates give midnight UTC.
pub fn parse_datetime(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(utc(naive));
        }
    }
    parse_plain_date(text).and_then(midnight_utc)
}

/// Parse a time of day.
///
/// `HH:MM` and `HH:MM:SS[.f]`, or the time component of anything
/// [`parse_datetime`] accepts.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    for fmt in TIME_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(text, fmt) {
            return Some(t);
        }
    }
    parse_datetime(text).map(|dt| dt.time())
}

/// Widen a date to midnight UTC.
pub fn midnight_utc(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    date.and_hms_opt(0, 0, 0).map(utc)
}

fn utc(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    Utc.fix().from_utc_datetime(&naive)
}

fn parse_plain_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn date_with_time_suffix(text: &str) -> Option<NaiveDate> {
    let head = text.get(..10)?;
    let rest = text.get(10..)?;
    let rest = rest
        .strip_prefix('T')
        .or_else(|| rest.strip_prefix(' '))?
        .trim();
    if !looks_like_time(rest) {
        return None;
    }
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn looks_like_time(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit())
        && text.contains(':')
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ':' | '.' | '+' | '-' | 'Z' | ' '))
}
