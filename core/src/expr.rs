//! Time expression parsing
//!
//! Three expression families are supported:
//! - Relative: `[+-]?(\d+[smhdwMy])+` such as "+1h", "-2d", "1d12h30m".
//!   Months and years are calendar-free approximations (30d / 365d).
//! - Keywords: "now", "yesterday", "tomorrow".
//! - Absolute: "YYYY-MM-DD[ HH:MM[:SS]]" or a bare "HH:MM[:SS]" (today),
//!   interpreted in the local timezone.
//!
//! All results are integer epoch seconds; calendar strings exist only at
//! the UI boundary.

use std::sync::LazyLock;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use regex::Regex;

use crate::error::{Error, Result};

/// Seconds per supported unit
const MINUTE: i64 = 60;
const HOUR: i64 = 3600;
const DAY: i64 = 86_400;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

static RELATIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+[smhdwMy])+$").expect("relative grammar regex"));

static TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)([smhdwMy])").expect("relative term regex"));

/// Granularity at which a time expression was specified.
///
/// Drives how much of a confirmed timestamp gets randomized so that
/// hand-entered coarse times don't look mechanically round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Expression carried explicit seconds; randomize nothing beyond them
    Second,
    /// Expression bottomed out at minutes; reroll seconds
    Minute,
    /// Hour or coarser; reroll minutes and seconds
    Hour,
    /// Exact time, leave untouched
    Full,
}

fn unit_seconds(unit: char) -> i64 {
    match unit {
        's' => 1,
        'm' => MINUTE,
        'h' => HOUR,
        'd' => DAY,
        'w' => WEEK,
        'M' => MONTH,
        'y' => YEAR,
        // unreachable: the grammar only admits the units above
        _ => 0,
    }
}

/// Whether `text` matches the relative-expression grammar.
pub fn is_relative(text: &str) -> bool {
    RELATIVE_RE.is_match(text.trim())
}

/// Parse a relative expression into a signed offset in seconds.
///
/// Each (magnitude, unit) pair contributes `magnitude * unit_seconds`;
/// the optional leading sign applies to the whole sum and defaults to
/// positive.
pub fn parse_relative(text: &str) -> Result<i64> {
    let trimmed = text.trim();
    if !RELATIVE_RE.is_match(trimmed) {
        return Err(Error::UnrecognizedExpression(trimmed.to_string()));
    }

    let sign: i64 = if trimmed.starts_with('-') { -1 } else { 1 };
    let mut total: i64 = 0;
    for cap in TERM_RE.captures_iter(trimmed) {
        let magnitude: i64 = cap[1]
            .parse()
            .map_err(|_| Error::Overflow(trimmed.to_string()))?;
        let unit = cap[2].chars().next().unwrap_or('s');
        total = magnitude
            .checked_mul(unit_seconds(unit))
            .and_then(|term| total.checked_add(term))
            .ok_or_else(|| Error::Overflow(trimmed.to_string()))?;
    }
    Ok(sign * total)
}

/// Parse an absolute expression: keyword, date, date-time, or bare time.
pub fn parse_absolute(text: &str) -> Result<i64> {
    let trimmed = text.trim();
    let now = Local::now();

    match trimmed.to_lowercase().as_str() {
        "now" => return Ok(now.timestamp()),
        "yesterday" => return Ok(now.timestamp() - DAY),
        "tomorrow" => return Ok(now.timestamp() + DAY),
        _ => {}
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return local_epoch(ndt, trimmed);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return local_epoch(date.and_time(NaiveTime::MIN), trimmed);
    }

    for fmt in ["%H:%M:%S", "%H:%M"] {
        if let Ok(time) = NaiveTime::parse_from_str(trimmed, fmt) {
            return local_epoch(now.date_naive().and_time(time), trimmed);
        }
    }

    Err(Error::UnrecognizedExpression(trimmed.to_string()))
}

/// Parse any supported expression against a base time.
///
/// Empty text yields `base`; relative text offsets `base`; everything
/// else is delegated to [`parse_absolute`].
pub fn parse(text: &str, base: i64) -> Result<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(base);
    }
    if RELATIVE_RE.is_match(trimmed) {
        return Ok(base + parse_relative(trimmed)?);
    }
    parse_absolute(trimmed)
}

/// Derive the precision of an expression from its smallest unit.
///
/// Explicit seconds mean the user typed exactly what they wanted
/// ([`Precision::Full`]); absolute and empty expressions are also taken
/// at face value.
pub fn detect_precision(text: &str) -> Precision {
    let trimmed = text.trim();
    if trimmed.is_empty() || !RELATIVE_RE.is_match(trimmed) {
        return Precision::Full;
    }

    let mut has_minute = false;
    for cap in TERM_RE.captures_iter(trimmed) {
        match &cap[2] {
            "s" => return Precision::Full,
            "m" => has_minute = true,
            _ => {}
        }
    }
    if has_minute {
        Precision::Minute
    } else {
        Precision::Hour
    }
}

/// Format an epoch as a local calendar string for display.
pub fn format_epoch(epoch: i64) -> String {
    match Local.timestamp_opt(epoch, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format!("@{}", epoch),
    }
}

/// Render a signed offset as a short human phrase ("in 1h 30m", "2d ago").
pub fn describe_offset(delta: i64) -> String {
    if delta == 0 {
        return "now".to_string();
    }

    let mut rest = delta.abs();
    let mut parts = Vec::new();
    for (size, label) in [
        (YEAR, "y"),
        (WEEK, "w"),
        (DAY, "d"),
        (HOUR, "h"),
        (MINUTE, "m"),
        (1, "s"),
    ] {
        if rest >= size && parts.len() < 2 {
            parts.push(format!("{}{}", rest / size, label));
            rest %= size;
        }
    }

    let phrase = parts.join(" ");
    if delta > 0 {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}

fn local_epoch(ndt: NaiveDateTime, original: &str) -> Result<i64> {
    Local
        .from_local_datetime(&ndt)
        .single()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| Error::InvalidCalendarTime(original.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_relative_single_unit() {
        assert_eq!(parse_relative("+1h").unwrap(), 3600);
        assert_eq!(parse_relative("-2h").unwrap(), -7200);
        assert_eq!(parse_relative("30m").unwrap(), 1800);
        assert_eq!(parse_relative("45s").unwrap(), 45);
    }

    #[test]
    fn test_parse_relative_compound() {
        assert_eq!(parse_relative("1d2h").unwrap(), 86_400 + 7200);
        assert_eq!(parse_relative("-1w1d").unwrap(), -(7 * 86_400 + 86_400));
        assert_eq!(parse_relative("1M").unwrap(), 30 * 86_400);
        assert_eq!(parse_relative("1y").unwrap(), 365 * 86_400);
    }

    #[test]
    fn test_parse_relative_rejects_garbage() {
        assert!(parse_relative("bogus").is_err());
        assert!(parse_relative("").is_err());
        assert!(parse_relative("1x").is_err());
        assert!(parse_relative("h1").is_err());
    }

    #[test]
    fn test_parse_empty_returns_base() {
        assert_eq!(parse("", 1000).unwrap(), 1000);
        assert_eq!(parse("   ", 1000).unwrap(), 1000);
    }

    #[test]
    fn test_parse_relative_offsets_base() {
        assert_eq!(parse("+30m", 1000).unwrap(), 1000 + 1800);
        assert_eq!(parse("-1h", 10_000).unwrap(), 10_000 - 3600);
    }

    #[test]
    fn test_parse_absolute_date_time() {
        let expected = Local
            .with_ymd_and_hms(2024, 3, 5, 10, 30, 0)
            .single()
            .expect("unambiguous local time")
            .timestamp();
        assert_eq!(parse_absolute("2024-03-05 10:30").unwrap(), expected);
        assert_eq!(parse("2024-03-05 10:30", 0).unwrap(), expected);
    }

    #[test]
    fn test_parse_absolute_bare_date_is_midnight() {
        let expected = Local
            .with_ymd_and_hms(2024, 3, 5, 0, 0, 0)
            .single()
            .expect("unambiguous local time")
            .timestamp();
        assert_eq!(parse_absolute("2024-03-05").unwrap(), expected);
    }

    #[test]
    fn test_parse_absolute_bare_time_is_today() {
        let now = Local::now();
        let expected = Local
            .from_local_datetime(
                &now.date_naive()
                    .and_time(NaiveTime::from_hms_opt(6, 15, 0).unwrap()),
            )
            .single()
            .expect("unambiguous local time")
            .timestamp();
        assert_eq!(parse_absolute("06:15").unwrap(), expected);
    }

    #[test]
    fn test_parse_absolute_keywords() {
        let before = Local::now().timestamp();
        let parsed = parse_absolute("now").unwrap();
        let after = Local::now().timestamp();
        assert!(parsed >= before && parsed <= after);

        let yesterday = parse_absolute("yesterday").unwrap();
        assert!((Local::now().timestamp() - 86_400 - yesterday).abs() <= 2);
        let tomorrow = parse_absolute("Tomorrow").unwrap();
        assert!((Local::now().timestamp() + 86_400 - tomorrow).abs() <= 2);
    }

    #[test]
    fn test_parse_absolute_rejects_garbage() {
        assert!(parse_absolute("not a time").is_err());
        assert!(parse_absolute("2024-13-40").is_err());
    }

    #[test]
    fn test_detect_precision() {
        assert_eq!(detect_precision("+30s"), Precision::Full);
        assert_eq!(detect_precision("1m30s"), Precision::Full);
        assert_eq!(detect_precision("+30m"), Precision::Minute);
        assert_eq!(detect_precision("1h30m"), Precision::Minute);
        assert_eq!(detect_precision("+2h"), Precision::Hour);
        assert_eq!(detect_precision("-3d"), Precision::Hour);
        assert_eq!(detect_precision("1M"), Precision::Hour);
        assert_eq!(detect_precision("2024-01-01"), Precision::Full);
        assert_eq!(detect_precision(""), Precision::Full);
    }

    #[test]
    fn test_describe_offset() {
        assert_eq!(describe_offset(0), "now");
        assert_eq!(describe_offset(900), "in 15m");
        assert_eq!(describe_offset(-7200), "2h ago");
        assert_eq!(describe_offset(5400), "in 1h 30m");
    }
}
