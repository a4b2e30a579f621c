//! Lenient date recognition for the `updated` column.
//!
//! Values are never normalised on ingest; this module only answers whether a
//! value reads as a date and, for sorting, which instant it names. Inputs
//! without an offset are read as UTC.

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::{Captures, Regex};

// Offset-bearing forms that RFC 3339 and RFC 2822 do not cover: minute
// precision with an offset, and the `Date.prototype.toString` shape.
const OFFSET_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%:z",
    "%a %b %d %Y %H:%M:%S GMT%z",
    "%a %b %d %Y %H:%M:%S UTC%z",
];

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d %Y %H:%M:%S",
    "%d %B %Y %H:%M:%S",
    "%a %b %d %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%a %b %d %Y",
];

static PARTIAL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<year>\d{4})(?:-(?P<month>\d{2}))?$").expect("valid partial date regex")
});

// Numeric month/day forms with a two-digit year.
static SHORT_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<month_day>[0-9]{1,2}[/-][0-9]{1,2}[/-])(?P<year>[0-9]{2})(?P<rest>(?: .*)?)$")
        .expect("valid short year regex")
});

static TRAILING_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" ?\([^()]*\)$").expect("valid trailing comment regex"));

static INNER_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

pub fn is_valid_date(value: &str) -> bool {
    parse_timestamp(value).is_some()
}

/// Milliseconds since the Unix epoch, or `None` when the value is not a date.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    parse_date_time(value).map(|instant| instant.timestamp_millis())
}

pub fn parse_date_time(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let collapsed = INNER_WHITESPACE.replace_all(trimmed, " ");
    let uncommented = TRAILING_COMMENT.replace(&collapsed, "");
    let value = expand_short_year(&uncommented);

    if let Some(instant) = parse_with_offset(&value) {
        return Some(instant);
    }

    let value = strip_utc_designator(&value);
    parse_naive_date_time(value)
        .or_else(|| parse_naive_date(value))
        .or_else(|| parse_partial_date(value))
}

fn parse_with_offset(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc3339(&value.replacen(' ', "T", 1)))
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .ok()
        .or_else(|| {
            OFFSET_DATE_TIME_FORMATS
                .iter()
                .find_map(|format| DateTime::parse_from_str(value, format).ok())
        })
        .map(|instant| instant.with_timezone(&Utc))
}

/// Two-digit years: 00-49 are 20xx, 50-99 are 19xx.
fn expand_short_year(value: &str) -> Cow<'_, str> {
    SHORT_YEAR.replace(value, |captures: &Captures| {
        let year = &captures["year"];
        let century = if year < "50" { "20" } else { "19" };
        format!("{}{century}{year}{}", &captures["month_day"], &captures["rest"])
    })
}

// A trailing `UTC`, `GMT` or `Z` names the zone naive values are read in.
fn strip_utc_designator(value: &str) -> &str {
    if let Some(body) = value
        .strip_suffix(" UTC")
        .or_else(|| value.strip_suffix(" GMT"))
    {
        return body;
    }
    match value.strip_suffix('Z') {
        Some(body) if body.ends_with(|ch: char| ch.is_ascii_digit()) => body,
        _ => value,
    }
}

fn parse_naive_date_time(value: &str) -> Option<DateTime<Utc>> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

fn parse_naive_date(value: &str) -> Option<DateTime<Utc>> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_partial_date(value: &str) -> Option<DateTime<Utc>> {
    let captures = PARTIAL_DATE.captures(value)?;
    let year = captures.name("year")?.as_str().parse::<i32>().ok()?;
    let month = match captures.name("month") {
        Some(month) => month.as_str().parse::<u32>().ok()?,
        None => 1,
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::{is_valid_date, parse_timestamp};

    #[test]
    fn accepts_iso_and_offset_forms() {
        assert!(is_valid_date("2024-01-15"));
        assert!(is_valid_date("2024-01-15T10:30:00Z"));
        assert!(is_valid_date("2024-01-15T10:30:00.250+02:00"));
        assert!(is_valid_date("2024-01-15 10:30:00"));
        assert!(is_valid_date("2024-01-15T10:30"));
        assert!(is_valid_date("Mon, 15 Jan 2024 10:30:00 GMT"));
        assert!(is_valid_date("2024-01-15T10:30Z"));
        assert!(is_valid_date("2024-01-15T10:30+02:00"));
        assert!(is_valid_date("2024-01-15 10:30:00 UTC"));
        assert!(is_valid_date("2024-01-15 10:30 GMT"));
        assert!(is_valid_date("Mon Jan 15 2024"));
        assert!(is_valid_date("Mon Jan 15 2024 10:30:00"));
        assert!(is_valid_date(
            "Mon Jan 15 2024 10:30:00 GMT+0200 (Central European Standard Time)"
        ));
    }

    #[test]
    fn minute_precision_and_zone_suffixes_resolve_to_the_same_instant() {
        let expected = parse_timestamp("2024-01-15T10:30:00Z");
        assert_eq!(parse_timestamp("2024-01-15T10:30Z"), expected);
        assert_eq!(parse_timestamp("2024-01-15T12:30+02:00"), expected);
        assert_eq!(parse_timestamp("2024-01-15 10:30:00 UTC"), expected);
        assert_eq!(
            parse_timestamp("Mon Jan 15 2024 12:30:00 GMT+0200 (Eastern European Time)"),
            expected
        );
    }

    #[test]
    fn two_digit_years_map_into_nineteen_fifty_through_twenty_forty_nine() {
        assert_eq!(parse_timestamp("1/15/24"), parse_timestamp("2024-01-15"));
        assert_eq!(parse_timestamp("01-15-49"), parse_timestamp("2049-01-15"));
        assert_eq!(parse_timestamp("12/31/99"), parse_timestamp("1999-12-31"));
        assert_eq!(parse_timestamp("6/1/50 08:00"), parse_timestamp("1950-06-01T08:00:00Z"));
        assert!(!is_valid_date("13/15/24"));
    }

    #[test]
    fn accepts_slash_month_name_and_partial_forms() {
        assert!(is_valid_date("01/15/2024"));
        assert!(is_valid_date("1/5/2024 09:15"));
        assert!(is_valid_date("2024/01/15"));
        assert!(is_valid_date("Jan 15, 2024"));
        assert!(is_valid_date("January 15, 2024"));
        assert!(is_valid_date("15 March 2024"));
        assert!(is_valid_date("2024"));
        assert!(is_valid_date("2024-03"));
        assert!(is_valid_date("  Jan   15,  2024 "));
    }

    #[test]
    fn rejects_non_dates_and_impossible_dates() {
        assert!(!is_valid_date(""));
        assert!(!is_valid_date("   "));
        assert!(!is_valid_date("not a date"));
        assert!(!is_valid_date("yesterday"));
        assert!(!is_valid_date("2024-13-01"));
        assert!(!is_valid_date("2024-02-30"));
        assert!(!is_valid_date("2024-00"));
    }

    #[test]
    fn timestamps_order_by_instant() {
        let earlier = parse_timestamp("2024-01-15").unwrap();
        let later = parse_timestamp("2024-01-15T00:00:01Z").unwrap();
        assert_eq!(earlier, 1_705_276_800_000);
        assert_eq!(later - earlier, 1_000);
        assert_eq!(parse_timestamp("2024-01-15T02:00:00+02:00"), Some(earlier));
    }
}
