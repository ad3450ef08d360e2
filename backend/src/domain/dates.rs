//! Date normalization for scheduling logic.
//!
//! Every scheduling comparison in the domain runs over canonical local
//! calendar-date strings (zero-padded `YYYY-MM-DD`), which order correctly
//! under plain lexicographic comparison. This module is the only place that
//! turns raw date input (calendar strings or full timestamps) into that form.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};

/// Date format of the canonical calendar-date string.
pub const CALENDAR_DATE_FORMAT: &str = "%Y-%m-%d";

/// Check whether a string is already in canonical `YYYY-MM-DD` form.
fn is_calendar_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 10 {
        return false;
    }
    for (i, b) in bytes.iter().enumerate() {
        match i {
            4 | 7 => {
                if *b != b'-' {
                    return false;
                }
            }
            _ => {
                if !b.is_ascii_digit() {
                    return false;
                }
            }
        }
    }
    true
}

/// Normalize a date string to the canonical local calendar date.
///
/// A string already in `YYYY-MM-DD` form is returned untouched (re-parsing a
/// pure date would shift it across timezones). Anything else is parsed as a
/// timestamp and reduced to the local year/month/day. Input that parses as
/// neither is returned unchanged: it will compare unequal to every canonical
/// date, so callers simply never match it.
pub fn to_calendar_date(input: &str) -> String {
    if is_calendar_date(input) {
        return input.to_string();
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return ts.with_timezone(&Local).format(CALENDAR_DATE_FORMAT).to_string();
    }
    input.to_string()
}

/// The current local date in canonical form.
pub fn today() -> String {
    Local::now().format(CALENDAR_DATE_FORMAT).to_string()
}

/// Add a number of calendar days to a canonical date string, crossing month
/// and year boundaries correctly. Returns None when the input is not a valid
/// calendar date.
pub fn add_days(date: &str, days: i64) -> Option<String> {
    let parsed = NaiveDate::parse_from_str(date, CALENDAR_DATE_FORMAT).ok()?;
    let shifted = parsed.checked_add_signed(Duration::days(days))?;
    Some(shifted.format(CALENDAR_DATE_FORMAT).to_string())
}

/// Extract (year, month, day) from a canonical date string.
pub fn split_calendar_date(date: &str) -> Option<(i32, u32, u32)> {
    let parsed = NaiveDate::parse_from_str(date, CALENDAR_DATE_FORMAT).ok()?;
    Some((parsed.year(), parsed.month(), parsed.day()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_date_passes_through_unchanged() {
        // Already-canonical dates must not be re-parsed (timezone shift)
        assert_eq!(to_calendar_date("2024-03-05"), "2024-03-05");
        assert_eq!(to_calendar_date("1999-12-31"), "1999-12-31");
    }

    #[test]
    fn test_timestamp_reduces_to_local_day() {
        let normalized = to_calendar_date("2024-03-05T10:30:00+00:00");
        assert!(is_calendar_date(&normalized));
        assert!(normalized.starts_with("2024-03-0"));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for input in [
            "2024-03-05",
            "2024-03-05T10:30:00+00:00",
            "2025-06-13T09:00:00-04:00",
            "not-a-date",
        ] {
            let once = to_calendar_date(input);
            assert_eq!(to_calendar_date(&once), once);
        }
    }

    #[test]
    fn test_malformed_input_never_matches() {
        let garbage = to_calendar_date("yesterday-ish");
        assert_eq!(garbage, "yesterday-ish");
        assert!(!is_calendar_date(&garbage));
    }

    #[test]
    fn test_add_days_crosses_month_boundaries() {
        assert_eq!(add_days("2024-01-31", 1).unwrap(), "2024-02-01");
        assert_eq!(add_days("2023-12-31", 1).unwrap(), "2024-01-01");
        assert_eq!(add_days("2024-01-01", 30).unwrap(), "2024-01-31");
    }

    #[test]
    fn test_add_days_handles_leap_years() {
        assert_eq!(add_days("2024-02-28", 1).unwrap(), "2024-02-29");
        assert_eq!(add_days("2023-02-28", 1).unwrap(), "2023-03-01");
    }

    #[test]
    fn test_add_days_rejects_invalid_input() {
        assert!(add_days("garbage", 1).is_none());
        assert!(add_days("2024-13-99", 1).is_none());
    }

    #[test]
    fn test_today_is_canonical() {
        assert!(is_calendar_date(&today()));
    }

    #[test]
    fn test_split_calendar_date() {
        assert_eq!(split_calendar_date("2024-05-02"), Some((2024, 5, 2)));
        assert_eq!(split_calendar_date("invalid"), None);
    }
}
