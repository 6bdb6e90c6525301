//! Date and timestamp helpers
//!
//! Calendar dates are exchanged as "YYYY-MM-DD" strings. Timestamps are kept
//! at millisecond precision and written as RFC 3339 with a `Z` suffix, which
//! makes them sort lexicographically and survive an export/import unchanged.

use crate::validation::is_valid_iso_date;
use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};

/// Current time truncated to milliseconds
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Today's calendar date in UTC
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn to_iso_string(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp, normalizing to UTC milliseconds
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).trunc_subsecs(3))
}

/// Format a date as "YYYY-MM-DD"
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a strict "YYYY-MM-DD" string
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    if !is_valid_iso_date(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Whole days between `start` and `today`, never negative
pub fn days_since_start(start: NaiveDate, today: NaiveDate) -> u32 {
    let days = (today - start).num_days();
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

fn plural(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Human readable relationship length.
///
/// Months are 30 days and years 365 days.
pub fn format_relationship_duration(days: u32) -> String {
    if days < 30 {
        return plural(days, "day");
    }
    if days < 365 {
        return plural(days / 30, "month");
    }

    let years = days / 365;
    let months = (days % 365) / 30;
    if months > 0 {
        format!("{} and {}", plural(years, "year"), plural(months, "month"))
    } else {
        plural(years, "year")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_since_start() {
        assert_eq!(days_since_start(date(2020, 1, 1), date(2025, 11, 14)), 2144);
        assert_eq!(days_since_start(date(2025, 11, 14), date(2025, 11, 14)), 0);
        assert_eq!(days_since_start(date(2026, 1, 1), date(2025, 11, 14)), 0);
    }

    #[test]
    fn test_relationship_duration() {
        assert_eq!(format_relationship_duration(0), "0 days");
        assert_eq!(format_relationship_duration(1), "1 day");
        assert_eq!(format_relationship_duration(45), "1 month");
        assert_eq!(format_relationship_duration(300), "10 months");
        assert_eq!(format_relationship_duration(365), "1 year");
        assert_eq!(format_relationship_duration(400), "1 year and 1 month");
        assert_eq!(format_relationship_duration(2144), "5 years and 10 months");
    }

    #[test]
    fn test_iso_round_trip() {
        let ts = parse_timestamp("2025-11-14T08:30:00.123+02:00").unwrap();
        assert_eq!(to_iso_string(&ts), "2025-11-14T06:30:00.123Z");
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_parse_iso_date_is_strict() {
        assert_eq!(parse_iso_date("2024-02-29"), Some(date(2024, 2, 29)));
        assert_eq!(parse_iso_date("2024-2-29"), None);
        assert_eq!(format_date(date(2025, 1, 5)), "2025-01-05");
    }

    #[test]
    fn test_now_millis_has_no_sub_millisecond_part() {
        let now = now_millis();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
        assert_eq!(parse_timestamp(&to_iso_string(&now)), Some(now));
    }
}
