//! Anniversary countdowns
//!
//! All functions take the current local wall-clock time explicitly. An
//! anniversary occurs at midnight on its month and day; days that do not
//! exist in a given year (Feb 29, Apr 31) fall back to the month's last day.

use crate::services::settings::Anniversary;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Time left until a target, rounded down to whole minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TimeRemaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl TimeRemaining {
    pub fn is_zero(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0
    }
}

/// Zero when the target is now or in the past
pub fn calculate_time_remaining(target: NaiveDateTime, now: NaiveDateTime) -> TimeRemaining {
    let diff = target - now;
    if diff <= Duration::zero() {
        return TimeRemaining::default();
    }

    let total_minutes = diff.num_minutes();
    TimeRemaining {
        days: total_minutes / (24 * 60),
        hours: (total_minutes / 60) % 24,
        minutes: total_minutes % 60,
    }
}

fn month_and_day(date: &str) -> Option<(u32, u32)> {
    let mut parts = date.split('-');
    let _year = parts.next()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some((month, day))
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next.and_then(|d| d.pred_opt())
}

fn occurrence_in(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).or_else(|| last_day_of_month(year, month))
}

/// Next occurrence of the anniversary's month and day strictly after `now`.
///
/// Returns None when `date` is not a "YYYY-MM-DD" string.
pub fn next_anniversary_date(date: &str, now: NaiveDateTime) -> Option<NaiveDate> {
    let (month, day) = month_and_day(date)?;
    let year = now.year();

    let this_year = occurrence_in(year, month, day)?;
    if this_year.and_hms_opt(0, 0, 0)? > now {
        return Some(this_year);
    }
    occurrence_in(year + 1, month, day)
}

fn by_next_occurrence(anniversaries: &[Anniversary], now: NaiveDateTime) -> Vec<(NaiveDate, &Anniversary)> {
    let mut upcoming: Vec<_> = anniversaries
        .iter()
        .filter_map(|a| next_anniversary_date(&a.date, now).map(|next| (next, a)))
        .filter(|(next, _)| next.and_hms_opt(0, 0, 0).is_some_and(|midnight| midnight > now))
        .collect();
    upcoming.sort_by_key(|(next, _)| *next);
    upcoming
}

/// Nearest upcoming anniversary
pub fn next_anniversary(anniversaries: &[Anniversary], now: NaiveDateTime) -> Option<&Anniversary> {
    by_next_occurrence(anniversaries, now)
        .into_iter()
        .next()
        .map(|(_, a)| a)
}

/// Up to `count` nearest upcoming anniversaries, soonest first
pub fn upcoming_anniversaries(
    anniversaries: &[Anniversary],
    count: usize,
    now: NaiveDateTime,
) -> Vec<&Anniversary> {
    by_next_occurrence(anniversaries, now)
        .into_iter()
        .take(count)
        .map(|(_, a)| a)
        .collect()
}

/// True once no whole minute remains, which includes targets already past
pub fn should_trigger_celebration(target: NaiveDateTime, now: NaiveDateTime) -> bool {
    calculate_time_remaining(target, now).is_zero()
}

/// Whether this year's occurrence is behind `now`
pub fn is_anniversary_past(date: &str, now: NaiveDateTime) -> bool {
    let Some(next) = next_anniversary_date(date, now) else {
        return false;
    };
    let today = now.date();

    if next.year() > today.year() {
        return true;
    }
    next.year() == today.year() && next < today
}

pub fn format_countdown_display(remaining: TimeRemaining, label: &str) -> String {
    if remaining.is_zero() {
        return format!("Today is {}!", label);
    }

    let unit = |count: i64, name: &str| {
        if count == 1 {
            format!("{} {}", count, name)
        } else {
            format!("{} {}s", count, name)
        }
    };

    let mut parts = Vec::new();
    if remaining.days > 0 {
        parts.push(unit(remaining.days, "day"));
    }
    if remaining.hours > 0 {
        parts.push(unit(remaining.hours, "hour"));
    }
    if remaining.minutes > 0 {
        parts.push(unit(remaining.minutes, "minute"));
    }

    format!("{} until {}", parts.join(", "), label)
}
