//! Year-agnostic calendar keys.
//!
//! Calendar overrides are indexed by `month0 * 100 + day` where `month0` is
//! ZERO-based (January = 0), so March 5 encodes as 205. The key carries no
//! year, which means a one-time override left behind across a process outage
//! will match the same month/day next year until its day-after purge runs.
//! That is long-standing document format, not something to repair here.

use chrono::{Datelike, NaiveDate};

/// Compute the calendar key for a date.
pub fn date_key(date: NaiveDate) -> u32 {
    date.month0() * 100 + date.day()
}

/// Weekday index with Sunday = 0 .. Saturday = 6, matching the weekly
/// defaults document.
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_uses_zero_based_month() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(date_key(date), 205);
    }

    #[test]
    fn january_keys_are_bare_days() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(date_key(date), 31);
    }

    #[test]
    fn key_ignores_year() {
        let a = NaiveDate::from_ymd_opt(2023, 12, 25).unwrap();
        let b = NaiveDate::from_ymd_opt(2031, 12, 25).unwrap();
        assert_eq!(date_key(a), date_key(b));
    }

    #[test]
    fn weekday_index_starts_sunday() {
        // 2024-03-03 was a Sunday
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        assert_eq!(weekday_index(sunday), 0);
        let saturday = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(weekday_index(saturday), 6);
    }
}
