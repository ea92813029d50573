//! Date-only helpers shared by the period and filter code.
//!
//! Application dates travel as fixed-width `YYYY-MM-DD` strings. Because the
//! format is zero-padded, plain string comparison gives chronological order,
//! so range checks never need to parse.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static date pattern"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("'{0}' is not a YYYY-MM-DD date")]
    Malformed(String),
    #[error("'{0}' is not a real calendar date")]
    OutOfRange(String),
}

/// Anything that can be pinned to a single UTC calendar day.
///
/// Naive values are taken as already being in UTC. Zoned values are converted
/// to UTC first, so a local evening never slides onto the next day's date
/// string or back onto the previous one.
pub trait CalendarDay {
    fn utc_day(&self) -> NaiveDate;
}

impl CalendarDay for NaiveDate {
    fn utc_day(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDay for NaiveDateTime {
    fn utc_day(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDay for DateTime<Tz> {
    fn utc_day(&self) -> NaiveDate {
        self.with_timezone(&Utc).date_naive()
    }
}

impl<T: CalendarDay + ?Sized> CalendarDay for &T {
    fn utc_day(&self) -> NaiveDate {
        (**self).utc_day()
    }
}

pub fn format_day(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

/// Strict parse: exactly ten characters, zero-padded, and a real date.
pub fn parse_day(value: &str) -> Result<NaiveDate, DateError> {
    if !DATE_SHAPE.is_match(value) {
        return Err(DateError::Malformed(value.to_string()));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| DateError::OutOfRange(value.to_string()))
}

pub fn is_valid_day(value: &str) -> bool {
    parse_day(value).is_ok()
}

/// Inclusive on both ends, compared as text.
pub fn within(date: &str, start: &str, end: &str) -> bool {
    start <= date && date <= end
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn formats_zero_padded() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(format_day(day), "2026-03-01");
    }

    #[test]
    fn parse_rejects_unpadded_and_impossible_dates() {
        assert_eq!(
            parse_day("2026-2-3"),
            Err(DateError::Malformed("2026-2-3".into()))
        );
        assert_eq!(
            parse_day("2026-02-30"),
            Err(DateError::OutOfRange("2026-02-30".into()))
        );
        assert!(parse_day("2026-02-28").is_ok());
        assert!(!is_valid_day("2026-02-28T00:00:00Z"));
    }

    #[test]
    fn within_is_inclusive() {
        assert!(within("2026-02-15", "2026-02-15", "2026-02-21"));
        assert!(within("2026-02-21", "2026-02-15", "2026-02-21"));
        assert!(!within("2026-02-14", "2026-02-15", "2026-02-21"));
        assert!(!within("2026-02-22", "2026-02-15", "2026-02-21"));
    }

    #[test]
    fn zoned_instants_use_the_utc_day() {
        // 21:30 on the 17th at UTC-05:00 is already the 18th in UTC.
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2026, 2, 17, 21, 30, 0).unwrap();
        assert_eq!(format_day(local.utc_day()), "2026-02-18");

        let naive = NaiveDate::from_ymd_opt(2026, 2, 18)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(format_day(naive.utc_day()), "2026-02-18");
    }
}
