//! Reporting windows for the progress summary.
//!
//! Every window starts on the Sunday of the reference date's week and runs
//! one or two whole weeks. All arithmetic happens on UTC calendar days, and
//! the bounds come back as `YYYY-MM-DD` strings so they can be compared
//! directly against `date_applied`.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dates::{self, CalendarDay};
use crate::models::{Application, ParseEnumError};

/// Inclusive date window. `start <= end` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub start: String,
    pub end: String,
}

impl Period {
    fn spanning(first: NaiveDate, days: i64) -> Self {
        Self {
            start: dates::format_day(first),
            end: dates::format_day(
                first
                    .checked_add_signed(Duration::days(days - 1))
                    .unwrap_or(NaiveDate::MAX),
            ),
        }
    }

    pub fn contains(&self, date_applied: &str) -> bool {
        dates::within(date_applied, &self.start, &self.end)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodLength {
    #[default]
    Weekly,
    Biweekly,
}

impl PeriodLength {
    pub fn weeks(self) -> u32 {
        match self {
            PeriodLength::Weekly => 1,
            PeriodLength::Biweekly => 2,
        }
    }

    pub fn from_weeks(weeks: u32) -> Option<Self> {
        match weeks {
            1 => Some(PeriodLength::Weekly),
            2 => Some(PeriodLength::Biweekly),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PeriodLength::Weekly => "Weekly",
            PeriodLength::Biweekly => "Biweekly",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            PeriodLength::Weekly => PeriodLength::Biweekly,
            PeriodLength::Biweekly => PeriodLength::Weekly,
        }
    }

    fn days(self) -> i64 {
        i64::from(self.weeks()) * 7
    }
}

impl fmt::Display for PeriodLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PeriodLength {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "weekly" | "week" => Ok(PeriodLength::Weekly),
            "2" | "biweekly" | "fortnight" => Ok(PeriodLength::Biweekly),
            _ => Err(ParseEnumError::new("period", s, ["weekly", "biweekly"])),
        }
    }
}

/// Sunday through Saturday around `date`.
pub fn week_bounds(date: impl CalendarDay) -> Period {
    Period::spanning(week_start(date.utc_day()), 7)
}

/// Same Sunday as [`week_bounds`], stretched to `length` whole weeks.
pub fn period_bounds(date: impl CalendarDay, length: PeriodLength) -> Period {
    Period::spanning(week_start(date.utc_day()), length.days())
}

/// Records whose `date_applied` falls inside the window, both ends included.
pub fn count_in_period(
    records: &[Application],
    reference: impl CalendarDay,
    length: PeriodLength,
) -> usize {
    let period = period_bounds(reference, length);
    let count = records
        .iter()
        .filter(|app| period.contains(&app.date_applied))
        .count();
    debug!(%period, %length, count, total = records.len(), "counted applications in period");
    count
}

pub fn count_in_week(records: &[Application], reference: impl CalendarDay) -> usize {
    count_in_period(records, reference, PeriodLength::default())
}

// Windows are clamped to chrono's representable range at either end.
fn week_start(day: NaiveDate) -> NaiveDate {
    day.checked_sub_signed(Duration::days(i64::from(day.weekday().num_days_from_sunday())))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApplicationDraft;
    use chrono::{TimeZone, Utc, Weekday};

    fn day(s: &str) -> NaiveDate {
        dates::parse_day(s).unwrap()
    }

    fn app(date_applied: &str) -> Application {
        Application::from_draft(
            date_applied.to_string(),
            ApplicationDraft::new(date_applied),
            &format!("{date_applied}T00:00:00.000Z"),
        )
    }

    fn period(start: &str, end: &str) -> Period {
        Period {
            start: start.into(),
            end: end.into(),
        }
    }

    #[test]
    fn midweek_date_maps_to_surrounding_sunday_and_saturday() {
        // 2026-02-18 is a Wednesday
        assert_eq!(week_bounds(day("2026-02-18")), period("2026-02-15", "2026-02-21"));
    }

    #[test]
    fn sunday_and_saturday_are_their_own_bounds() {
        assert_eq!(week_bounds(day("2026-02-15")), period("2026-02-15", "2026-02-21"));
        assert_eq!(week_bounds(day("2026-02-21")), period("2026-02-15", "2026-02-21"));
    }

    #[test]
    fn rolls_back_into_previous_month() {
        assert_eq!(week_bounds(day("2026-03-03")), period("2026-03-01", "2026-03-07"));
        assert_eq!(week_bounds(day("2026-04-02")), period("2026-03-29", "2026-04-04"));
    }

    #[test]
    fn rolls_across_year_end() {
        assert_eq!(week_bounds(day("2026-01-01")), period("2025-12-28", "2026-01-03"));
        assert_eq!(week_bounds(day("2025-12-31")), period("2025-12-28", "2026-01-03"));
    }

    #[test]
    fn every_day_of_a_week_shares_bounds() {
        let sunday = day("2026-02-15");
        let expected = week_bounds(sunday);
        for offset in 0..7 {
            let d = sunday + Duration::days(offset);
            let bounds = week_bounds(d);
            assert_eq!(bounds, expected, "{d}");
            assert_eq!(day(&bounds.start).weekday(), Weekday::Sun);
            assert_eq!(day(&bounds.end).weekday(), Weekday::Sat);
        }
    }

    #[test]
    fn timestamps_late_in_the_utc_day_stay_on_that_day() {
        let late = Utc.with_ymd_and_hms(2026, 2, 21, 23, 59, 59).unwrap();
        assert_eq!(week_bounds(late), period("2026-02-15", "2026-02-21"));
        let early = Utc.with_ymd_and_hms(2026, 2, 22, 0, 0, 0).unwrap();
        assert_eq!(week_bounds(early), period("2026-02-22", "2026-02-28"));
    }

    #[test]
    fn single_week_period_matches_week_bounds() {
        let mut d = day("2025-12-01");
        while d <= day("2026-03-31") {
            assert_eq!(period_bounds(d, PeriodLength::Weekly), week_bounds(d));
            d += Duration::days(1);
        }
    }

    #[test]
    fn biweekly_period_spans_fourteen_days_from_the_same_sunday() {
        let mut d = day("2025-12-01");
        while d <= day("2026-03-31") {
            let two = period_bounds(d, PeriodLength::Biweekly);
            assert_eq!(two.start, week_bounds(d).start);
            assert_eq!(day(&two.end) - day(&two.start), Duration::days(13));
            d += Duration::days(1);
        }
    }

    #[test]
    fn biweekly_period_crosses_month_and_year() {
        assert_eq!(
            period_bounds(day("2026-02-18"), PeriodLength::Biweekly),
            period("2026-02-15", "2026-02-28")
        );
        assert_eq!(
            period_bounds(day("2026-02-25"), PeriodLength::Biweekly),
            period("2026-02-22", "2026-03-07")
        );
        assert_eq!(
            period_bounds(day("2025-12-24"), PeriodLength::Biweekly),
            period("2025-12-21", "2026-01-03")
        );
    }

    #[test]
    fn count_includes_both_boundary_days() {
        let today = day("2026-02-18");
        let apps = [app("2026-02-15"), app("2026-02-18"), app("2026-02-21")];
        assert_eq!(count_in_week(&apps, today), 3);
    }

    #[test]
    fn count_excludes_days_just_outside_the_week() {
        let today = day("2026-02-18");
        let apps = [
            app("2026-02-14"),
            app("2026-02-18"),
            app("2026-02-22"),
        ];
        assert_eq!(count_in_week(&apps, today), 1);
        assert_eq!(count_in_week(&[app("2026-02-01"), app("2026-03-01")], today), 0);
    }

    #[test]
    fn extreme_dates_clamp_instead_of_overflowing() {
        let low = week_bounds(NaiveDate::MIN);
        assert_eq!(low.start, dates::format_day(NaiveDate::MIN));
        let high = period_bounds(NaiveDate::MAX, PeriodLength::Biweekly);
        assert_eq!(high.end, dates::format_day(NaiveDate::MAX));
        assert_eq!(high.start, week_bounds(NaiveDate::MAX).start);
    }

    #[test]
    fn count_of_nothing_is_zero() {
        assert_eq!(count_in_week(&[], day("2026-02-18")), 0);
        assert_eq!(count_in_period(&[], day("2026-02-18"), PeriodLength::Biweekly), 0);
    }

    #[test]
    fn biweekly_count_picks_up_the_second_week() {
        let today = day("2026-02-18");
        let apps = [app("2026-02-16"), app("2026-02-24"), app("2026-02-28"), app("2026-03-01")];
        assert_eq!(count_in_period(&apps, today, PeriodLength::Weekly), 1);
        assert_eq!(count_in_period(&apps, today, PeriodLength::Biweekly), 3);
    }

    #[test]
    fn counting_leaves_the_input_alone() {
        let apps = vec![app("2026-02-21"), app("2026-02-15")];
        let before = apps.clone();
        count_in_week(&apps, day("2026-02-18"));
        assert_eq!(apps, before);
    }

    #[test]
    fn period_length_parsing_and_weeks() {
        assert_eq!("2".parse(), Ok(PeriodLength::Biweekly));
        assert_eq!("Weekly".parse(), Ok(PeriodLength::Weekly));
        assert!("monthly".parse::<PeriodLength>().is_err());
        assert_eq!(PeriodLength::from_weeks(2).map(PeriodLength::weeks), Some(2));
        assert_eq!(PeriodLength::from_weeks(3), None);
        assert_eq!(PeriodLength::default(), PeriodLength::Weekly);
    }
}
