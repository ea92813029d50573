use chrono::NaiveDate;

use crate::dates::{self, CalendarDay};
use crate::models::Application;
use crate::period::{self, Period, PeriodLength};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressTier {
    Idle,
    Behind,
    Halfway,
    Met,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodProgress {
    pub period: Period,
    pub length: PeriodLength,
    pub count: usize,
    pub goal: u32,
}

impl PeriodProgress {
    pub fn compute(
        records: &[Application],
        today: impl CalendarDay,
        length: PeriodLength,
        goal: u32,
    ) -> Self {
        let day = today.utc_day();
        Self {
            period: period::period_bounds(day, length),
            length,
            count: period::count_in_period(records, day, length),
            goal: goal.max(1),
        }
    }

    /// Share of the goal reached, capped at 1.
    pub fn ratio(&self) -> f64 {
        (self.count as f64 / f64::from(self.goal)).min(1.0)
    }

    pub fn tier(&self) -> ProgressTier {
        if self.count == 0 {
            return ProgressTier::Idle;
        }
        match self.ratio() {
            r if r >= 1.0 => ProgressTier::Met,
            r if r >= 0.5 => ProgressTier::Halfway,
            _ => ProgressTier::Behind,
        }
    }

    pub fn percent(&self) -> u16 {
        (self.ratio() * 100.0).round() as u16
    }
}

/// "Feb 15 – Feb 21"
pub fn format_range(period: &Period) -> String {
    format!("{} – {}", short_day(&period.start), short_day(&period.end))
}

fn short_day(value: &str) -> String {
    match dates::parse_day(value) {
        Ok(day) => day.format("%b %-d").to_string(),
        Err(_) => value.to_string(),
    }
}

pub fn today_utc() -> NaiveDate {
    chrono::Utc::now().date_naive()
}
