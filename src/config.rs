use anyhow::{bail, Result};
use tracing::warn;

use crate::db::Database;
use crate::period::PeriodLength;

pub const DEFAULT_GOAL: u32 = 5;

const GOAL_KEY: &str = "weekly-goal";
const PERIOD_KEY: &str = "weekly-period";

/// Progress preferences kept alongside the applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub goal: u32,
    pub period: PeriodLength,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            goal: DEFAULT_GOAL,
            period: PeriodLength::default(),
        }
    }
}

impl Preferences {
    pub fn load(db: &Database) -> Result<Self> {
        let goal = db.get_setting(GOAL_KEY)?;
        let period = db.get_setting(PERIOD_KEY)?;
        Ok(Self {
            goal: parse_goal(goal.as_deref()),
            period: parse_period(period.as_deref()),
        })
    }

    pub fn save_goal(db: &Database, goal: u32) -> Result<()> {
        if goal == 0 {
            bail!("Goal must be a positive number");
        }
        db.set_setting(GOAL_KEY, &goal.to_string())
    }

    pub fn save_period(db: &Database, period: PeriodLength) -> Result<()> {
        db.set_setting(PERIOD_KEY, &period.weeks().to_string())
    }
}

fn parse_goal(raw: Option<&str>) -> u32 {
    match raw.map(|s| s.trim().parse::<u32>()) {
        None => DEFAULT_GOAL,
        Some(Ok(goal)) if goal > 0 => goal,
        Some(_) => {
            warn!(?raw, "ignoring unusable stored goal");
            DEFAULT_GOAL
        }
    }
}

fn parse_period(raw: Option<&str>) -> PeriodLength {
    match raw {
        Some("2") => PeriodLength::Biweekly,
        _ => PeriodLength::Weekly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        db
    }

    #[test]
    fn defaults_when_nothing_stored() {
        assert_eq!(Preferences::load(&db()).unwrap(), Preferences::default());
        assert_eq!(Preferences::default().goal, 5);
    }

    #[test]
    fn stored_values_round_trip() {
        let db = db();
        Preferences::save_goal(&db, 12).unwrap();
        Preferences::save_period(&db, PeriodLength::Biweekly).unwrap();
        assert_eq!(
            Preferences::load(&db).unwrap(),
            Preferences {
                goal: 12,
                period: PeriodLength::Biweekly
            }
        );
    }

    #[test]
    fn zero_goal_is_refused() {
        let db = db();
        assert!(Preferences::save_goal(&db, 0).is_err());
    }

    #[test]
    fn junk_values_fall_back() {
        assert_eq!(parse_goal(Some("abc")), DEFAULT_GOAL);
        assert_eq!(parse_goal(Some("0")), DEFAULT_GOAL);
        assert_eq!(parse_goal(Some("-3")), DEFAULT_GOAL);
        assert_eq!(parse_goal(Some(" 7 ")), 7);
        assert_eq!(parse_period(Some("1")), PeriodLength::Weekly);
        assert_eq!(parse_period(Some("3")), PeriodLength::Weekly);
        assert_eq!(parse_period(None), PeriodLength::Weekly);
    }
}
