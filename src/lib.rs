//! Job application tracking: records, weekly/biweekly progress windows,
//! and the filtered, sorted list view.

pub mod backup;
pub mod config;
pub mod dates;
pub mod db;
pub mod filter;
pub mod logging;
pub mod models;
pub mod period;
pub mod summary;

pub use filter::{filter_and_sort, SortDirection, ViewCriteria};
pub use models::{Application, ApplicationDraft, ApplicationMethod, ApplicationStatus};
pub use period::{count_in_period, count_in_week, period_bounds, week_bounds, Period, PeriodLength};
