//! JSON backups and CSV export.

use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::dates;
use crate::models::Application;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("backup is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("backup must be a JSON array of applications")]
    NotAnArray,
}

const CSV_HEADER: [&str; 7] = [
    "Date Applied",
    "Company",
    "Job Title",
    "Job URL",
    "Method",
    "Status",
    "Notes",
];

pub fn export_json<'a>(
    apps: impl IntoIterator<Item = &'a Application>,
) -> Result<String, BackupError> {
    let apps: Vec<&Application> = apps.into_iter().collect();
    Ok(serde_json::to_string_pretty(&apps)?)
}

/// Parses a backup, keeping only entries that are complete applications.
///
/// Entries without an id, a date or the two timestamps, entries with an
/// unknown status or method, and entries whose date is not a real
/// `YYYY-MM-DD` day are skipped.
pub fn import_json(text: &str) -> Result<Vec<Application>, BackupError> {
    let Value::Array(entries) = serde_json::from_str::<Value>(text)? else {
        return Err(BackupError::NotAnArray);
    };

    let total = entries.len();
    let apps: Vec<Application> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<Application>(entry) {
            Ok(app) if dates::is_valid_day(&app.date_applied) => Some(app),
            Ok(app) => {
                warn!(index, date = %app.date_applied, "skipping entry with malformed date");
                None
            }
            Err(e) => {
                warn!(index, error = %e, "skipping invalid entry");
                None
            }
        })
        .collect();

    if apps.len() < total {
        warn!(kept = apps.len(), total, "some backup entries were dropped");
    }
    Ok(apps)
}

pub fn export_csv<'a>(apps: impl IntoIterator<Item = &'a Application>) -> String {
    let mut lines = vec![join_row(CSV_HEADER)];
    for app in apps {
        lines.push(join_row([
            app.date_applied.as_str(),
            app.company_name.as_deref().unwrap_or_default(),
            app.job_title.as_deref().unwrap_or_default(),
            app.job_url.as_deref().unwrap_or_default(),
            app.application_method.map(|m| m.label()).unwrap_or_default(),
            app.status.map(|s| s.label()).unwrap_or_default(),
            app.notes.as_deref().unwrap_or_default(),
        ]));
    }
    lines.join("\n")
}

fn join_row<const N: usize>(cells: [&str; N]) -> String {
    cells.map(escape_cell).join(",")
}

fn escape_cell(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn csv_file_name(today: NaiveDate) -> String {
    format!("job-applications-{}.csv", dates::format_day(today))
}

pub fn json_file_name(today: NaiveDate) -> String {
    format!("job-applications-backup-{}.json", dates::format_day(today))
}
