use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::dates;
use crate::models::{Application, ApplicationDraft, ApplicationMethod, ApplicationStatus};

const APPLICATION_COLUMNS: &str = "id, date_applied, job_url, company_name, job_title,
     application_method, status, notes, created_at, updated_at";

pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    pub fn open(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path(),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        debug!(path = %path.display(), "opened database");
        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn default_path() -> PathBuf {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "apptrack") {
            proj_dirs.data_dir().join("apptrack.db")
        } else {
            PathBuf::from("apptrack.db")
        }
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS applications (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                date_applied TEXT NOT NULL CHECK (length(date_applied) = 10),
                job_url TEXT,
                company_name TEXT,
                job_title TEXT,
                application_method TEXT CHECK (application_method IN ('online', 'email', 'in-person', 'phone', 'other')),
                status TEXT CHECK (status IN ('applied', 'phone_screen', 'interview', 'offer', 'rejected', 'withdrawn')),
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_applications_date ON applications(date_applied);
            CREATE INDEX IF NOT EXISTS idx_applications_status ON applications(status);
            "#,
        )?;
        info!("database schema ready");
        Ok(())
    }

    pub fn ensure_initialized(&self) -> Result<()> {
        let tables: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='applications'",
            [],
            |row| row.get(0),
        )?;
        if tables == 0 {
            return Err(anyhow!(
                "Database not initialized. Run 'apptrack init' first."
            ));
        }
        Ok(())
    }

    // --- Application operations ---

    /// Newest additions first, matching the order they were entered.
    pub fn list_applications(&self) -> Result<Vec<Application>> {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications ORDER BY seq DESC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::row_to_application)?;
        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list applications")
    }

    pub fn get_application(&self, id: &str) -> Result<Option<Application>> {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = ?1");
        self.conn
            .query_row(&sql, [id], Self::row_to_application)
            .optional()
            .context("Failed to load application")
    }

    /// Exact id, or a prefix that picks out exactly one application.
    pub fn find_application(&self, id_or_prefix: &str) -> Result<Option<Application>> {
        if let Some(app) = self.get_application(id_or_prefix)? {
            return Ok(Some(app));
        }
        if id_or_prefix.is_empty() {
            return Ok(None);
        }

        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE substr(id, 1, ?2) = ?1 LIMIT 2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut matches = stmt
            .query_map(
                params![id_or_prefix, id_or_prefix.chars().count() as i64],
                Self::row_to_application,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            _ => bail!("Id prefix '{}' matches more than one application", id_or_prefix),
        }
    }

    pub fn add_application(&self, draft: ApplicationDraft, now: DateTime<Utc>) -> Result<Application> {
        let draft = draft.normalized();
        dates::parse_day(&draft.date_applied)?;

        let id = uuid::Uuid::new_v4().to_string();
        let app = Application::from_draft(id, draft, &timestamp(now));
        self.insert(&app)?;
        info!(id = %app.id, date = %app.date_applied, "added application");
        Ok(app)
    }

    /// `None` when no application has that id.
    pub fn update_application(
        &self,
        id: &str,
        draft: ApplicationDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Application>> {
        let draft = draft.normalized();
        dates::parse_day(&draft.date_applied)?;

        let Some(mut app) = self.get_application(id)? else {
            return Ok(None);
        };
        app.apply(draft, &timestamp(now));

        self.conn.execute(
            "UPDATE applications
             SET date_applied = ?2, job_url = ?3, company_name = ?4, job_title = ?5,
                 application_method = ?6, status = ?7, notes = ?8, updated_at = ?9
             WHERE id = ?1",
            params![
                app.id,
                app.date_applied,
                app.job_url,
                app.company_name,
                app.job_title,
                app.application_method,
                app.status,
                app.notes,
                app.updated_at,
            ],
        )?;
        info!(id = %app.id, "updated application");
        Ok(Some(app))
    }

    pub fn set_status(
        &self,
        id: &str,
        status: Option<ApplicationStatus>,
        now: DateTime<Utc>,
    ) -> Result<Option<Application>> {
        let Some(app) = self.get_application(id)? else {
            return Ok(None);
        };
        let mut draft = app.to_draft();
        draft.status = status;
        self.update_application(id, draft, now)
    }

    pub fn delete_application(&self, id: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM applications WHERE id = ?1", [id])?;
        if removed > 0 {
            info!(id, "deleted application");
        }
        Ok(removed > 0)
    }

    /// Upserts by id inside one transaction. Returns how many rows were written.
    ///
    /// `apps` is in listing order (newest first), so rows go in back to front
    /// and new ones come out of `list_applications` in the same order.
    pub fn import_applications(&self, apps: &[Application]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        for app in apps.iter().rev() {
            tx.execute(
                "INSERT INTO applications (id, date_applied, job_url, company_name, job_title,
                                           application_method, status, notes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(id) DO UPDATE SET
                    date_applied = excluded.date_applied,
                    job_url = excluded.job_url,
                    company_name = excluded.company_name,
                    job_title = excluded.job_title,
                    application_method = excluded.application_method,
                    status = excluded.status,
                    notes = excluded.notes,
                    created_at = excluded.created_at,
                    updated_at = excluded.updated_at",
                params![
                    app.id,
                    app.date_applied,
                    app.job_url,
                    app.company_name,
                    app.job_title,
                    app.application_method,
                    app.status,
                    app.notes,
                    app.created_at,
                    app.updated_at,
                ],
            )
            .with_context(|| format!("Failed to import application {}", app.id))?;
        }
        tx.commit()?;
        info!(count = apps.len(), "imported applications");
        Ok(apps.len())
    }

    fn insert(&self, app: &Application) -> Result<()> {
        self.conn.execute(
            "INSERT INTO applications (id, date_applied, job_url, company_name, job_title,
                                       application_method, status, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                app.id,
                app.date_applied,
                app.job_url,
                app.company_name,
                app.job_title,
                app.application_method,
                app.status,
                app.notes,
                app.created_at,
                app.updated_at,
            ],
        )?;
        Ok(())
    }

    fn row_to_application(row: &rusqlite::Row) -> rusqlite::Result<Application> {
        Ok(Application {
            id: row.get(0)?,
            date_applied: row.get(1)?,
            job_url: row.get(2)?,
            company_name: row.get(3)?,
            job_title: row.get(4)?,
            application_method: row.get(5)?,
            status: row.get(6)?,
            notes: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    // --- Settings ---

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .with_context(|| format!("Failed to read setting '{}'", key))
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        debug!(key, value, "stored setting");
        Ok(())
    }
}

pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl ToSql for ApplicationStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ApplicationStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for ApplicationMethod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ApplicationMethod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
