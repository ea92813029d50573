mod tui;

use anyhow::{anyhow, Context, Result};
use apptrack::backup;
use apptrack::config::Preferences;
use apptrack::dates;
use apptrack::db::Database;
use apptrack::logging;
use apptrack::summary::{self, PeriodProgress, ProgressTier};
use apptrack::{
    filter_and_sort, Application, ApplicationDraft, ApplicationMethod, ApplicationStatus,
    PeriodLength, SortDirection, ViewCriteria,
};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "apptrack")]
#[command(about = "Job application tracker - record applications and watch weekly progress")]
struct Cli {
    /// Database file (defaults to the platform data directory)
    #[arg(long, global = true, env = "APPTRACK_DB")]
    db: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Record a job application
    Add {
        /// Date applied, YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// List applications
    List {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Show one application
    Show {
        /// Application id or unique id prefix
        id: String,
    },

    /// Change fields of an application
    Edit {
        /// Application id or unique id prefix
        id: String,

        /// New date applied, YYYY-MM-DD
        #[arg(short, long)]
        date: Option<String>,

        #[command(flatten)]
        fields: FieldArgs,

        /// Fields to unset (url, company, title, method, status, notes)
        #[arg(long, value_delimiter = ',')]
        clear: Vec<ClearField>,
    },

    /// Delete an application
    Delete {
        /// Application id or unique id prefix
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Progress toward the goal for the current period
    Summary {
        /// Reference date, YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Override the stored period (weekly, biweekly)
        #[arg(short, long)]
        period: Option<PeriodLength>,
    },

    /// Show or set the application goal per period
    Goal {
        /// New goal (positive number)
        value: Option<u32>,
    },

    /// Show or set the reporting period (weekly, biweekly)
    Period {
        value: Option<PeriodLength>,
    },

    /// Export applications
    Export {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Output file (defaults to a dated file name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write to stdout instead of a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Import a JSON backup (entries are matched by id)
    Import {
        /// Path to a JSON backup
        file: PathBuf,
    },

    /// Browse applications interactively
    Browse,
}

#[derive(clap::Args)]
struct FieldArgs {
    /// Company name
    #[arg(short, long)]
    company: Option<String>,

    /// Job title
    #[arg(short, long)]
    title: Option<String>,

    /// Link to the job listing
    #[arg(short, long)]
    url: Option<String>,

    /// How you applied (online, email, in-person, phone, other)
    #[arg(short, long)]
    method: Option<ApplicationMethod>,

    /// Status (applied, phone_screen, interview, offer, rejected, withdrawn)
    #[arg(short, long)]
    status: Option<ApplicationStatus>,

    /// Free-form notes
    #[arg(short, long)]
    notes: Option<String>,
}

#[derive(clap::Args)]
struct ViewArgs {
    /// Only applications with this status
    #[arg(short, long)]
    status: Option<ApplicationStatus>,

    /// Search company and job title
    #[arg(short = 'q', long)]
    search: Option<String>,

    /// Oldest first instead of newest first
    #[arg(long)]
    asc: bool,
}

impl ViewArgs {
    fn criteria(&self) -> ViewCriteria {
        ViewCriteria {
            status_filter: self.status,
            sort_direction: if self.asc {
                SortDirection::Ascending
            } else {
                SortDirection::Descending
            },
            search: self.search.clone(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ClearField {
    Url,
    Company,
    Title,
    Method,
    Status,
    Notes,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);
    let db = Database::open(cli.db)?;

    match cli.command {
        Commands::Init => {
            db.init()?;
            match db.path() {
                Some(path) => println!("Database initialized at {}", path.display()),
                None => println!("Database initialized"),
            }
        }

        Commands::Add { date, fields } => {
            db.ensure_initialized()?;
            let date = date.unwrap_or_else(|| dates::format_day(summary::today_utc()));
            let mut draft = ApplicationDraft::new(date);
            fields.apply_to(&mut draft);
            let app = db.add_application(draft, Utc::now())?;
            println!("Added application {} ({})", short_id(&app.id), app.display_name());
        }

        Commands::List { view } => {
            db.ensure_initialized()?;
            let apps = db.list_applications()?;
            let visible = filter_and_sort(&apps, &view.criteria());
            print_table(&visible);
        }

        Commands::Show { id } => {
            db.ensure_initialized()?;
            match db.find_application(&id)? {
                Some(app) => print_details(&app),
                None => println!("Application '{}' not found.", id),
            }
        }

        Commands::Edit {
            id,
            date,
            fields,
            clear,
        } => {
            db.ensure_initialized()?;
            let app = db
                .find_application(&id)?
                .ok_or_else(|| anyhow!("Application '{}' not found", id))?;

            let mut draft = app.to_draft();
            if let Some(date) = date {
                draft.date_applied = date;
            }
            fields.apply_to(&mut draft);
            for field in clear {
                field.clear(&mut draft);
            }

            match db.update_application(&app.id, draft, Utc::now())? {
                Some(updated) => println!("Updated application {}", short_id(&updated.id)),
                None => println!("Application '{}' not found.", id),
            }
        }

        Commands::Delete { id, yes } => {
            db.ensure_initialized()?;
            let app = db
                .find_application(&id)?
                .ok_or_else(|| anyhow!("Application '{}' not found", id))?;

            let confirmed = yes
                || dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Delete the application for {}? This cannot be undone.",
                        app.display_name()
                    ))
                    .default(false)
                    .interact()?;

            if confirmed && db.delete_application(&app.id)? {
                println!("Deleted application {}", short_id(&app.id));
            } else {
                println!("Nothing deleted.");
            }
        }

        Commands::Summary { date, period } => {
            db.ensure_initialized()?;
            let today = match date {
                Some(date) => dates::parse_day(&date)?,
                None => summary::today_utc(),
            };
            let prefs = Preferences::load(&db)?;
            let length = period.unwrap_or(prefs.period);
            let apps = db.list_applications()?;
            let progress = PeriodProgress::compute(&apps, today, length, prefs.goal);
            print_progress(&progress);
        }

        Commands::Goal { value } => {
            db.ensure_initialized()?;
            if let Some(goal) = value {
                Preferences::save_goal(&db, goal)?;
            }
            let prefs = Preferences::load(&db)?;
            println!("Goal: {} applications per {} period", prefs.goal, prefs.period.label().to_lowercase());
        }

        Commands::Period { value } => {
            db.ensure_initialized()?;
            if let Some(period) = value {
                Preferences::save_period(&db, period)?;
            }
            let prefs = Preferences::load(&db)?;
            println!("Period: {}", prefs.period);
        }

        Commands::Export {
            format,
            output,
            stdout,
            view,
        } => {
            db.ensure_initialized()?;
            let apps = db.list_applications()?;
            let visible = filter_and_sort(&apps, &view.criteria());
            if visible.is_empty() {
                eprintln!("No applications to export.");
                return Ok(());
            }

            let today = summary::today_utc();
            let (content, default_name) = match format {
                ExportFormat::Csv => (backup::export_csv(visible.iter().copied()), backup::csv_file_name(today)),
                ExportFormat::Json => (backup::export_json(visible.iter().copied())?, backup::json_file_name(today)),
            };

            if stdout {
                println!("{}", content);
            } else {
                let path = output.unwrap_or_else(|| PathBuf::from(default_name));
                std::fs::write(&path, content)
                    .with_context(|| format!("Failed to write to {}", path.display()))?;
                println!("Exported {} application(s) to {}", visible.len(), path.display());
            }
        }

        Commands::Import { file } => {
            db.ensure_initialized()?;
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read backup file: {}", file.display()))?;
            let apps = backup::import_json(&text)
                .with_context(|| format!("Failed to import {}", file.display()))?;
            let imported = db.import_applications(&apps)?;
            println!("Imported {} application(s)", imported);
        }

        Commands::Browse => {
            db.ensure_initialized()?;
            tui::run_browse(&db)?;
        }
    }

    Ok(())
}

impl FieldArgs {
    fn apply_to(self, draft: &mut ApplicationDraft) {
        if let Some(company) = self.company {
            draft.company_name = Some(company);
        }
        if let Some(title) = self.title {
            draft.job_title = Some(title);
        }
        if let Some(url) = self.url {
            draft.job_url = Some(url);
        }
        if let Some(method) = self.method {
            draft.application_method = Some(method);
        }
        if let Some(status) = self.status {
            draft.status = Some(status);
        }
        if let Some(notes) = self.notes {
            draft.notes = Some(notes);
        }
    }
}

impl ClearField {
    fn clear(self, draft: &mut ApplicationDraft) {
        match self {
            ClearField::Url => draft.job_url = None,
            ClearField::Company => draft.company_name = None,
            ClearField::Title => draft.job_title = None,
            ClearField::Method => draft.application_method = None,
            ClearField::Status => draft.status = None,
            ClearField::Notes => draft.notes = None,
        }
    }
}

fn print_table(apps: &[&Application]) {
    if apps.is_empty() {
        println!("No applications found.");
        return;
    }
    println!(
        "{:<10} {:<10} {:<22} {:<24} {:<10} {:<12}",
        "ID", "DATE", "COMPANY", "TITLE", "METHOD", "STATUS"
    );
    println!("{}", "-".repeat(93));
    for app in apps {
        println!(
            "{:<10} {:<10} {:<22} {:<24} {:<10} {:<12}",
            short_id(&app.id),
            app.date_applied,
            truncate(unset_or(app.company_name.as_deref()), 20),
            truncate(unset_or(app.job_title.as_deref()), 22),
            unset_or(app.application_method.map(|m| m.label())),
            unset_or(app.status.map(|s| s.label())),
        );
    }
    println!("\n{} application(s)", apps.len());
}

fn print_details(app: &Application) {
    println!("Application {}", app.id);
    println!("Date applied: {}", app.date_applied);
    println!("Company: {}", unset_or(app.company_name.as_deref()));
    println!("Title: {}", unset_or(app.job_title.as_deref()));
    println!("Method: {}", unset_or(app.application_method.map(|m| m.label())));
    println!("Status: {}", unset_or(app.status.map(|s| s.label())));
    if let Some(url) = &app.job_url {
        println!("URL: {}", url);
    }
    println!("Created: {}", app.created_at);
    println!("Updated: {}", app.updated_at);
    if let Some(notes) = &app.notes {
        println!("\n--- Notes ---\n{}", notes);
    }
}

fn print_progress(progress: &PeriodProgress) {
    const BAR_WIDTH: usize = 30;
    let filled = (progress.ratio() * BAR_WIDTH as f64).round() as usize;
    let marker = match progress.tier() {
        ProgressTier::Idle => "not started",
        ProgressTier::Behind => "behind",
        ProgressTier::Halfway => "halfway",
        ProgressTier::Met => "goal met",
    };
    println!(
        "{} ({})",
        progress.length,
        summary::format_range(&progress.period)
    );
    println!(
        "[{}{}] {} / {} applications ({}%, {})",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        progress.count,
        progress.goal,
        progress.percent(),
        marker
    );
}

fn unset_or(value: Option<&str>) -> &str {
    value.unwrap_or("—")
}

fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
