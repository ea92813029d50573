use anyhow::Result;
use apptrack::config::Preferences;
use apptrack::db::Database;
use apptrack::summary::{self, PeriodProgress, ProgressTier};
use apptrack::{filter_and_sort, Application, ApplicationStatus, ViewCriteria};
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;
use tracing::warn;

#[derive(Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Search,
}

struct AppState {
    apps: Vec<Application>,
    criteria: ViewCriteria,
    prefs: Preferences,
    selected: usize,
    mode: InputMode,
    search_draft: String,
    message: Option<String>,
}

impl AppState {
    fn new(apps: Vec<Application>, prefs: Preferences) -> Self {
        Self {
            apps,
            criteria: ViewCriteria::default(),
            prefs,
            selected: 0,
            mode: InputMode::Normal,
            search_draft: String::new(),
            message: None,
        }
    }

    fn visible(&self) -> Vec<&Application> {
        filter_and_sort(&self.apps, &self.criteria)
    }

    fn current(&self) -> Option<&Application> {
        self.visible().get(self.selected).copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn next(&mut self) {
        if self.selected + 1 < self.visible().len() {
            self.selected += 1;
        }
    }

    fn prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn cycle_status_filter(&mut self) {
        let all = ApplicationStatus::ALL;
        self.criteria.status_filter = match self.criteria.status_filter {
            None => Some(all[0]),
            Some(current) => all
                .iter()
                .position(|s| *s == current)
                .and_then(|i| all.get(i + 1))
                .copied(),
        };
        self.selected = 0;
    }

    fn toggle_sort(&mut self) {
        self.criteria.sort_direction = self.criteria.sort_direction.reversed();
        self.selected = 0;
    }

    fn commit_search(&mut self) {
        let text = self.search_draft.trim();
        self.criteria.search = (!text.is_empty()).then(|| text.to_string());
        self.mode = InputMode::Normal;
        self.selected = 0;
    }

    fn toggle_period(&mut self, db: &Database) {
        let period = self.prefs.period.toggled();
        match Preferences::save_period(db, period) {
            Ok(()) => self.prefs.period = period,
            Err(e) => {
                warn!(error = %e, "could not store period");
                self.message = Some(format!("Could not save period: {e}"));
            }
        }
    }

    fn set_status(&mut self, db: &Database, status: ApplicationStatus) {
        let Some(id) = self.current().map(|app| app.id.clone()) else {
            return;
        };
        match db.set_status(&id, Some(status), Utc::now()) {
            Ok(Some(updated)) => {
                if let Some(slot) = self.apps.iter_mut().find(|a| a.id == id) {
                    *slot = updated;
                }
                self.message = Some(format!("Marked as {}", status.label()));
                self.clamp_selection();
            }
            Ok(None) => self.message = Some("Application no longer exists".to_string()),
            Err(e) => self.message = Some(format!("Update failed: {e}")),
        }
    }
}

pub fn run_browse(db: &Database) -> Result<()> {
    let apps = db.list_applications()?;
    if apps.is_empty() {
        println!("No applications found.");
        return Ok(());
    }

    let mut state = AppState::new(apps, Preferences::load(db)?);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, db);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    db: &Database,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        list_state.select(Some(state.selected));
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if state.mode == InputMode::Search {
                match key.code {
                    KeyCode::Enter => state.commit_search(),
                    KeyCode::Esc => state.mode = InputMode::Normal,
                    KeyCode::Backspace => {
                        state.search_draft.pop();
                    }
                    KeyCode::Char(c) => state.search_draft.push(c),
                    _ => {}
                }
                continue;
            }

            state.message = None;
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('f') => state.cycle_status_filter(),
                KeyCode::Char('o') => state.toggle_sort(),
                KeyCode::Char('w') => state.toggle_period(db),
                KeyCode::Char('/') => {
                    state.search_draft = state.criteria.search.clone().unwrap_or_default();
                    state.mode = InputMode::Search;
                }
                KeyCode::Char(c @ '1'..='6') => {
                    let index = c as usize - '1' as usize;
                    state.set_status(db, ApplicationStatus::ALL[index]);
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    frame.render_widget(progress_gauge(state), rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);

    // Left panel: filtered list
    let visible = state.visible();
    let items: Vec<ListItem> = visible
        .iter()
        .map(|app| {
            let company = app.company_name.as_deref().unwrap_or("—");
            let title = app.job_title.as_deref().unwrap_or("—");
            ListItem::new(format!(
                "{} {} | {}",
                app.date_applied,
                clip(company, 18),
                clip(title, 22)
            ))
            .style(status_style(app.status))
        })
        .collect();

    let filter = state
        .criteria
        .status_filter
        .map(|s| s.label())
        .unwrap_or("All statuses");
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Applications ({}) · {} · {} ",
            visible.len(),
            filter,
            state.criteria.sort_direction
        )))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, columns[0], list_state);

    // Right panel: detail
    let detail = Paragraph::new(build_detail(state.current()))
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false });
    frame.render_widget(detail, columns[1]);

    // Footer
    let footer = match (state.mode, &state.message) {
        (InputMode::Search, _) => Paragraph::new(format!(" Search: {}_", state.search_draft))
            .style(Style::default().fg(Color::Yellow)),
        (InputMode::Normal, Some(message)) => {
            Paragraph::new(format!(" {}", message)).style(Style::default().fg(Color::Cyan))
        }
        (InputMode::Normal, None) => Paragraph::new(
            " j/k:move  f:filter  o:order  /:search  w:week/biweek  1-6:set status  q:quit",
        )
        .style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(footer, rows[2]);
}

fn progress_gauge(state: &AppState) -> Gauge<'static> {
    let progress = PeriodProgress::compute(
        &state.apps,
        summary::today_utc(),
        state.prefs.period,
        state.prefs.goal,
    );
    let color = match progress.tier() {
        ProgressTier::Idle => Color::Gray,
        ProgressTier::Behind => Color::Red,
        ProgressTier::Halfway => Color::Yellow,
        ProgressTier::Met => Color::Green,
    };
    Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!(
            " {} · {} ",
            progress.length,
            summary::format_range(&progress.period)
        )))
        .gauge_style(Style::default().fg(color))
        .ratio(progress.ratio())
        .label(format!("{} / {} applications", progress.count, progress.goal))
}

fn status_style(status: Option<ApplicationStatus>) -> Style {
    match status {
        Some(ApplicationStatus::Applied) => Style::default().fg(Color::Cyan),
        Some(ApplicationStatus::PhoneScreen) | Some(ApplicationStatus::Interview) => {
            Style::default().fg(Color::Yellow)
        }
        Some(ApplicationStatus::Offer) => Style::default().fg(Color::Green),
        Some(ApplicationStatus::Rejected) => Style::default().fg(Color::Red),
        Some(ApplicationStatus::Withdrawn) => Style::default().fg(Color::DarkGray),
        None => Style::default(),
    }
}

fn build_detail(app: Option<&Application>) -> Text<'static> {
    let Some(app) = app else {
        return Text::raw("No application selected");
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        app.job_title.clone().unwrap_or_else(|| "(no title)".to_string()),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if let Some(company) = &app.company_name {
        lines.push(Line::from(format!("at {}", company)));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(format!("Applied: {}", app.date_applied)));
    lines.push(Line::from(Span::styled(
        format!(
            "Status: {}",
            app.status.map(|s| s.label()).unwrap_or("—")
        ),
        status_style(app.status),
    )));
    lines.push(Line::from(format!(
        "Method: {}",
        app.application_method.map(|m| m.label()).unwrap_or("—")
    )));
    if let Some(url) = &app.job_url {
        lines.push(Line::from(format!("URL: {}", url)));
    }
    lines.push(Line::from(Span::styled(
        format!("id {}", app.id),
        Style::default().fg(Color::DarkGray),
    )));

    if let Some(notes) = &app.notes {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Notes",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in textwrap::fill(notes, 60).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
    }

    Text::from(lines)
}

fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
