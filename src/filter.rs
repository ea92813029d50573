use std::fmt;
use std::str::FromStr;

use crate::models::{Application, ApplicationStatus, ParseEnumError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Ascending => "Oldest first",
            SortDirection::Descending => "Newest first",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortDirection {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" | "oldest" => Ok(SortDirection::Ascending),
            "desc" | "descending" | "newest" => Ok(SortDirection::Descending),
            _ => Err(ParseEnumError::new("sort direction", s, ["asc", "desc"])),
        }
    }
}

/// What the list view is currently showing. `None` filters pass everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewCriteria {
    pub status_filter: Option<ApplicationStatus>,
    pub sort_direction: SortDirection,
    pub search: Option<String>,
}

impl ViewCriteria {
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// Status filter, then text search, then a stable sort on `date_applied`.
///
/// The returned vector borrows from `records`; the slice itself is never
/// reordered. Records that share a date keep their input order whichever way
/// the sort runs.
pub fn filter_and_sort<'a>(
    records: &'a [Application],
    criteria: &ViewCriteria,
) -> Vec<&'a Application> {
    let needle = criteria.needle();

    let mut visible: Vec<&Application> = records
        .iter()
        .filter(|app| match criteria.status_filter {
            Some(wanted) => app.status == Some(wanted),
            None => true,
        })
        .filter(|app| match &needle {
            Some(needle) => matches_search(app, needle),
            None => true,
        })
        .collect();

    match criteria.sort_direction {
        SortDirection::Ascending => visible.sort_by(|a, b| a.date_applied.cmp(&b.date_applied)),
        SortDirection::Descending => visible.sort_by(|a, b| b.date_applied.cmp(&a.date_applied)),
    }
    visible
}

// Company and title joined by a single space; absent fields count as empty.
fn matches_search(app: &Application, needle: &str) -> bool {
    let haystack = format!(
        "{} {}",
        app.company_name.as_deref().unwrap_or_default(),
        app.job_title.as_deref().unwrap_or_default()
    )
    .to_lowercase();
    haystack.contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApplicationDraft;

    fn make_app(
        id: &str,
        date_applied: &str,
        status: Option<ApplicationStatus>,
        company: Option<&str>,
        title: Option<&str>,
    ) -> Application {
        Application::from_draft(
            id.to_string(),
            ApplicationDraft {
                status,
                company_name: company.map(String::from),
                job_title: title.map(String::from),
                ..ApplicationDraft::new(date_applied)
            },
            "",
        )
    }

    fn apps() -> Vec<Application> {
        use ApplicationStatus::*;
        vec![
            make_app("1", "2026-01-15", Some(Applied), Some("Globex"), Some("Engineer")),
            make_app("2", "2026-01-10", Some(Interview), Some("Initech"), Some("Developer")),
            make_app("3", "2026-01-20", Some(Applied), Some("Globex"), Some("Manager")),
            make_app("4", "2026-01-05", None, Some("Acme"), Some("Designer")),
        ]
    }

    fn ids(result: &[&Application]) -> Vec<String> {
        result.iter().map(|a| a.id.clone()).collect()
    }

    fn criteria(
        status_filter: Option<ApplicationStatus>,
        sort_direction: SortDirection,
        search: Option<&str>,
    ) -> ViewCriteria {
        ViewCriteria {
            status_filter,
            sort_direction,
            search: search.map(String::from),
        }
    }

    #[test]
    fn sorts_newest_first_by_default() {
        let apps = apps();
        let result = filter_and_sort(&apps, &ViewCriteria::default());
        assert_eq!(ids(&result), ["3", "1", "2", "4"]);
    }

    #[test]
    fn sorts_oldest_first_when_ascending() {
        let apps = apps();
        let result = filter_and_sort(&apps, &criteria(None, SortDirection::Ascending, None));
        assert_eq!(ids(&result), ["4", "2", "1", "3"]);
    }

    #[test]
    fn filters_by_status() {
        let apps = apps();
        let result = filter_and_sort(
            &apps,
            &criteria(Some(ApplicationStatus::Applied), SortDirection::Descending, None),
        );
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|a| a.status == Some(ApplicationStatus::Applied)));
    }

    #[test]
    fn no_status_filter_keeps_records_without_status() {
        let apps = apps();
        let result = filter_and_sort(&apps, &criteria(None, SortDirection::Descending, Some("")));
        assert_eq!(result.len(), 4);
        assert!(result.iter().any(|a| a.status.is_none()));
    }

    #[test]
    fn status_nobody_has_yields_nothing() {
        let apps = apps();
        let result = filter_and_sort(
            &apps,
            &criteria(Some(ApplicationStatus::Offer), SortDirection::Descending, None),
        );
        assert!(result.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let apps = apps();
        let result = filter_and_sort(&apps, &criteria(None, SortDirection::Descending, Some("globex")));
        assert_eq!(ids(&result), ["3", "1"]);

        let result = filter_and_sort(&apps, &criteria(None, SortDirection::Descending, Some("lob")));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn search_matches_job_title() {
        let apps = apps();
        let result = filter_and_sort(&apps, &criteria(None, SortDirection::Descending, Some("Engineer")));
        assert_eq!(ids(&result), ["1"]);
    }

    #[test]
    fn whitespace_search_matches_everything() {
        let apps = apps();
        let result = filter_and_sort(&apps, &criteria(None, SortDirection::Descending, Some("   ")));
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn search_is_trimmed() {
        let apps = apps();
        let result = filter_and_sort(&apps, &criteria(None, SortDirection::Descending, Some("  acme ")));
        assert_eq!(ids(&result), ["4"]);
    }

    #[test]
    fn search_joins_company_and_title_with_a_space() {
        let apps = vec![make_app("1", "2026-01-15", None, Some("Glob"), Some("ex Corp"))];
        let result = filter_and_sort(&apps, &criteria(None, SortDirection::Descending, Some("globex")));
        assert!(result.is_empty());
        let result = filter_and_sort(&apps, &criteria(None, SortDirection::Descending, Some("glob ex")));
        assert_eq!(ids(&result), ["1"]);
    }

    #[test]
    fn search_spanning_both_fields_matches() {
        let apps = apps();
        let result = filter_and_sort(
            &apps,
            &criteria(None, SortDirection::Descending, Some("Globex Engineer")),
        );
        assert_eq!(ids(&result), ["1"]);
    }

    #[test]
    fn absent_fields_never_match_but_do_not_fail() {
        let apps = vec![make_app("1", "2026-01-15", None, None, None)];
        let result = filter_and_sort(&apps, &criteria(None, SortDirection::Descending, Some("x")));
        assert!(result.is_empty());
    }

    #[test]
    fn status_and_search_intersect() {
        let apps = apps();
        let result = filter_and_sort(
            &apps,
            &criteria(Some(ApplicationStatus::Applied), SortDirection::Descending, Some("Engineer")),
        );
        assert_eq!(ids(&result), ["1"]);
    }

    #[test]
    fn ties_keep_input_order_in_both_directions() {
        let apps = vec![
            make_app("a", "2026-01-10", None, None, None),
            make_app("b", "2026-01-12", None, None, None),
            make_app("c", "2026-01-10", None, None, None),
            make_app("d", "2026-01-10", None, None, None),
        ];
        let desc = filter_and_sort(&apps, &criteria(None, SortDirection::Descending, None));
        assert_eq!(ids(&desc), ["b", "a", "c", "d"]);
        let asc = filter_and_sort(&apps, &criteria(None, SortDirection::Ascending, None));
        assert_eq!(ids(&asc), ["a", "c", "d", "b"]);
    }

    #[test]
    fn input_is_left_untouched() {
        let apps = apps();
        let before = apps.clone();
        let _ = filter_and_sort(&apps, &criteria(None, SortDirection::Ascending, Some("globex")));
        assert_eq!(apps, before);
    }

    #[test]
    fn direction_parses_and_flips() {
        assert_eq!("asc".parse(), Ok(SortDirection::Ascending));
        assert_eq!("Newest".parse(), Ok(SortDirection::Descending));
        assert_eq!(SortDirection::Descending.reversed(), SortDirection::Ascending);
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}
