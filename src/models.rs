use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    PhoneScreen,
    Interview,
    Offer,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::Applied,
        ApplicationStatus::PhoneScreen,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::PhoneScreen => "phone_screen",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::PhoneScreen => "Phone Screen",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Withdrawn => "Withdrawn",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_key(s);
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| {
                ParseEnumError::new("status", s, ApplicationStatus::ALL.map(|st| st.as_str()))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationMethod {
    #[serde(rename = "online")]
    Online,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "in-person")]
    InPerson,
    #[serde(rename = "phone")]
    Phone,
    #[serde(rename = "other")]
    Other,
}

impl ApplicationMethod {
    pub const ALL: [ApplicationMethod; 5] = [
        ApplicationMethod::Online,
        ApplicationMethod::Email,
        ApplicationMethod::InPerson,
        ApplicationMethod::Phone,
        ApplicationMethod::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationMethod::Online => "online",
            ApplicationMethod::Email => "email",
            ApplicationMethod::InPerson => "in-person",
            ApplicationMethod::Phone => "phone",
            ApplicationMethod::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ApplicationMethod::Online => "Online",
            ApplicationMethod::Email => "Email",
            ApplicationMethod::InPerson => "In-person",
            ApplicationMethod::Phone => "Phone",
            ApplicationMethod::Other => "Other",
        }
    }
}

impl fmt::Display for ApplicationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "in person" and "in_person" both normalize onto the stored spelling
        let wanted = normalize_key(s).replace('_', "-");
        ApplicationMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == wanted)
            .ok_or_else(|| {
                ParseEnumError::new("method", s, ApplicationMethod::ALL.map(|m| m.as_str()))
            })
    }
}

fn normalize_key(s: &str) -> String {
    s.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Unknown enum spelling, with the closest known value when one is near.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {} '{}'{}", .kind, .given, suggestion_suffix(.suggestion.as_deref(), .expected))]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub given: String,
    pub suggestion: Option<&'static str>,
    pub expected: String,
}

impl ParseEnumError {
    pub fn new<const N: usize>(kind: &'static str, given: &str, known: [&'static str; N]) -> Self {
        let needle = given.trim().to_lowercase();
        let suggestion = known
            .iter()
            .map(|candidate| (*candidate, strsim::jaro_winkler(&needle, candidate)))
            .filter(|(_, score)| *score >= 0.8)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(candidate, _)| candidate);
        Self {
            kind,
            given: given.to_string(),
            suggestion,
            expected: known.join(", "),
        }
    }
}

fn suggestion_suffix(suggestion: Option<&str>, expected: &str) -> String {
    match suggestion {
        Some(best) => format!(" (did you mean '{}'?)", best),
        None => format!(" (expected one of: {})", expected),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub date_applied: String, // YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_method: Option<ApplicationMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Application {
    pub fn from_draft(id: String, draft: ApplicationDraft, now: &str) -> Self {
        let draft = draft.normalized();
        Self {
            id,
            date_applied: draft.date_applied,
            job_url: draft.job_url,
            company_name: draft.company_name,
            job_title: draft.job_title,
            application_method: draft.application_method,
            status: draft.status,
            notes: draft.notes,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    /// Replaces every business field; identity and `created_at` stay put.
    pub fn apply(&mut self, draft: ApplicationDraft, now: &str) {
        let draft = draft.normalized();
        self.date_applied = draft.date_applied;
        self.job_url = draft.job_url;
        self.company_name = draft.company_name;
        self.job_title = draft.job_title;
        self.application_method = draft.application_method;
        self.status = draft.status;
        self.notes = draft.notes;
        self.updated_at = now.to_string();
    }

    pub fn to_draft(&self) -> ApplicationDraft {
        ApplicationDraft {
            date_applied: self.date_applied.clone(),
            job_url: self.job_url.clone(),
            company_name: self.company_name.clone(),
            job_title: self.job_title.clone(),
            application_method: self.application_method,
            status: self.status,
            notes: self.notes.clone(),
        }
    }

    /// Company name, or the application date when the company was never set.
    pub fn display_name(&self) -> &str {
        self.company_name.as_deref().unwrap_or(&self.date_applied)
    }
}

/// The user-editable part of an application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationDraft {
    pub date_applied: String,
    pub job_url: Option<String>,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub application_method: Option<ApplicationMethod>,
    pub status: Option<ApplicationStatus>,
    pub notes: Option<String>,
}

impl ApplicationDraft {
    pub fn new(date_applied: impl Into<String>) -> Self {
        Self {
            date_applied: date_applied.into(),
            ..Self::default()
        }
    }

    /// Blank text fields count as unset.
    pub fn normalized(self) -> Self {
        Self {
            date_applied: self.date_applied.trim().to_string(),
            job_url: blank_to_none(self.job_url),
            company_name: blank_to_none(self.company_name),
            job_title: blank_to_none(self.job_title),
            application_method: self.application_method,
            status: self.status,
            notes: blank_to_none(self.notes),
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
