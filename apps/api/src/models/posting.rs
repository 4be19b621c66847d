use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_ACTIVE: &str = "active";
pub const POSTING_STATUSES: &[&str] = &[STATUS_ACTIVE, "closed", "draft"];

pub const EMPLOYMENT_TYPES: &[&str] = &["Full-Time", "Part-Time", "Contract", "Internship"];
pub const EMPLOYMENT_ARRANGEMENTS: &[&str] = &["On-Site", "Remote", "Hybrid"];

/// Lifecycle of a candidate's application. Every new application starts as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Shortlisted,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Accepted,
    ];

    pub fn parse(status: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(status.trim()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct JobPosting {
    pub id: Uuid,
    pub posted_by: Uuid,
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub employment_arrangement: Option<String>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub application_deadline: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl JobPosting {
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }
}

/// A posting as seen by one candidate on the browse listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PostingView {
    #[serde(flatten)]
    pub posting: JobPosting,
    pub user_applied: bool,
    pub user_eligible: bool,
    pub application_status: Option<ApplicationStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// One of the employer's own postings, with how many candidates applied.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct EmployerPosting {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub posting: JobPosting,
    pub applications_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_status_parses_case_insensitively() {
        assert_eq!(
            ApplicationStatus::parse(" Shortlisted "),
            Some(ApplicationStatus::Shortlisted)
        );
        assert_eq!(ApplicationStatus::parse("withdrawn"), None);
    }

    #[test]
    fn test_application_status_serializes_lowercase() {
        let json = serde_json::to_value(ApplicationStatus::Accepted).unwrap();
        assert_eq!(json, "accepted");
        for status in ApplicationStatus::ALL {
            assert_eq!(ApplicationStatus::parse(status.as_str()), Some(status));
        }
    }
}
