use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct SkillRow {
    pub title: String,
    pub skill_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct CertificateRow {
    pub title: String,
    pub issuer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct ExperienceRow {
    pub role_title: String,
    pub country: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_present: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct DegreeRow {
    pub degree_level: String,
    pub field_of_study: Option<String>,
}

/// Everything stored about one candidate that eligibility looks at.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CandidateProfile {
    pub skills: Vec<SkillRow>,
    pub certificates: Vec<CertificateRow>,
    pub experiences: Vec<ExperienceRow>,
    pub degrees: Vec<DegreeRow>,
}
