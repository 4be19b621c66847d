//! Request shapes for creating or replacing a posting, and the checks that turn
//! them into well-formed clauses. The matching engine trusts whatever passes here.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::posting::{EMPLOYMENT_ARRANGEMENTS, EMPLOYMENT_TYPES, POSTING_STATUSES};
use crate::models::requirement::{
    CertificateClause, DegreeClause, DegreeLevel, ExperienceClause, MatchMode, RequirementClause,
    SkillClause,
};

#[derive(Debug, Clone, Deserialize)]
pub struct SkillRequirementInput {
    #[serde(alias = "title")]
    pub skill_title: String,
    #[serde(alias = "type")]
    pub skill_type: String,
    pub title_match_type: Option<String>,
    pub is_required: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CertificateRequirementInput {
    #[serde(alias = "title")]
    pub certificate_title: String,
    pub title_match_type: Option<String>,
    pub issuer: Option<String>,
    pub issuer_match_type: Option<String>,
    pub is_required: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExperienceRequirementInput {
    /// Optional here so a missing value is reported as a validation error.
    pub years_required: Option<i64>,
    pub role_title: Option<String>,
    pub role_title_match_type: Option<String>,
    pub country: Option<String>,
    pub country_match_type: Option<String>,
    pub is_required: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DegreeRequirementInput {
    #[serde(alias = "level")]
    pub degree_level: String,
    pub field_of_study: Option<String>,
    pub is_required: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostingRequest {
    pub employer_id: Uuid,
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub employment_arrangement: Option<String>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub application_deadline: Option<NaiveDate>,
    pub status: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<SkillRequirementInput>,
    #[serde(default)]
    pub required_certificates: Vec<CertificateRequirementInput>,
    #[serde(default)]
    pub required_experiences: Vec<ExperienceRequirementInput>,
    #[serde(default)]
    pub required_degrees: Vec<DegreeRequirementInput>,
}

/// Checks the request and builds its clause list in dimension order.
/// All problems are reported together.
pub fn validate_posting_request(req: &PostingRequest) -> Result<Vec<RequirementClause>, AppError> {
    let mut errors: Vec<String> = Vec::new();

    for (field, value) in [
        ("title", &req.title),
        ("description", &req.description),
        ("company_name", &req.company_name),
    ] {
        if value.trim().is_empty() {
            errors.push(format!("{field} must not be empty"));
        }
    }

    if let (Some(min), Some(max)) = (req.salary_min, req.salary_max) {
        if min > max {
            errors.push(format!("salary_min ({min}) must not exceed salary_max ({max})"));
        }
    }
    for (field, value) in [("salary_min", req.salary_min), ("salary_max", req.salary_max)] {
        if value.is_some_and(|v| v < 0) {
            errors.push(format!("{field} must not be negative"));
        }
    }

    check_enumerated(&mut errors, "employment_type", &req.employment_type, EMPLOYMENT_TYPES);
    check_enumerated(
        &mut errors,
        "employment_arrangement",
        &req.employment_arrangement,
        EMPLOYMENT_ARRANGEMENTS,
    );
    check_enumerated(&mut errors, "status", &req.status, POSTING_STATUSES);

    let mut clauses = Vec::new();

    for (i, skill) in req.required_skills.iter().enumerate() {
        let at = format!("required_skills[{i}]");
        if skill.skill_title.trim().is_empty() {
            errors.push(format!("{at}.skill_title must not be empty"));
        }
        clauses.push(RequirementClause::Skill(SkillClause {
            skill_title: skill.skill_title.trim().to_string(),
            skill_type: skill.skill_type.trim().to_string(),
            title_match_type: parse_match_type(
                &mut errors,
                &at,
                "title_match_type",
                &skill.title_match_type,
            ),
            is_required: skill.is_required.unwrap_or(true),
        }));
    }

    for (i, cert) in req.required_certificates.iter().enumerate() {
        let at = format!("required_certificates[{i}]");
        if cert.certificate_title.trim().is_empty() {
            errors.push(format!("{at}.certificate_title must not be empty"));
        }
        clauses.push(RequirementClause::Certificate(CertificateClause {
            certificate_title: cert.certificate_title.trim().to_string(),
            title_match_type: parse_match_type(
                &mut errors,
                &at,
                "title_match_type",
                &cert.title_match_type,
            ),
            issuer: optional_text(&cert.issuer),
            issuer_match_type: parse_match_type(
                &mut errors,
                &at,
                "issuer_match_type",
                &cert.issuer_match_type,
            ),
            is_required: cert.is_required.unwrap_or(true),
        }));
    }

    for (i, exp) in req.required_experiences.iter().enumerate() {
        let at = format!("required_experiences[{i}]");
        let years_required = match exp.years_required {
            None => {
                errors.push(format!("{at}.years_required is required"));
                0
            }
            Some(y) if y < 0 => {
                errors.push(format!("{at}.years_required must not be negative"));
                0
            }
            // Stored as a Postgres INTEGER.
            Some(y) => match i32::try_from(y) {
                Ok(y) => y.unsigned_abs(),
                Err(_) => {
                    errors.push(format!("{at}.years_required is out of range"));
                    0
                }
            },
        };
        clauses.push(RequirementClause::Experience(ExperienceClause {
            years_required,
            role_title: optional_text(&exp.role_title),
            role_title_match_type: parse_match_type(
                &mut errors,
                &at,
                "role_title_match_type",
                &exp.role_title_match_type,
            ),
            country: optional_text(&exp.country),
            country_match_type: parse_match_type(
                &mut errors,
                &at,
                "country_match_type",
                &exp.country_match_type,
            ),
            is_required: exp.is_required.unwrap_or(true),
        }));
    }

    for (i, degree) in req.required_degrees.iter().enumerate() {
        let at = format!("required_degrees[{i}]");
        let level = match DegreeLevel::parse(&degree.degree_level) {
            Some(level) => level.as_str().to_string(),
            None => {
                errors.push(format!(
                    "{at}.degree_level '{}' is not one of: {}",
                    degree.degree_level,
                    DegreeLevel::ALL.map(|l| l.as_str()).join(", ")
                ));
                degree.degree_level.clone()
            }
        };
        clauses.push(RequirementClause::Degree(DegreeClause {
            degree_level: level,
            field_of_study: optional_text(&degree.field_of_study),
            is_required: degree.is_required.unwrap_or(true),
        }));
    }

    if errors.is_empty() {
        Ok(clauses)
    } else {
        Err(AppError::Validation(errors.join("; ")))
    }
}

/// Blank strings are stored as absent.
pub fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Checks a standalone status change against the posting lifecycle states.
pub fn validate_status(status: &str) -> Result<&'static str, AppError> {
    let wanted = status.trim();
    POSTING_STATUSES
        .iter()
        .copied()
        .find(|s| *s == wanted)
        .ok_or_else(|| {
            AppError::Validation(format!(
                "status '{wanted}' is not one of: {}",
                POSTING_STATUSES.join(", ")
            ))
        })
}

fn parse_match_type(
    errors: &mut Vec<String>,
    at: &str,
    field: &str,
    raw: &Option<String>,
) -> MatchMode {
    match optional_text(raw) {
        None => MatchMode::Including,
        Some(value) if value.eq_ignore_ascii_case("exact") => MatchMode::Exact,
        Some(value) if value.eq_ignore_ascii_case("including") => MatchMode::Including,
        Some(value) => {
            errors.push(format!(
                "{at}.{field} must be 'exact' or 'including', got '{value}'"
            ));
            MatchMode::Including
        }
    }
}

fn check_enumerated(
    errors: &mut Vec<String>,
    field: &str,
    value: &Option<String>,
    allowed: &[&str],
) {
    if let Some(value) = optional_text(value) {
        if !allowed.contains(&value.as_str()) {
            errors.push(format!(
                "{field} '{value}' is not one of: {}",
                allowed.join(", ")
            ));
        }
    }
}
