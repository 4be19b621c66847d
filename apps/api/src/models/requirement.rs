//! Structured eligibility requirements attached to a job posting.
//!
//! One posting owns any number of clauses across four dimensions. Clauses are
//! replaced wholesale with their posting; there is no per-clause update.

use serde::{Deserialize, Serialize};

/// Rank given to a clause whose degree level is not one of the known names.
/// No candidate can reach it.
pub const UNKNOWN_DEGREE_RANK: u8 = 99;

/// How a requirement string is compared against a candidate string.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum MatchMode {
    Exact,
    /// Requirement must appear as a substring of the candidate value.
    #[default]
    Including,
}

impl MatchMode {
    /// Anything other than `exact` is treated as `including`.
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("exact") {
            MatchMode::Exact
        } else {
            MatchMode::Including
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Exact => "exact",
            MatchMode::Including => "including",
        }
    }
}

impl From<String> for MatchMode {
    fn from(raw: String) -> Self {
        MatchMode::parse_lenient(&raw)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum DegreeLevel {
    #[serde(rename = "High School")]
    HighSchool,
    #[serde(rename = "Associate's")]
    Associate,
    #[serde(rename = "Bachelor's")]
    Bachelor,
    #[serde(rename = "Master's")]
    Master,
    #[serde(rename = "Doctoral")]
    Doctoral,
}

impl DegreeLevel {
    pub const ALL: [DegreeLevel; 5] = [
        DegreeLevel::HighSchool,
        DegreeLevel::Associate,
        DegreeLevel::Bachelor,
        DegreeLevel::Master,
        DegreeLevel::Doctoral,
    ];

    /// Case-insensitive lookup on the canonical display names.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(raw))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DegreeLevel::HighSchool => "High School",
            DegreeLevel::Associate => "Associate's",
            DegreeLevel::Bachelor => "Bachelor's",
            DegreeLevel::Master => "Master's",
            DegreeLevel::Doctoral => "Doctoral",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            DegreeLevel::HighSchool => 1,
            DegreeLevel::Associate => 2,
            DegreeLevel::Bachelor => 3,
            DegreeLevel::Master => 4,
            DegreeLevel::Doctoral => 5,
        }
    }
}

/// Rank demanded by a degree clause. Unknown names fail closed.
pub fn required_degree_rank(level: &str) -> u8 {
    DegreeLevel::parse(level)
        .map(|l| l.rank())
        .unwrap_or(UNKNOWN_DEGREE_RANK)
}

/// Rank held by a candidate degree. Unknown names count for nothing.
pub fn held_degree_rank(level: &str) -> u8 {
    DegreeLevel::parse(level).map(|l| l.rank()).unwrap_or(0)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Skill,
    Certificate,
    Experience,
    Degree,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Skill,
        Dimension::Certificate,
        Dimension::Experience,
        Dimension::Degree,
    ];
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillClause {
    pub skill_title: String,
    /// Stored and displayed, never compared during matching.
    pub skill_type: String,
    #[serde(default)]
    pub title_match_type: MatchMode,
    #[serde(default = "default_required")]
    pub is_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CertificateClause {
    pub certificate_title: String,
    #[serde(default)]
    pub title_match_type: MatchMode,
    pub issuer: Option<String>,
    #[serde(default)]
    pub issuer_match_type: MatchMode,
    #[serde(default = "default_required")]
    pub is_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperienceClause {
    pub years_required: u32,
    pub role_title: Option<String>,
    #[serde(default)]
    pub role_title_match_type: MatchMode,
    pub country: Option<String>,
    #[serde(default)]
    pub country_match_type: MatchMode,
    #[serde(default = "default_required")]
    pub is_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DegreeClause {
    pub degree_level: String,
    /// Informational only.
    pub field_of_study: Option<String>,
    #[serde(default = "default_required")]
    pub is_required: bool,
}

/// One requirement attached to a posting, keyed by dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "dimension", rename_all = "snake_case")]
pub enum RequirementClause {
    Skill(SkillClause),
    Certificate(CertificateClause),
    Experience(ExperienceClause),
    Degree(DegreeClause),
}

impl RequirementClause {
    pub fn dimension(&self) -> Dimension {
        match self {
            RequirementClause::Skill(_) => Dimension::Skill,
            RequirementClause::Certificate(_) => Dimension::Certificate,
            RequirementClause::Experience(_) => Dimension::Experience,
            RequirementClause::Degree(_) => Dimension::Degree,
        }
    }

    pub fn is_required(&self) -> bool {
        match self {
            RequirementClause::Skill(c) => c.is_required,
            RequirementClause::Certificate(c) => c.is_required,
            RequirementClause::Experience(c) => c.is_required,
            RequirementClause::Degree(c) => c.is_required,
        }
    }

    /// Short human-readable label, e.g. `5+ years in a role like "Engineer" in USA`.
    pub fn describe(&self) -> String {
        match self {
            RequirementClause::Skill(c) => format!("{} ({})", c.skill_title, c.skill_type),
            RequirementClause::Certificate(c) => match non_blank(c.issuer.as_deref()) {
                Some(issuer) => format!("{} from {issuer}", c.certificate_title),
                None => c.certificate_title.clone(),
            },
            RequirementClause::Experience(c) => {
                let mut label = format!("{}+ years", c.years_required);
                if let Some(role) = non_blank(c.role_title.as_deref()) {
                    label.push_str(&format!(" in a role like \"{role}\""));
                }
                if let Some(country) = non_blank(c.country.as_deref()) {
                    label.push_str(&format!(" in {country}"));
                }
                label
            }
            RequirementClause::Degree(c) => match non_blank(c.field_of_study.as_deref()) {
                Some(field) => format!("{} in {field}", c.degree_level),
                None => c.degree_level.clone(),
            },
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Clauses grouped per dimension, the shape used on the posting API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GroupedRequirements {
    pub required_skills: Vec<SkillClause>,
    pub required_certificates: Vec<CertificateClause>,
    pub required_experiences: Vec<ExperienceClause>,
    pub required_degrees: Vec<DegreeClause>,
}

impl GroupedRequirements {
    pub fn from_clauses(clauses: &[RequirementClause]) -> Self {
        let mut grouped = GroupedRequirements::default();
        for clause in clauses {
            match clause {
                RequirementClause::Skill(c) => grouped.required_skills.push(c.clone()),
                RequirementClause::Certificate(c) => grouped.required_certificates.push(c.clone()),
                RequirementClause::Experience(c) => grouped.required_experiences.push(c.clone()),
                RequirementClause::Degree(c) => grouped.required_degrees.push(c.clone()),
            }
        }
        grouped
    }
}
