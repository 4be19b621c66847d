use std::collections::BTreeSet;

use chrono::Datelike;
use serde::Serialize;

use crate::models::profile::{CandidateProfile, ExperienceRow};
use crate::models::requirement::held_degree_rank;

/// Normalized view of one candidate's profile for a single evaluation pass.
/// Never persisted; rebuilt on every request.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CandidateSnapshot {
    /// (title, type), lower-cased
    pub skills: BTreeSet<(String, String)>,
    /// (title, issuer), lower-cased
    pub certificates: BTreeSet<(String, String)>,
    /// (role title, country), lower-cased
    pub experiences: BTreeSet<(String, String)>,
    /// Sum across all entries, overlapping periods counted twice.
    pub total_experience_years: i64,
    /// 0 when the candidate holds no recognized degree.
    pub max_degree_rank: u8,
}

impl CandidateSnapshot {
    pub fn build(profile: &CandidateProfile, current_year: i32) -> Self {
        let skills = profile
            .skills
            .iter()
            .map(|s| (s.title.to_lowercase(), s.skill_type.to_lowercase()))
            .collect();

        let certificates = profile
            .certificates
            .iter()
            .map(|c| {
                (
                    c.title.to_lowercase(),
                    c.issuer.as_deref().unwrap_or_default().to_lowercase(),
                )
            })
            .collect();

        let experiences = profile
            .experiences
            .iter()
            .map(|e| {
                (
                    e.role_title.to_lowercase(),
                    e.country.as_deref().unwrap_or_default().to_lowercase(),
                )
            })
            .collect();

        let total_experience_years = profile
            .experiences
            .iter()
            .map(|e| experience_years(e, current_year))
            .sum();

        let max_degree_rank = profile
            .degrees
            .iter()
            .map(|d| held_degree_rank(&d.degree_level))
            .max()
            .unwrap_or(0);

        CandidateSnapshot {
            skills,
            certificates,
            experiences,
            total_experience_years,
            max_degree_rank,
        }
    }
}

/// Whole-year span of one entry: current year for ongoing roles, end year otherwise.
/// A closed entry without an end date, or one that ends before it starts, counts as 0.
pub fn experience_years(entry: &ExperienceRow, current_year: i32) -> i64 {
    let end_year = if entry.is_present {
        current_year
    } else {
        match entry.end_date {
            Some(end) => end.year(),
            None => return 0,
        }
    };
    i64::from(end_year - entry.start_date.year()).max(0)
}
