//! Eligibility aggregation.
//!
//! Each dimension is judged only on its required clauses; preferred clauses are
//! evaluated for display but never change the outcome. A posting is eligible
//! when every dimension is satisfied, so a posting with no required clauses is
//! eligible for everyone.

use serde::Serialize;

use crate::matching::policy::matches;
use crate::matching::snapshot::CandidateSnapshot;
use crate::models::requirement::{
    required_degree_rank, CertificateClause, Dimension, ExperienceClause, RequirementClause,
    SkillClause,
};

/// Outcome for one clause, in posting order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClauseOutcome {
    pub dimension: Dimension,
    /// Position of the clause among the posting's clauses.
    pub index: usize,
    pub is_required: bool,
    pub satisfied: bool,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DimensionOutcome {
    pub dimension: Dimension,
    pub required_clauses: usize,
    pub satisfied: bool,
}

/// Detailed breakdown behind a single eligibility boolean.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EligibilityReport {
    pub eligible: bool,
    pub dimensions: Vec<DimensionOutcome>,
    pub clauses: Vec<ClauseOutcome>,
}

/// Short-circuiting eligibility check used on the browse path.
pub fn is_eligible(clauses: &[RequirementClause], snapshot: &CandidateSnapshot) -> bool {
    Dimension::ALL
        .iter()
        .all(|&dimension| dimension_satisfied(dimension, clauses, snapshot))
}

/// Evaluates every clause, preferred ones included.
pub fn evaluate(clauses: &[RequirementClause], snapshot: &CandidateSnapshot) -> EligibilityReport {
    let clause_outcomes: Vec<ClauseOutcome> = clauses
        .iter()
        .enumerate()
        .map(|(index, clause)| ClauseOutcome {
            dimension: clause.dimension(),
            index,
            is_required: clause.is_required(),
            satisfied: clause_satisfied(clause, snapshot),
            label: clause.describe(),
        })
        .collect();

    let dimensions: Vec<DimensionOutcome> = Dimension::ALL
        .iter()
        .map(|&dimension| DimensionOutcome {
            dimension,
            required_clauses: clause_outcomes
                .iter()
                .filter(|c| c.dimension == dimension && c.is_required)
                .count(),
            satisfied: dimension_satisfied(dimension, clauses, snapshot),
        })
        .collect();

    EligibilityReport {
        eligible: dimensions.iter().all(|d| d.satisfied),
        dimensions,
        clauses: clause_outcomes,
    }
}

/// Applies the dimension's rule to its required clauses only.
pub fn dimension_satisfied(
    dimension: Dimension,
    clauses: &[RequirementClause],
    snapshot: &CandidateSnapshot,
) -> bool {
    let mut required = clauses
        .iter()
        .filter(|c| c.dimension() == dimension && c.is_required());

    match dimension {
        Dimension::Degree => {
            let highest_required = required
                .filter_map(|c| match c {
                    RequirementClause::Degree(d) => Some(required_degree_rank(&d.degree_level)),
                    _ => None,
                })
                .max();
            match highest_required {
                Some(rank) => snapshot.max_degree_rank >= rank,
                None => true,
            }
        }
        Dimension::Skill | Dimension::Certificate | Dimension::Experience => {
            required.all(|c| clause_satisfied(c, snapshot))
        }
    }
}

/// Whether a single clause holds for the candidate, ignoring `is_required`.
pub fn clause_satisfied(clause: &RequirementClause, snapshot: &CandidateSnapshot) -> bool {
    match clause {
        RequirementClause::Skill(c) => skill_satisfied(c, snapshot),
        RequirementClause::Certificate(c) => certificate_satisfied(c, snapshot),
        RequirementClause::Experience(c) => experience_satisfied(c, snapshot),
        RequirementClause::Degree(c) => {
            snapshot.max_degree_rank >= required_degree_rank(&c.degree_level)
        }
    }
}

// skill_type is stored on the clause but not compared.
fn skill_satisfied(clause: &SkillClause, snapshot: &CandidateSnapshot) -> bool {
    let wanted = Some(clause.skill_title.as_str());
    snapshot
        .skills
        .iter()
        .any(|(title, _)| matches(wanted, title, clause.title_match_type))
}

fn certificate_satisfied(clause: &CertificateClause, snapshot: &CandidateSnapshot) -> bool {
    snapshot.certificates.iter().any(|(title, issuer)| {
        matches(Some(clause.certificate_title.as_str()), title, clause.title_match_type)
            && matches(clause.issuer.as_deref(), issuer, clause.issuer_match_type)
    })
}

// Years are checked against the candidate's combined total, not per matching role.
fn experience_satisfied(clause: &ExperienceClause, snapshot: &CandidateSnapshot) -> bool {
    if snapshot.total_experience_years < i64::from(clause.years_required) {
        return false;
    }
    snapshot.experiences.iter().any(|(role, country)| {
        matches(clause.role_title.as_deref(), role, clause.role_title_match_type)
            && matches(clause.country.as_deref(), country, clause.country_match_type)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{
        CandidateProfile, CertificateRow, DegreeRow, ExperienceRow, SkillRow,
    };
    use crate::models::requirement::{DegreeClause, MatchMode};
    use chrono::NaiveDate;

    fn skill(title: &str, mode: MatchMode, required: bool) -> RequirementClause {
        RequirementClause::Skill(SkillClause {
            skill_title: title.to_string(),
            skill_type: "Technical".to_string(),
            title_match_type: mode,
            is_required: required,
        })
    }

    fn degree(level: &str, required: bool) -> RequirementClause {
        RequirementClause::Degree(DegreeClause {
            degree_level: level.to_string(),
            field_of_study: None,
            is_required: required,
        })
    }

    fn experience(years: u32, role: Option<&str>, country: Option<&str>) -> RequirementClause {
        RequirementClause::Experience(ExperienceClause {
            years_required: years,
            role_title: role.map(str::to_string),
            role_title_match_type: MatchMode::Including,
            country: country.map(str::to_string),
            country_match_type: MatchMode::Exact,
            is_required: true,
        })
    }

    fn certificate(title: &str, title_mode: MatchMode, issuer: Option<&str>) -> RequirementClause {
        RequirementClause::Certificate(CertificateClause {
            certificate_title: title.to_string(),
            title_match_type: title_mode,
            issuer: issuer.map(str::to_string),
            issuer_match_type: MatchMode::Exact,
            is_required: true,
        })
    }

    fn date(y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, 1, 1).unwrap()
    }

    fn snapshot_with_degree(level: &str) -> CandidateSnapshot {
        CandidateSnapshot::build(
            &CandidateProfile {
                degrees: vec![DegreeRow {
                    degree_level: level.to_string(),
                    field_of_study: None,
                }],
                ..Default::default()
            },
            2024,
        )
    }

    /// Ongoing Engineer role since 2020 plus a closed 2010–2012 internship: 6 years in 2024.
    fn experienced_snapshot() -> CandidateSnapshot {
        CandidateSnapshot::build(
            &CandidateProfile {
                experiences: vec![
                    ExperienceRow {
                        role_title: "Senior Software Engineer".to_string(),
                        country: Some("USA".to_string()),
                        start_date: date(2020),
                        end_date: None,
                        is_present: true,
                    },
                    ExperienceRow {
                        role_title: "Intern".to_string(),
                        country: Some("Canada".to_string()),
                        start_date: date(2010),
                        end_date: Some(date(2012)),
                        is_present: false,
                    },
                ],
                ..Default::default()
            },
            2024,
        )
    }

    #[test]
    fn test_no_required_clauses_is_eligible_for_empty_profile() {
        let empty = CandidateSnapshot::default();
        assert!(is_eligible(&[], &empty));

        let preferred_only = vec![skill("Rust", MatchMode::Exact, false), degree("Doctoral", false)];
        assert!(is_eligible(&preferred_only, &empty));
    }

    #[test]
    fn test_unmatched_required_skill_fails_regardless_of_other_dimensions() {
        let mut snapshot = snapshot_with_degree("Doctoral");
        snapshot
            .skills
            .insert(("python".to_string(), "technical".to_string()));

        let clauses = vec![skill("Rust", MatchMode::Including, true), degree("High School", true)];
        assert!(!is_eligible(&clauses, &snapshot));
    }

    #[test]
    fn test_every_required_skill_must_match() {
        let mut snapshot = CandidateSnapshot::default();
        snapshot
            .skills
            .insert(("rust programming".to_string(), "technical".to_string()));

        assert!(is_eligible(&[skill("rust", MatchMode::Including, true)], &snapshot));
        assert!(!is_eligible(&[skill("rust", MatchMode::Exact, true)], &snapshot));
        assert!(!is_eligible(
            &[
                skill("rust", MatchMode::Including, true),
                skill("kafka", MatchMode::Including, true)
            ],
            &snapshot
        ));
    }

    #[test]
    fn test_skill_type_is_not_compared() {
        let mut snapshot = CandidateSnapshot::default();
        snapshot
            .skills
            .insert(("rust".to_string(), "behavioral".to_string()));
        assert!(is_eligible(&[skill("Rust", MatchMode::Exact, true)], &snapshot));
    }

    #[test]
    fn test_degree_rank_monotonicity() {
        let masters = snapshot_with_degree("Master's");
        assert!(is_eligible(&[degree("Bachelor's", true)], &masters));
        assert!(is_eligible(&[degree("Master's", true)], &masters));
        assert!(!is_eligible(&[degree("Doctoral", true)], &masters));
    }

    #[test]
    fn test_degree_uses_highest_required_level() {
        let masters = snapshot_with_degree("Master's");
        let clauses = vec![degree("High School", true), degree("Doctoral", true)];
        assert!(!is_eligible(&clauses, &masters));
    }

    #[test]
    fn test_unknown_required_degree_is_unsatisfiable() {
        let doctor = snapshot_with_degree("Doctoral");
        assert!(!is_eligible(&[degree("Grandmaster", true)], &doctor));
        assert!(is_eligible(&[degree("Grandmaster", false)], &doctor));
    }

    #[test]
    fn test_experience_total_years_threshold() {
        let snapshot = experienced_snapshot();
        assert_eq!(snapshot.total_experience_years, 6);
        assert!(is_eligible(&[experience(5, None, None)], &snapshot));
        assert!(is_eligible(&[experience(6, None, None)], &snapshot));
        assert!(!is_eligible(&[experience(7, None, None)], &snapshot));
    }

    #[test]
    fn test_experience_years_are_global_not_per_role() {
        // Only 4 of the 6 years were spent as an engineer, yet 5 years "as engineer" passes.
        let snapshot = experienced_snapshot();
        assert!(is_eligible(&[experience(5, Some("Engineer"), None)], &snapshot));
    }

    #[test]
    fn test_experience_role_and_country_must_match_same_entry() {
        let snapshot = experienced_snapshot();
        assert!(is_eligible(&[experience(1, Some("Engineer"), Some("usa"))], &snapshot));
        assert!(!is_eligible(&[experience(1, Some("Engineer"), Some("Canada"))], &snapshot));
        assert!(!is_eligible(&[experience(1, Some("Chef"), None)], &snapshot));
    }

    #[test]
    fn test_experience_clause_with_no_entries_fails_even_at_zero_years() {
        let empty = CandidateSnapshot::default();
        assert!(!is_eligible(&[experience(0, None, None)], &empty));
    }

    #[test]
    fn test_certificate_including_title_exact_issuer() {
        let snapshot = CandidateSnapshot::build(
            &CandidateProfile {
                certificates: vec![CertificateRow {
                    title: "PMP".to_string(),
                    issuer: Some("PMI".to_string()),
                }],
                ..Default::default()
            },
            2024,
        );
        assert!(is_eligible(
            &[certificate("PM", MatchMode::Including, Some("PMI"))],
            &snapshot
        ));
        assert!(!is_eligible(
            &[certificate("PM", MatchMode::Exact, Some("PMI"))],
            &snapshot
        ));
        assert!(!is_eligible(
            &[certificate("PMP", MatchMode::Exact, Some("PMI Europe"))],
            &snapshot
        ));
        assert!(is_eligible(&[certificate("pmp", MatchMode::Exact, None)], &snapshot));
    }

    #[test]
    fn test_report_agrees_with_short_circuit_check() {
        let mut snapshot = experienced_snapshot();
        snapshot.max_degree_rank = 3;
        snapshot
            .skills
            .insert(("rust".to_string(), "technical".to_string()));

        let cases = vec![
            vec![],
            vec![skill("Rust", MatchMode::Exact, true)],
            vec![skill("Go", MatchMode::Exact, true), degree("Bachelor's", true)],
            vec![degree("Master's", true), experience(3, Some("Engineer"), None)],
            vec![degree("Master's", false), experience(3, Some("Engineer"), None)],
        ];
        for clauses in cases {
            let report = evaluate(&clauses, &snapshot);
            assert_eq!(report.eligible, is_eligible(&clauses, &snapshot), "{clauses:?}");
            assert_eq!(report.clauses.len(), clauses.len());
        }
    }

    #[test]
    fn test_report_marks_preferred_failures_without_failing_posting() {
        let snapshot = snapshot_with_degree("Bachelor's");
        let clauses = vec![degree("Bachelor's", true), skill("Haskell", MatchMode::Exact, false)];

        let report = evaluate(&clauses, &snapshot);
        assert!(report.eligible);
        assert!(report.clauses[0].satisfied);
        assert!(!report.clauses[1].satisfied);
        assert!(!report.clauses[1].is_required);

        let skill_dim = report
            .dimensions
            .iter()
            .find(|d| d.dimension == Dimension::Skill)
            .unwrap();
        assert_eq!(skill_dim.required_clauses, 0);
        assert!(skill_dim.satisfied);
    }

    #[test]
    fn test_report_labels() {
        let report = evaluate(&[skill("Rust", MatchMode::Exact, true)], &CandidateSnapshot::default());
        assert_eq!(report.clauses[0].label, "Rust (Technical)");
        assert!(!report.eligible);
    }

    #[test]
    fn test_skill_snapshot_from_profile_rows() {
        let snapshot = CandidateSnapshot::build(
            &CandidateProfile {
                skills: vec![SkillRow {
                    title: "PostgreSQL".to_string(),
                    skill_type: "Technical".to_string(),
                }],
                ..Default::default()
            },
            2024,
        );
        assert!(is_eligible(&[skill("postgres", MatchMode::Including, true)], &snapshot));
    }
}
