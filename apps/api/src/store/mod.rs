//! Persistence collaborator consumed by the matching engine.
//!
//! `AppState` holds an `Arc<dyn JobStore>`. Handlers never touch SQL directly.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::posting::{ApplicationRow, ApplicationStatus, EmployerPosting, JobPosting};
use crate::models::profile::{CandidateProfile, CertificateRow, DegreeRow, ExperienceRow, SkillRow};
use crate::models::requirement::RequirementClause;

pub use postgres::PgJobStore;

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Skills the candidate has not hidden from their profile.
    async fn fetch_active_skills(&self, candidate_id: Uuid) -> Result<Vec<SkillRow>>;

    async fn fetch_active_certificates(&self, candidate_id: Uuid) -> Result<Vec<CertificateRow>>;

    async fn fetch_experiences(&self, candidate_id: Uuid) -> Result<Vec<ExperienceRow>>;

    async fn fetch_degrees(&self, candidate_id: Uuid) -> Result<Vec<DegreeRow>>;

    /// All clauses of one posting, grouped by dimension (skills, certificates,
    /// experiences, degrees) and in insertion order within each dimension.
    async fn fetch_requirement_clauses(&self, job_id: Uuid) -> Result<Vec<RequirementClause>>;

    /// Clauses for many postings at once. Postings without clauses may be absent from the map.
    async fn fetch_requirement_clauses_batch(
        &self,
        job_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<RequirementClause>>> {
        let mut out = HashMap::with_capacity(job_ids.len());
        for &job_id in job_ids {
            out.insert(job_id, self.fetch_requirement_clauses(job_id).await?);
        }
        Ok(out)
    }

    /// Job id -> application status for every application the candidate holds.
    async fn fetch_candidate_applications(
        &self,
        candidate_id: Uuid,
    ) -> Result<HashMap<Uuid, ApplicationStatus>>;

    /// Active postings, newest first.
    async fn fetch_active_postings(&self) -> Result<Vec<JobPosting>>;

    async fn fetch_posting(&self, job_id: Uuid) -> Result<Option<JobPosting>>;

    /// Every posting the employer owns regardless of status, newest first.
    async fn fetch_employer_postings(&self, employer_id: Uuid) -> Result<Vec<EmployerPosting>>;

    /// Inserts a posting together with its clauses in one transaction.
    async fn insert_posting(&self, posting: &JobPosting, clauses: &[RequirementClause])
        -> Result<()>;

    /// Updates a posting and swaps its whole clause set in one transaction.
    async fn replace_posting(
        &self,
        posting: &JobPosting,
        clauses: &[RequirementClause],
    ) -> Result<()>;

    async fn update_posting_status(&self, job_id: Uuid, status: &str) -> Result<()>;

    /// Removes a posting along with its clauses and applications.
    async fn delete_posting(&self, job_id: Uuid) -> Result<()>;

    /// Returns `false` without writing when the candidate already holds an
    /// application for that job.
    async fn insert_application(&self, application: &ApplicationRow) -> Result<bool>;
}

/// Loads every profile section the engine needs for one candidate.
/// Called once per request, never per posting.
pub async fn fetch_candidate_profile(
    store: &dyn JobStore,
    candidate_id: Uuid,
) -> Result<CandidateProfile> {
    let skills = store.fetch_active_skills(candidate_id).await?;
    let certificates = store.fetch_active_certificates(candidate_id).await?;
    let experiences = store.fetch_experiences(candidate_id).await?;
    let degrees = store.fetch_degrees(candidate_id).await?;

    Ok(CandidateProfile {
        skills,
        certificates,
        experiences,
        degrees,
    })
}
