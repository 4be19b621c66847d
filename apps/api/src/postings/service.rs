use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::eligibility::is_eligible;
use crate::matching::snapshot::CandidateSnapshot;
use crate::models::posting::{
    ApplicationRow, ApplicationStatus, EmployerPosting, JobPosting, STATUS_ACTIVE,
};
use crate::models::requirement::GroupedRequirements;
use crate::postings::validation::{
    optional_text, validate_posting_request, validate_status, PostingRequest,
};
use crate::store::{fetch_candidate_profile, JobStore};

/// A posting with its clauses grouped per dimension.
#[derive(Debug, Clone, Serialize)]
pub struct PostingDetail {
    #[serde(flatten)]
    pub posting: JobPosting,
    #[serde(flatten)]
    pub requirements: GroupedRequirements,
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub candidate_id: Uuid,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub employer_id: Uuid,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct EmployerQuery {
    pub employer_id: Uuid,
}

pub async fn create_posting(
    store: &dyn JobStore,
    req: PostingRequest,
) -> Result<PostingDetail, AppError> {
    let clauses = validate_posting_request(&req)?;

    let posting = JobPosting {
        id: Uuid::new_v4(),
        ..posting_fields(req, STATUS_ACTIVE)
    };
    store.insert_posting(&posting, &clauses).await?;

    info!(
        "Employer {} created posting {} ({} clauses)",
        posting.posted_by,
        posting.id,
        clauses.len()
    );
    Ok(PostingDetail {
        requirements: GroupedRequirements::from_clauses(&clauses),
        posting,
    })
}

/// Replaces a posting and its entire clause set. Only the original poster may do this.
pub async fn replace_posting(
    store: &dyn JobStore,
    job_id: Uuid,
    req: PostingRequest,
) -> Result<PostingDetail, AppError> {
    let existing = owned_posting(store, job_id, req.employer_id).await?;
    let clauses = validate_posting_request(&req)?;
    let posting = JobPosting {
        id: existing.id,
        posted_by: existing.posted_by,
        created_at: existing.created_at,
        ..posting_fields(req, &existing.status)
    };
    store.replace_posting(&posting, &clauses).await?;

    info!("Replaced posting {} ({} clauses)", posting.id, clauses.len());
    Ok(PostingDetail {
        requirements: GroupedRequirements::from_clauses(&clauses),
        posting,
    })
}

pub async fn get_posting(store: &dyn JobStore, job_id: Uuid) -> Result<PostingDetail, AppError> {
    let posting = store
        .fetch_posting(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    let clauses = store.fetch_requirement_clauses(job_id).await?;

    Ok(PostingDetail {
        posting,
        requirements: GroupedRequirements::from_clauses(&clauses),
    })
}

/// Loads a posting and checks that `employer_id` owns it.
async fn owned_posting(
    store: &dyn JobStore,
    job_id: Uuid,
    employer_id: Uuid,
) -> Result<JobPosting, AppError> {
    let posting = store
        .fetch_posting(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    if posting.posted_by != employer_id {
        return Err(AppError::Forbidden);
    }
    Ok(posting)
}

/// Moves a posting between active, closed and draft. Only active postings
/// are browsable or accept applications.
pub async fn update_status(
    store: &dyn JobStore,
    job_id: Uuid,
    req: StatusRequest,
) -> Result<JobPosting, AppError> {
    let mut posting = owned_posting(store, job_id, req.employer_id).await?;
    let status = validate_status(&req.status)?;

    store.update_posting_status(job_id, status).await?;
    posting.status = status.to_string();
    Ok(posting)
}

pub async fn delete_posting(
    store: &dyn JobStore,
    job_id: Uuid,
    employer_id: Uuid,
) -> Result<(), AppError> {
    owned_posting(store, job_id, employer_id).await?;
    store.delete_posting(job_id).await?;
    Ok(())
}

pub async fn list_employer_postings(
    store: &dyn JobStore,
    employer_id: Uuid,
) -> Result<Vec<EmployerPosting>, AppError> {
    Ok(store.fetch_employer_postings(employer_id).await?)
}

/// Records a pending application after checking ownership, status, duplicates
/// and eligibility, in that order.
pub async fn apply(
    store: &dyn JobStore,
    job_id: Uuid,
    req: ApplyRequest,
    current_year: i32,
) -> Result<ApplicationRow, AppError> {
    let posting = store
        .fetch_posting(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    if posting.posted_by == req.candidate_id {
        return Err(AppError::Forbidden);
    }
    if !posting.is_active() {
        return Err(AppError::UnprocessableEntity(
            "This job is no longer accepting applications".to_string(),
        ));
    }

    let applications = store.fetch_candidate_applications(req.candidate_id).await?;
    if applications.contains_key(&job_id) {
        return Err(AppError::Conflict(
            "You have already applied to this job".to_string(),
        ));
    }

    let profile = fetch_candidate_profile(store, req.candidate_id).await?;
    let clauses = store.fetch_requirement_clauses(job_id).await?;
    let snapshot = CandidateSnapshot::build(&profile, current_year);
    if !is_eligible(&clauses, &snapshot) {
        return Err(AppError::UnprocessableEntity(
            "You do not meet the required qualifications for this job".to_string(),
        ));
    }

    let application = ApplicationRow {
        id: Uuid::new_v4(),
        job_id,
        user_id: req.candidate_id,
        cover_letter: optional_text(&req.cover_letter),
        status: ApplicationStatus::Pending,
        applied_at: Utc::now(),
    };
    // A concurrent apply can slip past the check above.
    if !store.insert_application(&application).await? {
        return Err(AppError::Conflict(
            "You have already applied to this job".to_string(),
        ));
    }

    info!(
        "Candidate {} applied to posting {}",
        application.user_id, application.job_id
    );
    Ok(application)
}

/// Copies the editable fields of a request into a posting shell.
fn posting_fields(req: PostingRequest, fallback_status: &str) -> JobPosting {
    JobPosting {
        id: Uuid::nil(),
        posted_by: req.employer_id,
        title: req.title.trim().to_string(),
        description: req.description.trim().to_string(),
        company_name: req.company_name.trim().to_string(),
        location: optional_text(&req.location),
        employment_type: optional_text(&req.employment_type),
        employment_arrangement: optional_text(&req.employment_arrangement),
        salary_min: req.salary_min,
        salary_max: req.salary_max,
        application_deadline: req.application_deadline,
        status: optional_text(&req.status).unwrap_or_else(|| fallback_status.to_string()),
        created_at: Utc::now(),
    }
}
