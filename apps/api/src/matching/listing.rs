//! Browse listing: filters active postings, annotates each with the candidate's
//! eligibility and application state, newest first.

use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::eligibility::is_eligible;
use crate::matching::snapshot::CandidateSnapshot;
use crate::models::posting::{JobPosting, PostingView};
use crate::store::{fetch_candidate_profile, JobStore};

const MAX_OFFSET: i64 = 10_000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowseFilters {
    pub search: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub employment_arrangement: Option<String>,
    #[serde(default)]
    pub eligible_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Explicit per-request context: who is browsing, against which store.
pub struct BrowseContext<'a> {
    pub store: &'a dyn JobStore,
    pub candidate_id: Uuid,
    pub current_year: i32,
    pub max_limit: i64,
}

/// Produces the candidate's job listing.
///
/// All store reads happen before the evaluation loop: one profile load, one
/// application lookup, one posting scan and one batched clause fetch. Any read
/// failure aborts the whole call.
pub async fn browse(
    ctx: &BrowseContext<'_>,
    filters: &BrowseFilters,
) -> Result<Vec<PostingView>, AppError> {
    let (limit, offset) = validate_pagination(filters.limit, filters.offset, ctx.max_limit)?;
    let store = ctx.store;

    let profile = fetch_candidate_profile(store, ctx.candidate_id)
        .await
        .map_err(|e| AppError::unavailable("Failed to load jobs", e))?;
    let applications = store
        .fetch_candidate_applications(ctx.candidate_id)
        .await
        .map_err(|e| AppError::unavailable("Failed to load jobs", e))?;
    let postings = store
        .fetch_active_postings()
        .await
        .map_err(|e| AppError::unavailable("Failed to load jobs", e))?;
    let considered = postings.len();

    let mut postings: Vec<JobPosting> = postings
        .into_iter()
        .filter(|p| passes_filters(p, ctx.candidate_id, filters))
        .collect();

    let job_ids: Vec<Uuid> = postings.iter().map(|p| p.id).collect();
    let clauses_by_job = store
        .fetch_requirement_clauses_batch(&job_ids)
        .await
        .map_err(|e| AppError::unavailable("Failed to load jobs", e))?;

    let snapshot = CandidateSnapshot::build(&profile, ctx.current_year);

    // Stable sort keeps storage order among equal timestamps.
    postings.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut views = Vec::with_capacity(postings.len());
    for posting in postings {
        let clauses = clauses_by_job
            .get(&posting.id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let user_eligible = is_eligible(clauses, &snapshot);
        debug!(
            "Posting {} eligible={} for candidate {}",
            posting.id, user_eligible, ctx.candidate_id
        );

        if filters.eligible_only && !user_eligible {
            continue;
        }

        let application_status = applications.get(&posting.id).copied();
        views.push(PostingView {
            user_applied: application_status.is_some(),
            user_eligible,
            application_status,
            posting,
        });
    }

    let matched = views.len();
    let page: Vec<PostingView> = views
        .into_iter()
        .skip(offset as usize)
        .take(limit.map(|l| l as usize).unwrap_or(usize::MAX))
        .collect();

    info!(
        "Browse for candidate {}: {} active, {} matched, {} returned",
        ctx.candidate_id,
        considered,
        matched,
        page.len()
    );
    Ok(page)
}

/// Base set plus text, location and enumerated filters. Blank filters are ignored.
pub fn passes_filters(posting: &JobPosting, candidate_id: Uuid, filters: &BrowseFilters) -> bool {
    if !posting.is_active() || posting.posted_by == candidate_id {
        return false;
    }

    if let Some(search) = non_blank(&filters.search) {
        let needle = search.to_lowercase();
        let in_title = posting.title.to_lowercase().contains(&needle);
        let in_description = posting.description.to_lowercase().contains(&needle);
        if !in_title && !in_description {
            return false;
        }
    }

    if let Some(location) = non_blank(&filters.location) {
        let needle = location.to_lowercase();
        let hit = posting
            .location
            .as_deref()
            .map(|l| l.to_lowercase().contains(&needle))
            .unwrap_or(false);
        if !hit {
            return false;
        }
    }

    if let Some(kind) = non_blank(&filters.employment_type) {
        if posting.employment_type.as_deref() != Some(kind) {
            return false;
        }
    }

    if let Some(arrangement) = non_blank(&filters.employment_arrangement) {
        if posting.employment_arrangement.as_deref() != Some(arrangement) {
            return false;
        }
    }

    true
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// `limit` is optional (all results when absent); `offset` defaults to 0.
pub fn validate_pagination(
    limit: Option<i64>,
    offset: Option<i64>,
    max_limit: i64,
) -> Result<(Option<i64>, i64), AppError> {
    if let Some(limit) = limit {
        if !(1..=max_limit).contains(&limit) {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {max_limit}"
            )));
        }
    }

    let offset = offset.unwrap_or(0);
    if !(0..=MAX_OFFSET).contains(&offset) {
        return Err(AppError::Validation(format!(
            "offset must be between 0 and {MAX_OFFSET}"
        )));
    }

    Ok((limit, offset))
}
