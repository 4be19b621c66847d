use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::eligibility::{evaluate, EligibilityReport};
use crate::matching::listing::{browse, BrowseContext, BrowseFilters};
use crate::matching::snapshot::CandidateSnapshot;
use crate::models::posting::PostingView;
use crate::state::AppState;
use crate::store::fetch_candidate_profile;

/// Identity is passed explicitly; the same query string also carries browse filters.
#[derive(Deserialize)]
pub struct CandidateQuery {
    pub candidate_id: Uuid,
}

/// GET /api/v1/jobs/browse
pub async fn handle_browse(
    State(state): State<AppState>,
    Query(candidate): Query<CandidateQuery>,
    Query(filters): Query<BrowseFilters>,
) -> Result<Json<Vec<PostingView>>, AppError> {
    let ctx = BrowseContext {
        store: state.store.as_ref(),
        candidate_id: candidate.candidate_id,
        current_year: Utc::now().year(),
        max_limit: state.config.browse_max_limit,
    };
    Ok(Json(browse(&ctx, &filters).await?))
}

/// GET /api/v1/jobs/:id/eligibility
pub async fn handle_eligibility(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(query): Query<CandidateQuery>,
) -> Result<Json<EligibilityReport>, AppError> {
    let store = state.store.as_ref();

    store
        .fetch_posting(job_id)
        .await
        .map_err(|e| AppError::unavailable("Failed to check eligibility", e))?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let profile = fetch_candidate_profile(store, query.candidate_id)
        .await
        .map_err(|e| AppError::unavailable("Failed to check eligibility", e))?;
    let clauses = store
        .fetch_requirement_clauses(job_id)
        .await
        .map_err(|e| AppError::unavailable("Failed to check eligibility", e))?;

    let snapshot = CandidateSnapshot::build(&profile, Utc::now().year());
    Ok(Json(evaluate(&clauses, &snapshot)))
}
