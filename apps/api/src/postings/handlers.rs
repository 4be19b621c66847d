use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::posting::{ApplicationRow, EmployerPosting, JobPosting};
use crate::postings::service::{self, ApplyRequest, EmployerQuery, PostingDetail, StatusRequest};
use crate::postings::validation::PostingRequest;
use crate::state::AppState;

/// POST /api/v1/jobs
pub async fn handle_create_posting(
    State(state): State<AppState>,
    Json(req): Json<PostingRequest>,
) -> Result<(StatusCode, Json<PostingDetail>), AppError> {
    let detail = service::create_posting(state.store.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/v1/jobs?employer_id=
pub async fn handle_list_employer_postings(
    State(state): State<AppState>,
    Query(query): Query<EmployerQuery>,
) -> Result<Json<Vec<EmployerPosting>>, AppError> {
    Ok(Json(
        service::list_employer_postings(state.store.as_ref(), query.employer_id).await?,
    ))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_posting(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<PostingDetail>, AppError> {
    Ok(Json(service::get_posting(state.store.as_ref(), job_id).await?))
}

/// PUT /api/v1/jobs/:id
pub async fn handle_replace_posting(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(req): Json<PostingRequest>,
) -> Result<Json<PostingDetail>, AppError> {
    Ok(Json(
        service::replace_posting(state.store.as_ref(), job_id, req).await?,
    ))
}

/// DELETE /api/v1/jobs/:id?employer_id=
pub async fn handle_delete_posting(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(query): Query<EmployerQuery>,
) -> Result<StatusCode, AppError> {
    service::delete_posting(state.store.as_ref(), job_id, query.employer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/jobs/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<JobPosting>, AppError> {
    Ok(Json(
        service::update_status(state.store.as_ref(), job_id, req).await?,
    ))
}

/// POST /api/v1/jobs/:id/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(req): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    let application =
        service::apply(state.store.as_ref(), job_id, req, Utc::now().year()).await?;
    Ok((StatusCode::CREATED, Json(application)))
}
