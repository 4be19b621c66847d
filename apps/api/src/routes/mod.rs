pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::matching::handlers as matching;
use crate::postings::handlers as postings;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Browse + eligibility
        .route("/api/v1/jobs/browse", get(matching::handle_browse))
        .route(
            "/api/v1/jobs/:id/eligibility",
            get(matching::handle_eligibility),
        )
        // Posting lifecycle
        .route(
            "/api/v1/jobs",
            get(postings::handle_list_employer_postings).post(postings::handle_create_posting),
        )
        .route(
            "/api/v1/jobs/:id",
            get(postings::handle_get_posting)
                .put(postings::handle_replace_posting)
                .delete(postings::handle_delete_posting),
        )
        .route("/api/v1/jobs/:id/status", put(postings::handle_update_status))
        .route("/api/v1/jobs/:id/apply", post(postings::handle_apply))
        .with_state(state)
}
