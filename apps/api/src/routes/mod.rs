pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::matching::handlers as matching;
use crate::profiles::handlers as profiles;
use crate::scheduling::handlers as scheduling;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profiles
        .route(
            "/api/v1/jobs",
            post(profiles::handle_create_job).get(profiles::handle_list_jobs),
        )
        .route("/api/v1/jobs/:id", get(profiles::handle_get_job))
        .route(
            "/api/v1/candidates",
            post(profiles::handle_create_candidate).get(profiles::handle_list_candidates),
        )
        .route(
            "/api/v1/candidates/upload",
            post(profiles::handle_upload_candidate),
        )
        .route("/api/v1/candidates/:id", get(profiles::handle_get_candidate))
        // Matching
        .route(
            "/api/v1/matches",
            post(matching::handle_compute_match).get(matching::handle_list_matches),
        )
        .route(
            "/api/v1/matches/:job_id/:candidate_id",
            get(matching::handle_get_match),
        )
        .route(
            "/api/v1/jobs/:id/matches",
            get(matching::handle_list_job_matches).post(matching::handle_match_job_against_all),
        )
        .route(
            "/api/v1/jobs/:id/match-stats",
            get(matching::handle_job_match_stats),
        )
        .route(
            "/api/v1/candidates/:id/matches",
            get(matching::handle_list_candidate_matches),
        )
        // Interviews
        .route(
            "/api/v1/interviews",
            post(scheduling::handle_schedule_interview),
        )
        .route(
            "/api/v1/interview-slots",
            get(scheduling::handle_list_interview_slots),
        )
        .route(
            "/api/v1/interviews/:id",
            patch(scheduling::handle_update_interview),
        )
        .route(
            "/api/v1/jobs/:id/interviews",
            get(scheduling::handle_list_job_interviews),
        )
        .route(
            "/api/v1/candidates/:id/interviews",
            get(scheduling::handle_list_candidate_interviews),
        )
        .with_state(state)
}
