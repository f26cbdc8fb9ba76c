//! Axum route handlers for the Matching API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::stats::{job_match_stats, JobMatchStats};
use crate::models::matching::{MatchKey, MatchResult};
use crate::profiles::repository;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ComputeMatchRequest {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
}

/// POST /api/v1/matches
///
/// Computes (or recomputes) the match for one pair and stores it.
pub async fn handle_compute_match(
    State(state): State<AppState>,
    Json(request): Json<ComputeMatchRequest>,
) -> Result<Json<MatchResult>, AppError> {
    let job = repository::get_job(&state.db, request.job_id).await?;
    let candidate = repository::get_candidate(&state.db, request.candidate_id).await?;
    Ok(Json(state.pipeline.compute(&job, &candidate).await?))
}

/// POST /api/v1/jobs/:id/matches
///
/// Matches the job against every stored candidate.
pub async fn handle_match_job_against_all(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<MatchResult>>, AppError> {
    let job = repository::get_job(&state.db, job_id).await?;
    let candidates = repository::list_candidates(&state.db).await?;
    Ok(Json(state.pipeline.compute_for_job(&job, candidates).await))
}

/// GET /api/v1/matches
pub async fn handle_list_matches(
    State(state): State<AppState>,
) -> Result<Json<Vec<MatchResult>>, AppError> {
    Ok(Json(state.pipeline.store().list().await?))
}

/// GET /api/v1/matches/:job_id/:candidate_id
pub async fn handle_get_match(
    State(state): State<AppState>,
    Path((job_id, candidate_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MatchResult>, AppError> {
    let key = MatchKey {
        job_id,
        candidate_id,
    };
    Ok(Json(state.pipeline.store().get(key).await?))
}

/// GET /api/v1/jobs/:id/matches
pub async fn handle_list_job_matches(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<MatchResult>>, AppError> {
    repository::get_job(&state.db, job_id).await?;
    Ok(Json(state.pipeline.store().list_for_job(job_id).await?))
}

/// GET /api/v1/candidates/:id/matches
pub async fn handle_list_candidate_matches(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<Vec<MatchResult>>, AppError> {
    repository::get_candidate(&state.db, candidate_id).await?;
    Ok(Json(
        state
            .pipeline
            .store()
            .list_for_candidate(candidate_id)
            .await?,
    ))
}

/// GET /api/v1/jobs/:id/match-stats
pub async fn handle_job_match_stats(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobMatchStats>, AppError> {
    let job = repository::get_job(&state.db, job_id).await?;
    let matches = state.pipeline.store().list_for_job(job_id).await?;
    let ids: Vec<Uuid> = matches.iter().map(|m| m.candidate_id).collect();
    let names = repository::candidate_names(&state.db, &ids).await?;
    Ok(Json(job_match_stats(&job, &matches, &names)))
}
