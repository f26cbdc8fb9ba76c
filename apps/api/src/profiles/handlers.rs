//! Axum route handlers for jobs and candidates.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{CandidateProfile, JobProfile};
use crate::profiles::repository;
use crate::profiles::service::{self, NewCandidate, NewJob};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Jobs
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(request): Json<NewJob>,
) -> Result<(StatusCode, Json<JobProfile>), AppError> {
    let job = service::create_job(&state.db, &state.extractor, request).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobProfile>>, AppError> {
    Ok(Json(repository::list_jobs(&state.db).await?))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobProfile>, AppError> {
    Ok(Json(repository::get_job(&state.db, id).await?))
}

// ────────────────────────────────────────────────────────────────────────────
// Candidates
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/candidates
///
/// JSON intake with the résumé already as text.
pub async fn handle_create_candidate(
    State(state): State<AppState>,
    Json(request): Json<NewCandidate>,
) -> Result<(StatusCode, Json<CandidateProfile>), AppError> {
    let candidate = service::create_candidate(&state.db, &state.extractor, request).await?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

/// POST /api/v1/candidates/upload
///
/// Multipart intake: `name`, `email`, optional `phone`, and a `resume` file
/// (.txt or .pdf). The original file is archived once the profile has validated.
pub async fn handle_upload_candidate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CandidateProfile>), AppError> {
    let mut name = String::new();
    let mut email = String::new();
    let mut phone = None;
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "resume" => {
                let filename = field.file_name().unwrap_or("resume.txt").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::InvalidInput("Invalid resume file".to_string()))?;
                file = Some((filename, data));
            }
            "name" | "email" | "phone" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::InvalidInput(format!("Invalid {field_name} field")))?;
                match field_name.as_str() {
                    "name" => name = value,
                    "email" => email = value,
                    _ => phone = Some(value),
                }
            }
            _ => {}
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| AppError::InvalidInput("resume file is required".to_string()))?;

    let resume_text = service::decode_resume(&filename, bytes.clone()).await?;
    let request = NewCandidate {
        name,
        email,
        phone,
        resume_text,
    };
    let candidate = service::create_uploaded_candidate(
        &state.db,
        &state.resumes,
        &state.extractor,
        request,
        &filename,
        bytes,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

/// GET /api/v1/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
) -> Result<Json<Vec<CandidateProfile>>, AppError> {
    Ok(Json(repository::list_candidates(&state.db).await?))
}

/// GET /api/v1/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CandidateProfile>, AppError> {
    Ok(Json(repository::get_candidate(&state.db, id).await?))
}
