//! Job and candidate persistence. Profiles are immutable once written:
//! there is no UPDATE here on purpose.

use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{CandidateProfile, CandidateRow, JobProfile, JobRow};

const JOB_COLUMNS: &str =
    "SELECT id, title, company, raw_description, fields, extraction_quality, created_at FROM jobs";

const CANDIDATE_COLUMNS: &str = "SELECT id, name, email, phone, raw_resume, resume_key, fields, \
     extraction_quality, created_at FROM candidates";

pub async fn insert_job(pool: &PgPool, job: &JobProfile) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO jobs
            (id, title, company, raw_description, fields, extraction_quality, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(job.id)
    .bind(&job.title)
    .bind(&job.company)
    .bind(&job.raw_description)
    .bind(Json(&job.fields))
    .bind(job.extraction_quality.as_str())
    .bind(job.created_at)
    .execute(pool)
    .await?;

    info!(job_id = %job.id, quality = %job.extraction_quality, "Job profile stored");
    Ok(())
}

pub async fn get_job(pool: &PgPool, id: Uuid) -> Result<JobProfile, AppError> {
    let row: JobRow = sqlx::query_as(&format!("{JOB_COLUMNS} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;

    Ok(JobProfile::try_from(row)?)
}

/// Newest first.
pub async fn list_jobs(pool: &PgPool) -> Result<Vec<JobProfile>, AppError> {
    let rows: Vec<JobRow> =
        sqlx::query_as(&format!("{JOB_COLUMNS} ORDER BY created_at DESC, id"))
            .fetch_all(pool)
            .await?;

    rows.into_iter()
        .map(|row| JobProfile::try_from(row).map_err(AppError::from))
        .collect()
}

pub async fn insert_candidate(pool: &PgPool, candidate: &CandidateProfile) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO candidates
            (id, name, email, phone, raw_resume, resume_key, fields,
             extraction_quality, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(candidate.id)
    .bind(&candidate.name)
    .bind(&candidate.contact.email)
    .bind(&candidate.contact.phone)
    .bind(&candidate.raw_resume)
    .bind(&candidate.resume_key)
    .bind(Json(&candidate.fields))
    .bind(candidate.extraction_quality.as_str())
    .bind(candidate.created_at)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            info!(
                candidate_id = %candidate.id,
                quality = %candidate.extraction_quality,
                "Candidate profile stored"
            );
            Ok(())
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(duplicate_email(&candidate.contact.email))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn duplicate_email(email: &str) -> AppError {
    AppError::InvalidInput(format!("A candidate with email {email} already exists"))
}

pub async fn candidate_email_exists(pool: &PgPool, email: &str) -> Result<bool, AppError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM candidates WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

pub async fn get_candidate(pool: &PgPool, id: Uuid) -> Result<CandidateProfile, AppError> {
    let row: CandidateRow = sqlx::query_as(&format!("{CANDIDATE_COLUMNS} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;

    Ok(CandidateProfile::try_from(row)?)
}

/// Newest first.
pub async fn list_candidates(pool: &PgPool) -> Result<Vec<CandidateProfile>, AppError> {
    let rows: Vec<CandidateRow> =
        sqlx::query_as(&format!("{CANDIDATE_COLUMNS} ORDER BY created_at DESC, id"))
            .fetch_all(pool)
            .await?;

    rows.into_iter()
        .map(|row| CandidateProfile::try_from(row).map_err(AppError::from))
        .collect()
}

/// id → name for every candidate in `ids`.
pub async fn candidate_names(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, String>, AppError> {
    let rows: Vec<(Uuid, String)> =
        sqlx::query_as("SELECT id, name FROM candidates WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().collect())
}
