use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::interview::{InterviewInvitation, InterviewRow, InterviewStatus};

const SELECT_COLUMNS: &str = "SELECT id, job_id, candidate_id, slots, status, confirmed_slot, \
     meeting_link, message, notes, created_at FROM interviews";

pub async fn insert_invitation(
    pool: &PgPool,
    invitation: &InterviewInvitation,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO interviews
            (id, job_id, candidate_id, slots, status, confirmed_slot,
             meeting_link, message, notes, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(invitation.id)
    .bind(invitation.job_id)
    .bind(invitation.candidate_id)
    .bind(Json(&invitation.slots))
    .bind(invitation.status.as_str())
    .bind(invitation.confirmed_slot.as_ref().map(Json))
    .bind(&invitation.meeting_link)
    .bind(&invitation.message)
    .bind(&invitation.notes)
    .bind(invitation.created_at)
    .execute(pool)
    .await?;

    info!(
        interview_id = %invitation.id,
        job_id = %invitation.job_id,
        candidate_id = %invitation.candidate_id,
        slots = invitation.slots.len(),
        "Interview invitation stored"
    );
    Ok(())
}

pub async fn get_invitation(pool: &PgPool, id: Uuid) -> Result<InterviewInvitation, AppError> {
    let row: InterviewRow = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;

    Ok(InterviewInvitation::try_from(row)?)
}

pub async fn list_for_job(
    pool: &PgPool,
    job_id: Uuid,
) -> Result<Vec<InterviewInvitation>, AppError> {
    list_where(pool, "job_id", job_id).await
}

pub async fn list_for_candidate(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Vec<InterviewInvitation>, AppError> {
    list_where(pool, "candidate_id", candidate_id).await
}

async fn list_where(
    pool: &PgPool,
    column: &'static str,
    id: Uuid,
) -> Result<Vec<InterviewInvitation>, AppError> {
    let rows: Vec<InterviewRow> = sqlx::query_as(&format!(
        "{SELECT_COLUMNS} WHERE {column} = $1 ORDER BY created_at DESC, id"
    ))
    .bind(id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| InterviewInvitation::try_from(row).map_err(AppError::from))
        .collect()
}

/// Persists a transition (status, confirmed slot, notes) already applied to
/// `invitation`, but only if the stored status is still `previous`.
pub async fn save_transition(
    pool: &PgPool,
    invitation: &InterviewInvitation,
    previous: InterviewStatus,
) -> Result<(), AppError> {
    let updated = sqlx::query(
        "UPDATE interviews SET status = $1, confirmed_slot = $2, notes = $3 \
         WHERE id = $4 AND status = $5",
    )
    .bind(invitation.status.as_str())
    .bind(invitation.confirmed_slot.as_ref().map(Json))
    .bind(&invitation.notes)
    .bind(invitation.id)
    .bind(previous.as_str())
    .execute(pool)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(AppError::InvalidTransition(format!(
            "interview {} is no longer {previous}",
            invitation.id
        )));
    }

    info!(
        interview_id = %invitation.id,
        from = %previous,
        to = %invitation.status,
        "Interview status changed"
    );
    Ok(())
}
