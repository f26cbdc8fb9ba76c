//! Axum route handlers for the Interview API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::interview::{InterviewInvitation, InterviewSlot, InterviewWindow};
use crate::models::matching::MatchKey;
use crate::profiles::repository as profiles;
use crate::scheduling::repository;
use crate::scheduling::scheduler::InvitationContext;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScheduleInterviewRequest {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u32,
}

fn default_duration_minutes() -> u32 {
    60
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    #[serde(default = "default_slot_count")]
    pub n_slots: usize,
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u32,
}

fn default_slot_count() -> usize {
    3
}

#[derive(Debug, Serialize)]
pub struct SlotView {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub display: String,
}

impl From<InterviewSlot> for SlotView {
    fn from(slot: InterviewSlot) -> Self {
        Self {
            start: slot.start,
            end: slot.end(),
            display: slot.display(),
        }
    }
}

/// `{"action": "confirm", "slot_index": 0}` or `{"action": "cancel"}`, each
/// with optional `"notes"`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InterviewTransition {
    Confirm {
        slot_index: usize,
        #[serde(default)]
        notes: Option<String>,
    },
    Cancel {
        #[serde(default)]
        notes: Option<String>,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Proposes slots for a stored match that clears the score threshold.
pub async fn handle_schedule_interview(
    State(state): State<AppState>,
    Json(request): Json<ScheduleInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewInvitation>), AppError> {
    let job = profiles::get_job(&state.db, request.job_id).await?;
    let candidate = profiles::get_candidate(&state.db, request.candidate_id).await?;
    let result = state
        .pipeline
        .store()
        .get(MatchKey {
            job_id: job.id,
            candidate_id: candidate.id,
        })
        .await?;

    let window = InterviewWindow {
        earliest: request.earliest,
        latest: request.latest,
        duration_minutes: request.duration_minutes,
    };
    let context = InvitationContext {
        candidate_name: &candidate.name,
        job_title: &job.title,
        company: &job.company,
    };
    let invitation = state
        .scheduler
        .propose(job.id, candidate.id, &result, window, context)?;

    repository::insert_invitation(&state.db, &invitation).await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

/// GET /api/v1/interview-slots?n_slots=3&duration_minutes=60
///
/// Open weekday slots from tomorrow on, for offering times outside an invitation.
pub async fn handle_list_interview_slots(
    State(state): State<AppState>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Vec<SlotView>>, AppError> {
    let slots = state
        .scheduler
        .upcoming_slots(Utc::now(), query.n_slots, query.duration_minutes)?;
    Ok(Json(slots.into_iter().map(SlotView::from).collect()))
}

/// GET /api/v1/jobs/:id/interviews
pub async fn handle_list_job_interviews(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<InterviewInvitation>>, AppError> {
    profiles::get_job(&state.db, job_id).await?;
    Ok(Json(repository::list_for_job(&state.db, job_id).await?))
}

/// GET /api/v1/candidates/:id/interviews
pub async fn handle_list_candidate_interviews(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<Vec<InterviewInvitation>>, AppError> {
    profiles::get_candidate(&state.db, candidate_id).await?;
    Ok(Json(
        repository::list_for_candidate(&state.db, candidate_id).await?,
    ))
}

/// PATCH /api/v1/interviews/:id
///
/// External transitions: Pending → Scheduled (confirm), Pending | Scheduled → Cancelled.
pub async fn handle_update_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(transition): Json<InterviewTransition>,
) -> Result<Json<InterviewInvitation>, AppError> {
    let mut invitation = repository::get_invitation(&state.db, id).await?;
    let previous = invitation.status;

    let notes = match transition {
        InterviewTransition::Confirm { slot_index, notes } => {
            invitation.confirm(slot_index).map(|_| notes)
        }
        InterviewTransition::Cancel { notes } => invitation.cancel().map(|_| notes),
    }
    .map_err(AppError::InvalidTransition)?;
    invitation.annotate(notes);

    repository::save_transition(&state.db, &invitation, previous).await?;
    Ok(Json(invitation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_body_shapes() {
        let confirm: InterviewTransition =
            serde_json::from_str(r#"{"action": "confirm", "slot_index": 2}"#).unwrap();
        assert!(matches!(
            confirm,
            InterviewTransition::Confirm {
                slot_index: 2,
                notes: None
            }
        ));

        let cancel: InterviewTransition = serde_json::from_str(r#"{"action": "cancel"}"#).unwrap();
        assert!(matches!(cancel, InterviewTransition::Cancel { notes: None }));

        assert!(serde_json::from_str::<InterviewTransition>(r#"{"action": "reopen"}"#).is_err());
    }

    #[test]
    fn test_transition_carries_notes() {
        let cancel: InterviewTransition = serde_json::from_str(
            r#"{"action": "cancel", "notes": "Candidate accepted another offer"}"#,
        )
        .unwrap();
        match cancel {
            InterviewTransition::Cancel { notes } => {
                assert_eq!(notes.as_deref(), Some("Candidate accepted another offer"))
            }
            other => panic!("unexpected transition {other:?}"),
        }
    }

    #[test]
    fn test_slots_query_defaults_and_view() {
        let query: SlotsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!((query.n_slots, query.duration_minutes), (3, 60));

        let start = "2025-03-03T09:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let view = SlotView::from(InterviewSlot {
            start,
            duration_minutes: 45,
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["end"], "2025-03-03T09:45:00Z");
        assert_eq!(json["display"], "Monday, March 03, 2025 at 09:00 AM UTC");
    }

    #[test]
    fn test_schedule_request_defaults_to_one_hour() {
        let request: ScheduleInterviewRequest = serde_json::from_str(&format!(
            r#"{{"job_id": "{0}", "candidate_id": "{0}",
                "earliest": "2025-03-03T09:00:00Z", "latest": "2025-03-07T17:00:00Z"}}"#,
            Uuid::nil()
        ))
        .unwrap();
        assert_eq!(request.duration_minutes, 60);
    }
}
