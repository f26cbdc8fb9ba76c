use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of an invitation. Only `Pending` is produced by the scheduler;
/// later transitions come from the API layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Pending,
    Scheduled,
    Cancelled,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::Pending => "pending",
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InterviewStatus::Pending),
            "scheduled" => Ok(InterviewStatus::Scheduled),
            "cancelled" => Ok(InterviewStatus::Cancelled),
            other => Err(format!("unknown interview status '{other}'")),
        }
    }
}

/// The requested scheduling range. All times are UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewWindow {
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
    pub duration_minutes: u32,
}

impl InterviewWindow {
    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewSlot {
    pub start: DateTime<Utc>,
    pub duration_minutes: u32,
}

impl InterviewSlot {
    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// e.g. "Monday, March 03, 2025 at 09:00 AM UTC"
    pub fn display(&self) -> String {
        self.start.format("%A, %B %d, %Y at %I:%M %p UTC").to_string()
    }
}

/// An interview proposal for a matched (job, candidate) pair.
/// References the match by key; does not own it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewInvitation {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub slots: Vec<InterviewSlot>,
    pub status: InterviewStatus,
    /// Set once the candidate confirms one of `slots`.
    pub confirmed_slot: Option<InterviewSlot>,
    pub meeting_link: String,
    pub message: String,
    /// Free-form recruiter notes, replaced on each transition that carries them.
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InterviewInvitation {
    /// Pending → Scheduled, pinning the chosen slot.
    pub fn confirm(&mut self, slot_index: usize) -> Result<(), String> {
        if self.status != InterviewStatus::Pending {
            return Err(format!(
                "cannot confirm an invitation that is {}",
                self.status
            ));
        }
        let slot = self.slots.get(slot_index).copied().ok_or_else(|| {
            format!(
                "slot index {slot_index} out of range ({} proposed)",
                self.slots.len()
            )
        })?;
        self.status = InterviewStatus::Scheduled;
        self.confirmed_slot = Some(slot);
        Ok(())
    }

    /// Pending | Scheduled → Cancelled.
    pub fn cancel(&mut self) -> Result<(), String> {
        if self.status == InterviewStatus::Cancelled {
            return Err("invitation is already cancelled".to_string());
        }
        self.status = InterviewStatus::Cancelled;
        Ok(())
    }

    /// Blank notes leave the existing ones in place.
    pub fn annotate(&mut self, notes: Option<String>) {
        if let Some(notes) = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            self.notes = Some(notes);
        }
    }
}

#[derive(Debug, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub slots: Json<Vec<InterviewSlot>>,
    pub status: String,
    pub confirmed_slot: Option<Json<InterviewSlot>>,
    pub meeting_link: String,
    pub message: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<InterviewRow> for InterviewInvitation {
    type Error = anyhow::Error;

    fn try_from(row: InterviewRow) -> Result<Self, Self::Error> {
        Ok(InterviewInvitation {
            id: row.id,
            job_id: row.job_id,
            candidate_id: row.candidate_id,
            slots: row.slots.0,
            status: row.status.parse().map_err(anyhow::Error::msg)?,
            confirmed_slot: row.confirmed_slot.map(|s| s.0),
            meeting_link: row.meeting_link,
            message: row.message,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn invitation() -> InterviewInvitation {
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
        InterviewInvitation {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            slots: vec![
                InterviewSlot {
                    start,
                    duration_minutes: 60,
                },
                InterviewSlot {
                    start: start + Duration::hours(1),
                    duration_minutes: 60,
                },
            ],
            status: InterviewStatus::Pending,
            confirmed_slot: None,
            meeting_link: "https://meet.example.com/x".to_string(),
            message: String::new(),
            notes: None,
            created_at: start,
        }
    }

    #[test]
    fn test_confirm_moves_pending_to_scheduled() {
        let mut inv = invitation();
        inv.confirm(1).unwrap();
        assert_eq!(inv.status, InterviewStatus::Scheduled);
        assert_eq!(inv.confirmed_slot, Some(inv.slots[1]));
    }

    #[test]
    fn test_confirm_rejects_out_of_range_slot() {
        let mut inv = invitation();
        assert!(inv.confirm(5).is_err());
        assert_eq!(inv.status, InterviewStatus::Pending);
    }

    #[test]
    fn test_cancel_after_schedule_is_allowed() {
        let mut inv = invitation();
        inv.confirm(0).unwrap();
        inv.cancel().unwrap();
        assert_eq!(inv.status, InterviewStatus::Cancelled);
    }

    #[test]
    fn test_cancelled_is_terminal() {
        let mut inv = invitation();
        inv.cancel().unwrap();
        assert!(inv.cancel().is_err());
        assert!(inv.confirm(0).is_err());
    }

    #[test]
    fn test_annotate_replaces_notes_but_ignores_blank() {
        let mut inv = invitation();
        inv.annotate(Some("  Prefers mornings ".to_string()));
        assert_eq!(inv.notes.as_deref(), Some("Prefers mornings"));

        inv.annotate(Some("   ".to_string()));
        inv.annotate(None);
        assert_eq!(inv.notes.as_deref(), Some("Prefers mornings"));

        inv.annotate(Some("Moved to panel round".to_string()));
        assert_eq!(inv.notes.as_deref(), Some("Moved to panel round"));
    }

    #[test]
    fn test_slot_end_and_display() {
        let slot = invitation().slots[0];
        assert_eq!(slot.end(), slot.start + Duration::minutes(60));
        assert_eq!(slot.display(), "Monday, March 03, 2025 at 09:00 AM UTC");
    }
}
