//! InterviewScheduler: turns a qualifying `MatchResult` into a Pending
//! invitation with proposed slots. Produces the initial state only; later
//! transitions belong to the API layer.

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::config::SchedulingConfig;
use crate::errors::AppError;
use crate::models::interview::{
    InterviewInvitation, InterviewSlot, InterviewStatus, InterviewWindow,
};
use crate::models::matching::MatchResult;
use crate::scheduling::slots::{generate_slots, BusinessHours};

const MIN_DURATION_MINUTES: u32 = 15;
const MAX_DURATION_MINUTES: u32 = 480;
/// Upper bound (exclusive) on `n_slots` for open slot listings.
const MAX_UPCOMING_SLOTS: usize = 10;
/// Fourteen days always hold ten weekdays.
const UPCOMING_HORIZON_DAYS: i64 = 14;

/// Names used to render the invitation message.
#[derive(Debug, Clone, Copy)]
pub struct InvitationContext<'a> {
    pub candidate_name: &'a str,
    pub job_title: &'a str,
    pub company: &'a str,
}

pub struct InterviewScheduler {
    config: SchedulingConfig,
}

impl InterviewScheduler {
    pub fn new(config: SchedulingConfig) -> Self {
        Self { config }
    }

    pub fn propose(
        &self,
        job_id: Uuid,
        candidate_id: Uuid,
        from_result: &MatchResult,
        window: InterviewWindow,
        context: InvitationContext<'_>,
    ) -> Result<InterviewInvitation, AppError> {
        if from_result.job_id != job_id || from_result.candidate_id != candidate_id {
            return Err(AppError::InvalidInput(
                "match result does not belong to the requested job and candidate".to_string(),
            ));
        }
        if from_result.score < self.config.score_threshold {
            return Err(AppError::BelowThreshold {
                score: from_result.score,
                threshold: self.config.score_threshold,
            });
        }
        validate_window(&window)?;

        let hours = BusinessHours {
            start_hour: self.config.day_start_hour,
            end_hour: self.config.day_end_hour,
        };
        let slots = generate_slots(&window, hours, self.config.max_slots);
        let Some(first) = slots.first() else {
            return Err(AppError::InvalidInput(
                "window contains no weekday business-hour slot".to_string(),
            ));
        };

        let link = meeting_link(&self.config.meeting_base_url, job_id, candidate_id, first);
        let message = invitation_message(&context, window.duration_minutes, &slots, &link);

        Ok(InterviewInvitation {
            id: Uuid::new_v4(),
            job_id,
            candidate_id,
            slots,
            status: InterviewStatus::Pending,
            confirmed_slot: None,
            meeting_link: link,
            message,
            notes: None,
            created_at: Utc::now(),
        })
    }

    /// The first `n_slots` weekday business-hour slots starting tomorrow
    /// (UTC), independent of any match.
    pub fn upcoming_slots(
        &self,
        now: DateTime<Utc>,
        n_slots: usize,
        duration_minutes: u32,
    ) -> Result<Vec<InterviewSlot>, AppError> {
        if n_slots == 0 || n_slots >= MAX_UPCOMING_SLOTS {
            return Err(AppError::InvalidInput(format!(
                "n_slots must be between 1 and {}",
                MAX_UPCOMING_SLOTS - 1
            )));
        }
        let tomorrow = now
            .date_naive()
            .succ_opt()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or_else(|| AppError::InvalidInput("date out of range".to_string()))?;
        let window = InterviewWindow {
            earliest: tomorrow,
            latest: tomorrow + Duration::days(UPCOMING_HORIZON_DAYS),
            duration_minutes,
        };
        validate_window(&window)?;

        let hours = BusinessHours {
            start_hour: self.config.day_start_hour,
            end_hour: self.config.day_end_hour,
        };
        Ok(generate_slots(&window, hours, n_slots))
    }
}

fn validate_window(window: &InterviewWindow) -> Result<(), AppError> {
    if window.latest <= window.earliest {
        return Err(AppError::InvalidInput(
            "window.latest must be after window.earliest".to_string(),
        ));
    }
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&window.duration_minutes) {
        return Err(AppError::InvalidInput(format!(
            "duration must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES} minutes"
        )));
    }
    if window.earliest + window.duration() > window.latest {
        return Err(AppError::InvalidInput(
            "duration does not fit inside the window".to_string(),
        ));
    }
    Ok(())
}

fn meeting_link(base: &str, job_id: Uuid, candidate_id: Uuid, first: &InterviewSlot) -> String {
    format!(
        "{}/{}-{}-{}",
        base.trim_end_matches('/'),
        job_id,
        candidate_id,
        first.start.format("%Y%m%d%H%M")
    )
}

fn invitation_message(
    context: &InvitationContext<'_>,
    duration_minutes: u32,
    slots: &[InterviewSlot],
    meeting_link: &str,
) -> String {
    let team = if context.company.trim().is_empty() {
        "The Hiring Team".to_string()
    } else {
        format!("The {} Hiring Team", context.company)
    };
    let position = if context.company.trim().is_empty() {
        format!("the {} position", context.job_title)
    } else {
        format!("the {} position at {}", context.job_title, context.company)
    };
    let options = slots
        .iter()
        .map(|s| format!("- {}", s.display()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Dear {name},\n\n\
         Thank you for applying for {position}. We would like to invite you to a \
         {duration_minutes}-minute interview. Please reply with the time that suits you best:\n\n\
         {options}\n\n\
         Meeting link: {meeting_link}\n\n\
         Best regards,\n{team}",
        name = context.candidate_name,
    )
}
