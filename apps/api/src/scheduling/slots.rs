//! Deterministic interview slot generation: same window, same slots.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc, Weekday};

use crate::models::interview::{InterviewSlot, InterviewWindow};

/// Business hours in UTC, `[start_hour, end_hour)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

/// Back-to-back slots of `window.duration_minutes`, Monday–Friday within
/// business hours, starting at `window.earliest` rounded up to the quarter
/// hour. Never ends past `window.latest`; at most `max_slots`.
pub fn generate_slots(
    window: &InterviewWindow,
    hours: BusinessHours,
    max_slots: usize,
) -> Vec<InterviewSlot> {
    let length = window.duration();
    let mut slots = Vec::new();
    let Some(mut cursor) = round_up_to_quarter(window.earliest) else {
        return slots;
    };

    while slots.len() < max_slots && cursor + length <= window.latest {
        let date = cursor.date_naive();
        let (Some(day_start), Some(day_end)) = (
            at_hour(date, hours.start_hour),
            at_hour(date, hours.end_hour),
        ) else {
            break;
        };

        if is_weekend(date.weekday()) || cursor + length > day_end {
            match date.succ_opt().and_then(|next| at_hour(next, hours.start_hour)) {
                Some(next) => cursor = next,
                None => break,
            }
            continue;
        }
        if cursor < day_start {
            cursor = day_start;
            continue;
        }

        slots.push(InterviewSlot {
            start: cursor,
            duration_minutes: window.duration_minutes,
        });
        cursor += length;
    }
    slots
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

fn at_hour(date: NaiveDate, hour: u32) -> Option<DateTime<Utc>> {
    // 24 is accepted as end-of-day.
    if hour == 24 {
        return date
            .succ_opt()
            .and_then(|next| next.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive));
    }
    date.and_hms_opt(hour, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn round_up_to_quarter(time: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let truncated = time.with_second(0)?.with_nanosecond(0)?;
    let truncated = if truncated < time {
        truncated + Duration::minutes(1)
    } else {
        truncated
    };
    let remainder = truncated.minute() % 15;
    if remainder == 0 {
        Some(truncated)
    } else {
        Some(truncated + Duration::minutes(i64::from(15 - remainder)))
    }
}
