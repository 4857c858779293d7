//! Scheduling windows and the scheduled-close evaluator.
//!
//! Closing is lazy: a published survey whose close time has passed is moved
//! to `CLOSED` the next time any read path evaluates it. The lifecycle
//! facade persists that transition immediately.

use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::status::SurveyStatus;
use crate::survey::Survey;
use crate::types::Timestamp;

/// Parse an RFC 3339 instant (e.g. `2026-03-01T09:00:00Z`) into UTC.
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<Timestamp, CoreError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::Parse {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// When both ends are set the window must open strictly before it closes.
pub fn validate_window(
    open: Option<Timestamp>,
    close: Option<Timestamp>,
) -> Result<(), CoreError> {
    match (open, close) {
        (Some(open), Some(close)) if open >= close => Err(CoreError::Validation(format!(
            "Scheduled open ({open}) must be before scheduled close ({close})"
        ))),
        _ => Ok(()),
    }
}

/// `true` when a published survey's close time lies strictly before `now`.
pub fn is_past_close(survey: &Survey, now: Timestamp) -> bool {
    survey.status == SurveyStatus::Published
        && survey.scheduled_close.is_some_and(|close| now > close)
}

/// Close the survey if its scheduled close has passed.
///
/// Returns `true` when the survey changed and must be persisted. Already
/// closed surveys are left alone.
pub fn apply_scheduled_close(survey: &mut Survey, now: Timestamp) -> Result<bool, CoreError> {
    if !is_past_close(survey, now) {
        return Ok(false);
    }
    survey.status.validate_transition(SurveyStatus::Closed)?;
    survey.status = SurveyStatus::Closed;
    survey.modified_at = now;
    Ok(true)
}

/// Published, inside its window, and not yet past close.
pub fn is_open_for_responses(survey: &Survey, now: Timestamp) -> bool {
    survey.status.can_receive_responses()
        && !is_past_close(survey, now)
        && survey.scheduled_open.is_none_or(|open| open <= now)
}
