//! The survey aggregate, its input DTOs, and aggregate-level validation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::branding::{validate_branding, Branding};
use crate::error::CoreError;
use crate::question::{validate_question, Question, QuestionDraft};
use crate::schedule::validate_window;
use crate::status::SurveyStatus;
use crate::types::{ActorId, SurveyId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum allowed length for a survey name.
pub const MAX_SURVEY_NAME_LENGTH: usize = 200;

/// Maximum allowed length for a survey description.
pub const MAX_SURVEY_DESCRIPTION_LENGTH: usize = 5000;

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// A survey with its embedded questions and branding, persisted as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub id: SurveyId,
    pub name: String,
    pub description: Option<String>,
    /// Informational version number, starts at 1.
    pub version: u32,
    pub status: SurveyStatus,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
    pub scheduled_open: Option<Timestamp>,
    pub scheduled_close: Option<Timestamp>,
    pub is_template: bool,
    pub admin_id: ActorId,
    pub branding: Option<Branding>,
    pub previous_version_id: Option<SurveyId>,
    pub questions: Vec<Question>,
    /// Store-managed write counter for optimistic concurrency.
    pub revision: i64,
}

impl Survey {
    /// Fail with [`CoreError::NotEditable`] unless the survey is still `CREATED`.
    pub fn ensure_editable(&self) -> Result<(), CoreError> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(CoreError::NotEditable {
                id: self.id.to_string(),
                status: self.status,
            })
        }
    }
}

/// A survey that has not been stored yet. The store assigns `id` and
/// `revision` on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSurvey {
    pub name: String,
    pub description: Option<String>,
    pub version: u32,
    pub status: SurveyStatus,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
    pub scheduled_open: Option<Timestamp>,
    pub scheduled_close: Option<Timestamp>,
    pub is_template: bool,
    pub admin_id: ActorId,
    pub branding: Option<Branding>,
    pub previous_version_id: Option<SurveyId>,
    pub questions: Vec<Question>,
}

impl NewSurvey {
    /// A blank `CREATED` survey at version 1 owned by `admin_id`.
    pub fn blank(name: String, admin_id: ActorId, now: Timestamp) -> Self {
        Self {
            name,
            description: None,
            version: 1,
            status: SurveyStatus::Created,
            created_at: now,
            modified_at: now,
            scheduled_open: None,
            scheduled_close: None,
            is_template: false,
            admin_id,
            branding: None,
            previous_version_id: None,
            questions: Vec::new(),
        }
    }

    /// Materialize the stored form under a store-assigned id.
    pub fn into_survey(self, id: SurveyId) -> Survey {
        Survey {
            id,
            name: self.name,
            description: self.description,
            version: self.version,
            status: self.status,
            created_at: self.created_at,
            modified_at: self.modified_at,
            scheduled_open: self.scheduled_open,
            scheduled_close: self.scheduled_close,
            is_template: self.is_template,
            admin_id: self.admin_id,
            branding: self.branding,
            previous_version_id: self.previous_version_id,
            questions: self.questions,
            revision: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Input DTOs
// ---------------------------------------------------------------------------

/// Input for creating a survey. Ownership, status, and timestamps are set by
/// the lifecycle manager, never by the caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSurvey {
    pub name: String,
    pub description: Option<String>,
    pub scheduled_open: Option<Timestamp>,
    pub scheduled_close: Option<Timestamp>,
    pub branding: Option<Branding>,
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
}

/// Full replacement of a survey's descriptive content.
///
/// Identity, ownership, status, creation time, and the version-chain link
/// are not part of the replacement and survive an update unchanged.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyReplacement {
    pub name: String,
    pub description: Option<String>,
    pub version: u32,
    #[serde(default)]
    pub is_template: bool,
    pub scheduled_open: Option<Timestamp>,
    pub scheduled_close: Option<Timestamp>,
    pub branding: Option<Branding>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl From<&Survey> for SurveyReplacement {
    fn from(survey: &Survey) -> Self {
        Self {
            name: survey.name.clone(),
            description: survey.description.clone(),
            version: survey.version,
            is_template: survey.is_template,
            scheduled_open: survey.scheduled_open,
            scheduled_close: survey.scheduled_close,
            branding: survey.branding.clone(),
            questions: survey.questions.clone(),
        }
    }
}

/// Listing filter. `status` takes precedence over `is_template`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilter {
    pub status: Option<SurveyStatus>,
    pub is_template: Option<bool>,
}

/// Search criteria, AND-combined when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    /// Case-insensitive substring of the survey name.
    pub name: Option<String>,
    /// Exact owning actor id.
    pub admin_id: Option<ActorId>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a survey name: non-blank and within [`MAX_SURVEY_NAME_LENGTH`].
pub fn validate_survey_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Survey name must not be empty".to_string(),
        ));
    }
    let length = name.chars().count();
    if length > MAX_SURVEY_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Survey name must not exceed {MAX_SURVEY_NAME_LENGTH} characters, got {length}"
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), CoreError> {
    match description {
        Some(d) if d.chars().count() > MAX_SURVEY_DESCRIPTION_LENGTH => {
            Err(CoreError::Validation(format!(
                "Survey description must not exceed {MAX_SURVEY_DESCRIPTION_LENGTH} characters, got {}",
                d.chars().count()
            )))
        }
        _ => Ok(()),
    }
}

/// Validate creation input (questions are validated as they are inserted).
pub fn validate_create(input: &CreateSurvey) -> Result<(), CoreError> {
    validate_survey_name(&input.name)?;
    validate_description(input.description.as_deref())?;
    validate_window(input.scheduled_open, input.scheduled_close)?;
    if let Some(branding) = &input.branding {
        validate_branding(branding)?;
    }
    Ok(())
}

/// Validate a full replacement, including the supplied question list.
pub fn validate_replacement(input: &SurveyReplacement) -> Result<(), CoreError> {
    validate_survey_name(&input.name)?;
    validate_description(input.description.as_deref())?;
    if input.version == 0 {
        return Err(CoreError::Validation(
            "Survey version must be positive".to_string(),
        ));
    }
    validate_window(input.scheduled_open, input.scheduled_close)?;
    if let Some(branding) = &input.branding {
        validate_branding(branding)?;
    }
    validate_question_list(&input.questions)
}

/// Validate a stored-form question list: content, unique ids, and unique
/// positive orders.
pub fn validate_question_list(questions: &[Question]) -> Result<(), CoreError> {
    let mut ids = HashSet::new();
    let mut orders = HashSet::new();
    for question in questions {
        validate_question(&QuestionDraft {
            id: Some(question.id),
            text: question.text.clone(),
            kind: question.kind.clone(),
            required: question.required,
        })?;
        if !ids.insert(question.id) {
            return Err(CoreError::Validation(format!(
                "Duplicate question id {}",
                question.id
            )));
        }
        if question.order == 0 || !orders.insert(question.order) {
            return Err(CoreError::Validation(format!(
                "Question {} has an invalid or duplicate order {}",
                question.id, question.order
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::QuestionKind;
    use crate::types::new_id;
    use chrono::{Duration, Utc};

    fn question(order: u32) -> Question {
        Question {
            id: new_id(),
            text: format!("Question {order}"),
            kind: QuestionKind::Rating { min: 1, max: 5 },
            required: false,
            order,
        }
    }

    fn replacement() -> SurveyReplacement {
        SurveyReplacement {
            name: "CSAT".to_string(),
            description: None,
            version: 1,
            is_template: false,
            scheduled_open: None,
            scheduled_close: None,
            branding: None,
            questions: vec![question(1), question(2)],
        }
    }

    #[test]
    fn blank_new_survey_defaults() {
        let now = Utc::now();
        let new = NewSurvey::blank("CSAT".into(), "admin1".into(), now);
        assert_eq!(new.version, 1);
        assert_eq!(new.status, SurveyStatus::Created);
        assert!(!new.is_template);
        assert!(new.questions.is_empty());

        let id = new_id();
        let survey = new.into_survey(id);
        assert_eq!(survey.id, id);
        assert_eq!(survey.revision, 1);
        assert_eq!(survey.created_at, now);
    }

    #[test]
    fn ensure_editable_rejects_published() {
        let mut survey = NewSurvey::blank("CSAT".into(), "a".into(), Utc::now()).into_survey(new_id());
        assert!(survey.ensure_editable().is_ok());
        survey.status = SurveyStatus::Published;
        assert!(matches!(
            survey.ensure_editable(),
            Err(CoreError::NotEditable {
                status: SurveyStatus::Published,
                ..
            })
        ));
    }

    #[test]
    fn name_rules() {
        assert!(validate_survey_name("CSAT").is_ok());
        assert!(validate_survey_name("  ").is_err());
        assert!(validate_survey_name(&"n".repeat(MAX_SURVEY_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn name_limit_counts_characters() {
        // 200 two-byte characters: 400 bytes but within the limit.
        let name = "é".repeat(MAX_SURVEY_NAME_LENGTH);
        assert!(validate_survey_name(&name).is_ok());
        assert!(validate_survey_name(&format!("{name}é")).is_err());
    }

    #[test]
    fn description_limit_counts_characters() {
        let description = "ü".repeat(MAX_SURVEY_DESCRIPTION_LENGTH);
        assert!(validate_description(Some(&description)).is_ok());
        assert!(validate_description(Some(&format!("{description}ü"))).is_err());
    }

    #[test]
    fn create_rejects_inverted_window() {
        let now = Utc::now();
        let input = CreateSurvey {
            name: "CSAT".into(),
            scheduled_open: Some(now),
            scheduled_close: Some(now - Duration::hours(1)),
            ..Default::default()
        };
        assert!(validate_create(&input).is_err());
    }

    #[test]
    fn valid_replacement_passes() {
        assert!(validate_replacement(&replacement()).is_ok());
    }

    #[test]
    fn replacement_rejects_zero_version() {
        let mut input = replacement();
        input.version = 0;
        assert!(validate_replacement(&input).is_err());
    }

    #[test]
    fn replacement_rejects_duplicate_question_ids() {
        let mut input = replacement();
        let mut dup = input.questions[0].clone();
        dup.order = 3;
        input.questions.push(dup);
        assert!(validate_replacement(&input).is_err());
    }

    #[test]
    fn replacement_rejects_duplicate_orders() {
        let mut input = replacement();
        input.questions[1].order = 1;
        assert!(validate_replacement(&input).is_err());
    }

    #[test]
    fn replacement_round_trips_from_survey() {
        let survey = NewSurvey::blank("CSAT".into(), "a".into(), Utc::now()).into_survey(new_id());
        let input = SurveyReplacement::from(&survey);
        assert_eq!(input.name, survey.name);
        assert_eq!(input.version, survey.version);
    }
}
