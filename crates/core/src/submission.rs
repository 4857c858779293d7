//! Acceptance checks for a submitted survey response.
//!
//! Responses are not stored here; this module only decides whether a
//! response may be accepted against the survey's effective state.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::question::{Question, QuestionKind};
use crate::schedule::is_open_for_responses;
use crate::survey::Survey;
use crate::types::{QuestionId, SurveyId, Timestamp};

/// The value given for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    Choices(Vec<String>),
    Rating(i32),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: QuestionId,
    pub answer: AnswerValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSubmission {
    pub survey_id: SurveyId,
    pub answers: Vec<Answer>,
}

/// Validate a submission against a survey at time `now`.
pub fn validate_submission(
    survey: &Survey,
    submission: &ResponseSubmission,
    now: Timestamp,
) -> Result<(), CoreError> {
    if submission.survey_id != survey.id {
        return Err(CoreError::Validation(format!(
            "Response targets survey {} but was submitted to {}",
            submission.survey_id, survey.id
        )));
    }

    if !is_open_for_responses(survey, now) {
        return Err(CoreError::NotAcceptingResponses {
            id: survey.id.to_string(),
            status: survey.status,
        });
    }

    if submission.answers.is_empty() {
        return Err(CoreError::Validation(
            "At least one answer is required".to_string(),
        ));
    }

    let mut answered = HashSet::new();
    for answer in &submission.answers {
        let question = survey
            .questions
            .iter()
            .find(|q| q.id == answer.question_id)
            .ok_or_else(|| CoreError::question_not_found(answer.question_id))?;
        if !answered.insert(answer.question_id) {
            return Err(CoreError::Validation(format!(
                "Question {} was answered more than once",
                answer.question_id
            )));
        }
        validate_answer(question, &answer.answer)?;
    }

    if let Some(missing) = survey
        .questions
        .iter()
        .find(|q| q.required && !answered.contains(&q.id))
    {
        return Err(CoreError::Validation(format!(
            "Required question {} ('{}') was not answered",
            missing.id, missing.text
        )));
    }

    Ok(())
}

/// Check that an answer has the shape its question's kind expects.
fn validate_answer(question: &Question, answer: &AnswerValue) -> Result<(), CoreError> {
    let mismatch = || {
        CoreError::Validation(format!(
            "Answer for question {} does not match its {} kind",
            question.id,
            question.kind.tag()
        ))
    };

    match (&question.kind, answer) {
        (
            QuestionKind::MultipleChoice {
                options,
                allow_multiple,
            },
            AnswerValue::Choices(choices),
        ) => {
            if choices.is_empty() {
                return Err(CoreError::Validation(format!(
                    "Answer for question {} selects no option",
                    question.id
                )));
            }
            if !allow_multiple && choices.len() > 1 {
                return Err(CoreError::Validation(format!(
                    "Question {} accepts a single option",
                    question.id
                )));
            }
            if let Some(unknown) = choices.iter().find(|c| !options.contains(*c)) {
                return Err(CoreError::Validation(format!(
                    "'{unknown}' is not an option of question {}",
                    question.id
                )));
            }
            Ok(())
        }
        (QuestionKind::Rating { min, max }, AnswerValue::Rating(value)) => {
            if (*min..=*max).contains(value) {
                Ok(())
            } else {
                Err(CoreError::Validation(format!(
                    "Rating {value} for question {} is outside {min}..={max}",
                    question.id
                )))
            }
        }
        (QuestionKind::Text { max_length }, AnswerValue::Text(text)) => match max_length {
            Some(max) if text.chars().count() > *max as usize => {
                Err(CoreError::Validation(format!(
                    "Answer for question {} exceeds {max} characters",
                    question.id
                )))
            }
            _ => Ok(()),
        },
        _ => Err(mismatch()),
    }
}
