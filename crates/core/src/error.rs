use crate::status::SurveyStatus;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid {field} '{value}': {reason}")]
    Parse {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: SurveyStatus, to: SurveyStatus },

    #[error("Survey {id} is {status} and can no longer be edited")]
    NotEditable { id: String, status: SurveyStatus },

    #[error("Survey {id} is not accepting responses (status {status})")]
    NotAcceptingResponses { id: String, status: SurveyStatus },

    #[error("Version chain is corrupt at survey {id}")]
    CorruptChain { id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl CoreError {
    /// Shorthand for a missing survey.
    pub fn survey_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "Survey",
            id: id.to_string(),
        }
    }

    /// Shorthand for a missing question inside a survey.
    pub fn question_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "Question",
            id: id.to_string(),
        }
    }
}
