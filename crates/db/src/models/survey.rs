//! The `surveys` row and its mapping to [`Survey`].
//!
//! Questions and branding are stored as JSONB; status is stored as its
//! `SCREAMING_SNAKE_CASE` name.

use sqlx::FromRow;
use surveys_core::branding::Branding;
use surveys_core::error::CoreError;
use surveys_core::question::Question;
use surveys_core::status::SurveyStatus;
use surveys_core::survey::Survey;
use surveys_core::types::{SurveyId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `surveys` table.
#[derive(Debug, Clone, FromRow)]
pub struct SurveyRow {
    pub id: SurveyId,
    pub name: String,
    pub description: Option<String>,
    pub version: i32,
    pub status: String,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
    pub scheduled_open: Option<Timestamp>,
    pub scheduled_close: Option<Timestamp>,
    pub is_template: bool,
    pub admin_id: String,
    pub branding: Option<serde_json::Value>,
    pub previous_version_id: Option<SurveyId>,
    pub questions: serde_json::Value,
    pub revision: i64,
}

impl TryFrom<SurveyRow> for Survey {
    type Error = CoreError;

    fn try_from(row: SurveyRow) -> Result<Self, Self::Error> {
        let status: SurveyStatus = row.status.parse()?;
        let version = u32::try_from(row.version).map_err(|_| CoreError::Parse {
            field: "version",
            value: row.version.to_string(),
            reason: "must not be negative".to_string(),
        })?;
        let branding = row
            .branding
            .map(serde_json::from_value::<Branding>)
            .transpose()
            .map_err(|e| corrupt_column(row.id, "branding", e))?;
        let questions: Vec<Question> = serde_json::from_value(row.questions)
            .map_err(|e| corrupt_column(row.id, "questions", e))?;

        Ok(Survey {
            id: row.id,
            name: row.name,
            description: row.description,
            version,
            status,
            created_at: row.created_at,
            modified_at: row.modified_at,
            scheduled_open: row.scheduled_open,
            scheduled_close: row.scheduled_close,
            is_template: row.is_template,
            admin_id: row.admin_id,
            branding,
            previous_version_id: row.previous_version_id,
            questions,
            revision: row.revision,
        })
    }
}

fn corrupt_column(id: SurveyId, column: &str, err: serde_json::Error) -> CoreError {
    CoreError::Storage(format!("Survey {id} has an unreadable {column} column: {err}"))
}

// ---------------------------------------------------------------------------
// Write values
// ---------------------------------------------------------------------------

/// Column values bound by inserts and updates.
#[derive(Debug, Clone)]
pub struct SurveyValues {
    pub version: i32,
    pub status: &'static str,
    pub branding: Option<serde_json::Value>,
    pub questions: serde_json::Value,
}

impl TryFrom<&Survey> for SurveyValues {
    type Error = CoreError;

    fn try_from(survey: &Survey) -> Result<Self, Self::Error> {
        let version = i32::try_from(survey.version).map_err(|_| {
            CoreError::Validation(format!("Version {} is too large", survey.version))
        })?;
        let branding = survey
            .branding
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| CoreError::Storage(format!("Failed to encode branding: {e}")))?;
        let questions = serde_json::to_value(&survey.questions)
            .map_err(|e| CoreError::Storage(format!("Failed to encode questions: {e}")))?;

        Ok(Self {
            version,
            status: survey.status.as_str(),
            branding,
            questions,
        })
    }
}
