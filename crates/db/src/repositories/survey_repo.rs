//! Repository for the `surveys` table.

use sqlx::PgPool;
use surveys_core::status::SurveyStatus;
use surveys_core::survey::Survey;
use surveys_core::types::SurveyId;

use crate::models::survey::{SurveyRow, SurveyValues};

/// Column list for surveys queries.
const COLUMNS: &str = "id, name, description, version, status, created_at, modified_at, \
    scheduled_open, scheduled_close, is_template, admin_id, branding, \
    previous_version_id, questions, revision";

/// Stable ordering for every list query.
const ORDER: &str = "ORDER BY created_at ASC, id ASC";

/// Provides query operations for surveys.
pub struct SurveyRepo;

impl SurveyRepo {
    /// Insert a fully formed survey, returning the stored row.
    pub async fn insert(
        pool: &PgPool,
        survey: &Survey,
        values: &SurveyValues,
    ) -> Result<SurveyRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO surveys
                (id, name, description, version, status, created_at, modified_at,
                 scheduled_open, scheduled_close, is_template, admin_id, branding,
                 previous_version_id, questions, revision)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SurveyRow>(&query)
            .bind(survey.id)
            .bind(&survey.name)
            .bind(&survey.description)
            .bind(values.version)
            .bind(values.status)
            .bind(survey.created_at)
            .bind(survey.modified_at)
            .bind(survey.scheduled_open)
            .bind(survey.scheduled_close)
            .bind(survey.is_template)
            .bind(&survey.admin_id)
            .bind(&values.branding)
            .bind(survey.previous_version_id)
            .bind(&values.questions)
            .bind(survey.revision)
            .fetch_one(pool)
            .await
    }

    /// Find a survey by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: SurveyId) -> Result<Option<SurveyRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys WHERE id = $1");
        sqlx::query_as::<_, SurveyRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite a survey if its stored revision still equals `survey.revision`.
    ///
    /// Bumps the revision. Returns `None` when no row matched, either because
    /// the survey is gone or because another writer got there first.
    pub async fn update_if_revision(
        pool: &PgPool,
        survey: &Survey,
        values: &SurveyValues,
    ) -> Result<Option<SurveyRow>, sqlx::Error> {
        let query = format!(
            "UPDATE surveys SET
                name = $3,
                description = $4,
                version = $5,
                status = $6,
                created_at = $7,
                modified_at = $8,
                scheduled_open = $9,
                scheduled_close = $10,
                is_template = $11,
                admin_id = $12,
                branding = $13,
                previous_version_id = $14,
                questions = $15,
                revision = revision + 1
             WHERE id = $1 AND revision = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SurveyRow>(&query)
            .bind(survey.id)
            .bind(survey.revision)
            .bind(&survey.name)
            .bind(&survey.description)
            .bind(values.version)
            .bind(values.status)
            .bind(survey.created_at)
            .bind(survey.modified_at)
            .bind(survey.scheduled_open)
            .bind(survey.scheduled_close)
            .bind(survey.is_template)
            .bind(&survey.admin_id)
            .bind(&values.branding)
            .bind(survey.previous_version_id)
            .bind(&values.questions)
            .fetch_optional(pool)
            .await
    }

    /// Delete a survey by ID.
    ///
    /// Returns `true` if a row was deleted, `false` if not found.
    pub async fn delete(pool: &PgPool, id: SurveyId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM surveys WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &PgPool, id: SurveyId) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM surveys WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// List all surveys, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<SurveyRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys {ORDER}");
        sqlx::query_as::<_, SurveyRow>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_status(
        pool: &PgPool,
        status: SurveyStatus,
    ) -> Result<Vec<SurveyRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys WHERE status = $1 {ORDER}");
        sqlx::query_as::<_, SurveyRow>(&query)
            .bind(status.as_str())
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_template_flag(
        pool: &PgPool,
        is_template: bool,
    ) -> Result<Vec<SurveyRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys WHERE is_template = $1 {ORDER}");
        sqlx::query_as::<_, SurveyRow>(&query)
            .bind(is_template)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_admin(
        pool: &PgPool,
        admin_id: &str,
    ) -> Result<Vec<SurveyRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys WHERE admin_id = $1 {ORDER}");
        sqlx::query_as::<_, SurveyRow>(&query)
            .bind(admin_id)
            .fetch_all(pool)
            .await
    }

    /// Case-insensitive substring match on the name.
    ///
    /// `%`, `_` and `\` in `text` match literally.
    pub async fn search_by_name(
        pool: &PgPool,
        text: &str,
    ) -> Result<Vec<SurveyRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM surveys
             WHERE name ILIKE '%' || $1 || '%' ESCAPE '\\'
             {ORDER}"
        );
        sqlx::query_as::<_, SurveyRow>(&query)
            .bind(escape_like(text))
            .fetch_all(pool)
            .await
    }
}

/// Escape LIKE wildcards so `text` is matched verbatim.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
