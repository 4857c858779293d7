//! [`SurveyStore`] backed by PostgreSQL.

use surveys_core::error::CoreError;
use surveys_core::status::SurveyStatus;
use surveys_core::store::SurveyStore;
use surveys_core::survey::{NewSurvey, Survey};
use surveys_core::types::{new_id, SurveyId};

use crate::models::survey::{SurveyRow, SurveyValues};
use crate::repositories::SurveyRepo;
use crate::DbPool;

/// Survey store over a shared connection pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PgSurveyStore {
    pool: DbPool,
}

impl PgSurveyStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Log a database failure and surface it as a storage error.
fn storage(operation: &'static str) -> impl FnOnce(sqlx::Error) -> CoreError {
    move |e| {
        tracing::error!(error = %e, operation, "Survey store query failed");
        CoreError::Storage(format!("{operation}: {e}"))
    }
}

fn into_surveys(rows: Vec<SurveyRow>) -> Result<Vec<Survey>, CoreError> {
    rows.into_iter().map(Survey::try_from).collect()
}

impl SurveyStore for PgSurveyStore {
    async fn insert(&self, survey: NewSurvey) -> Result<Survey, CoreError> {
        let survey = survey.into_survey(new_id());
        let values = SurveyValues::try_from(&survey)?;
        let row = SurveyRepo::insert(&self.pool, &survey, &values)
            .await
            .map_err(storage("insert survey"))?;
        Survey::try_from(row)
    }

    async fn get(&self, id: SurveyId) -> Result<Option<Survey>, CoreError> {
        SurveyRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage("get survey"))?
            .map(Survey::try_from)
            .transpose()
    }

    async fn put(&self, survey: &Survey) -> Result<Survey, CoreError> {
        let values = SurveyValues::try_from(survey)?;
        let updated = SurveyRepo::update_if_revision(&self.pool, survey, &values)
            .await
            .map_err(storage("update survey"))?;

        match updated {
            Some(row) => Survey::try_from(row),
            None => {
                let exists = SurveyRepo::exists(&self.pool, survey.id)
                    .await
                    .map_err(storage("check survey"))?;
                if exists {
                    Err(CoreError::Conflict(format!(
                        "Survey {} was modified concurrently (expected revision {})",
                        survey.id, survey.revision
                    )))
                } else {
                    Err(CoreError::survey_not_found(survey.id))
                }
            }
        }
    }

    async fn delete(&self, id: SurveyId) -> Result<bool, CoreError> {
        SurveyRepo::delete(&self.pool, id)
            .await
            .map_err(storage("delete survey"))
    }

    async fn exists(&self, id: SurveyId) -> Result<bool, CoreError> {
        SurveyRepo::exists(&self.pool, id)
            .await
            .map_err(storage("check survey"))
    }

    async fn find_all(&self) -> Result<Vec<Survey>, CoreError> {
        let rows = SurveyRepo::list(&self.pool)
            .await
            .map_err(storage("list surveys"))?;
        into_surveys(rows)
    }

    async fn find_by_status(&self, status: SurveyStatus) -> Result<Vec<Survey>, CoreError> {
        let rows = SurveyRepo::list_by_status(&self.pool, status)
            .await
            .map_err(storage("list surveys by status"))?;
        into_surveys(rows)
    }

    async fn find_by_template_flag(&self, is_template: bool) -> Result<Vec<Survey>, CoreError> {
        let rows = SurveyRepo::list_by_template_flag(&self.pool, is_template)
            .await
            .map_err(storage("list surveys by template flag"))?;
        into_surveys(rows)
    }

    async fn find_by_admin_id(&self, admin_id: &str) -> Result<Vec<Survey>, CoreError> {
        let rows = SurveyRepo::list_by_admin(&self.pool, admin_id)
            .await
            .map_err(storage("list surveys by admin"))?;
        into_surveys(rows)
    }

    async fn find_by_name_contains(&self, text: &str) -> Result<Vec<Survey>, CoreError> {
        let rows = SurveyRepo::search_by_name(&self.pool, text)
            .await
            .map_err(storage("search surveys by name"))?;
        into_surveys(rows)
    }
}
