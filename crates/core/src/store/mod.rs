//! Document store port for the survey aggregate.
//!
//! Implemented by [`memory::InMemorySurveyStore`] here and by the
//! PostgreSQL-backed store in the `surveys-db` crate.

pub mod memory;

use std::future::Future;

use crate::error::CoreError;
use crate::status::SurveyStatus;
use crate::survey::{NewSurvey, Survey};
use crate::types::SurveyId;

pub use memory::InMemorySurveyStore;

/// Persistence operations the lifecycle manager needs.
///
/// List operations return surveys ordered by `created_at` ascending.
pub trait SurveyStore: Send + Sync {
    /// Store a new survey, assigning its id and an initial revision of 1.
    fn insert(
        &self,
        survey: NewSurvey,
    ) -> impl Future<Output = Result<Survey, CoreError>> + Send;

    fn get(&self, id: SurveyId)
        -> impl Future<Output = Result<Option<Survey>, CoreError>> + Send;

    /// Replace a stored survey.
    ///
    /// Succeeds only when the stored revision equals `survey.revision`; the
    /// returned survey carries the incremented revision. Fails with
    /// [`CoreError::NotFound`] for an unknown id and [`CoreError::Conflict`]
    /// for a stale revision.
    fn put(&self, survey: &Survey) -> impl Future<Output = Result<Survey, CoreError>> + Send;

    /// Delete a survey. Returns `false` if it did not exist.
    fn delete(&self, id: SurveyId) -> impl Future<Output = Result<bool, CoreError>> + Send;

    fn exists(&self, id: SurveyId) -> impl Future<Output = Result<bool, CoreError>> + Send;

    fn find_all(&self) -> impl Future<Output = Result<Vec<Survey>, CoreError>> + Send;

    fn find_by_status(
        &self,
        status: SurveyStatus,
    ) -> impl Future<Output = Result<Vec<Survey>, CoreError>> + Send;

    fn find_by_template_flag(
        &self,
        is_template: bool,
    ) -> impl Future<Output = Result<Vec<Survey>, CoreError>> + Send;

    fn find_by_admin_id(
        &self,
        admin_id: &str,
    ) -> impl Future<Output = Result<Vec<Survey>, CoreError>> + Send;

    /// Case-insensitive substring match on the survey name.
    fn find_by_name_contains(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<Survey>, CoreError>> + Send;
}
