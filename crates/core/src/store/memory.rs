//! In-process survey store backed by a `HashMap` behind a tokio `RwLock`.
//!
//! Writes are serialized by the lock, so the revision check in
//! [`SurveyStore::put`] is atomic.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::status::SurveyStatus;
use crate::store::SurveyStore;
use crate::survey::{NewSurvey, Survey};
use crate::types::{new_id, SurveyId};

#[derive(Debug, Clone, Default)]
pub struct InMemorySurveyStore {
    surveys: Arc<RwLock<HashMap<SurveyId, Survey>>>,
}

impl InMemorySurveyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored surveys.
    pub async fn len(&self) -> usize {
        self.surveys.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.surveys.read().await.is_empty()
    }

    async fn filtered<F>(&self, predicate: F) -> Vec<Survey>
    where
        F: Fn(&Survey) -> bool,
    {
        let surveys = self.surveys.read().await;
        let mut found: Vec<Survey> = surveys.values().filter(|s| predicate(s)).cloned().collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        found
    }
}

impl SurveyStore for InMemorySurveyStore {
    async fn insert(&self, survey: NewSurvey) -> Result<Survey, CoreError> {
        let stored = survey.into_survey(new_id());
        self.surveys.write().await.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: SurveyId) -> Result<Option<Survey>, CoreError> {
        Ok(self.surveys.read().await.get(&id).cloned())
    }

    async fn put(&self, survey: &Survey) -> Result<Survey, CoreError> {
        let mut surveys = self.surveys.write().await;
        let current = surveys
            .get(&survey.id)
            .ok_or_else(|| CoreError::survey_not_found(survey.id))?;
        if current.revision != survey.revision {
            return Err(CoreError::Conflict(format!(
                "Survey {} was modified concurrently (expected revision {}, found {})",
                survey.id, survey.revision, current.revision
            )));
        }
        let mut stored = survey.clone();
        stored.revision += 1;
        surveys.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: SurveyId) -> Result<bool, CoreError> {
        Ok(self.surveys.write().await.remove(&id).is_some())
    }

    async fn exists(&self, id: SurveyId) -> Result<bool, CoreError> {
        Ok(self.surveys.read().await.contains_key(&id))
    }

    async fn find_all(&self) -> Result<Vec<Survey>, CoreError> {
        Ok(self.filtered(|_| true).await)
    }

    async fn find_by_status(&self, status: SurveyStatus) -> Result<Vec<Survey>, CoreError> {
        Ok(self.filtered(|s| s.status == status).await)
    }

    async fn find_by_template_flag(&self, is_template: bool) -> Result<Vec<Survey>, CoreError> {
        Ok(self.filtered(|s| s.is_template == is_template).await)
    }

    async fn find_by_admin_id(&self, admin_id: &str) -> Result<Vec<Survey>, CoreError> {
        Ok(self.filtered(|s| s.admin_id == admin_id).await)
    }

    async fn find_by_name_contains(&self, text: &str) -> Result<Vec<Survey>, CoreError> {
        let needle = text.to_lowercase();
        Ok(self
            .filtered(|s| s.name.to_lowercase().contains(&needle))
            .await)
    }
}
