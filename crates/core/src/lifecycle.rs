//! Survey lifecycle facade.
//!
//! [`SurveyLifecycle`] composes the state machine, question editor, branding
//! rules, scheduled-close evaluator, and version chain over a
//! [`SurveyStore`]. Each operation is one read-modify-write; every read path
//! runs the scheduled-close evaluator and persists any transition it makes.

use chrono::Utc;

use crate::branding::{validate_branding, Branding};
use crate::error::CoreError;
use crate::question::{self, Question, QuestionDraft};
use crate::schedule::{apply_scheduled_close, parse_timestamp, validate_window};
use crate::status::SurveyStatus;
use crate::store::SurveyStore;
use crate::submission::{validate_submission, ResponseSubmission};
use crate::survey::{
    validate_create, validate_replacement, CreateSurvey, ListFilter, NewSurvey, SearchCriteria,
    Survey, SurveyReplacement,
};
use crate::types::{QuestionId, SurveyId, Timestamp};
use crate::versioning::{
    self, duplicate_of, new_version_of, DEFAULT_COPY_SUFFIX, DEFAULT_VERSION_SUFFIX,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Default cap on the number of questions in one survey.
pub const DEFAULT_MAX_QUESTIONS: usize = 200;

/// Tunables for the lifecycle facade.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Appended to the name of a successor version.
    pub version_suffix: String,
    /// Appended to the name of a duplicate.
    pub copy_suffix: String,
    /// Maximum number of questions per survey.
    pub max_questions: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            version_suffix: DEFAULT_VERSION_SUFFIX.to_string(),
            copy_suffix: DEFAULT_COPY_SUFFIX.to_string(),
            max_questions: DEFAULT_MAX_QUESTIONS,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleConfigError {
    #[error("SURVEY_MAX_QUESTIONS must be a positive integer, got '{0}'")]
    InvalidMaxQuestions(String),
}

impl LifecycleConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default           |
    /// |-------------------------|-------------------|
    /// | `SURVEY_VERSION_SUFFIX` | ` (New Version)`  |
    /// | `SURVEY_COPY_SUFFIX`    | ` (Copy)`         |
    /// | `SURVEY_MAX_QUESTIONS`  | `200`             |
    pub fn from_env() -> Result<Self, LifecycleConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LifecycleConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let version_suffix = lookup("SURVEY_VERSION_SUFFIX").unwrap_or(defaults.version_suffix);
        let copy_suffix = lookup("SURVEY_COPY_SUFFIX").unwrap_or(defaults.copy_suffix);
        let max_questions = match lookup("SURVEY_MAX_QUESTIONS") {
            None => defaults.max_questions,
            Some(value) => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(LifecycleConfigError::InvalidMaxQuestions(value))?,
        };

        Ok(Self {
            version_suffix,
            copy_suffix,
            max_questions,
        })
    }
}

// ---------------------------------------------------------------------------
// Facade
// ---------------------------------------------------------------------------

/// Lifecycle operations over surveys held in `S`.
#[derive(Debug, Clone)]
pub struct SurveyLifecycle<S> {
    store: S,
    config: LifecycleConfig,
}

impl<S: SurveyStore> SurveyLifecycle<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, LifecycleConfig::default())
    }

    pub fn with_config(store: S, config: LifecycleConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    // -- creation ------------------------------------------------------------

    /// Create a survey owned by `actor_id`.
    ///
    /// Status, version, template flag, and timestamps are forced; supplied
    /// questions are inserted in order with fresh ids where absent.
    pub async fn create(&self, input: CreateSurvey, actor_id: &str) -> Result<Survey, CoreError> {
        self.create_with_flag(input, actor_id, false).await
    }

    /// Create a reusable template, listed by [`Self::list_templates`].
    pub async fn create_template(
        &self,
        input: CreateSurvey,
        actor_id: &str,
    ) -> Result<Survey, CoreError> {
        self.create_with_flag(input, actor_id, true).await
    }

    async fn create_with_flag(
        &self,
        input: CreateSurvey,
        actor_id: &str,
        is_template: bool,
    ) -> Result<Survey, CoreError> {
        if actor_id.trim().is_empty() {
            return Err(CoreError::Validation(
                "An authenticated actor is required to create a survey".to_string(),
            ));
        }
        validate_create(&input)?;
        question::validate_question_count(0, input.questions.len(), self.config.max_questions)?;

        let mut new = NewSurvey::blank(input.name, actor_id.to_string(), Utc::now());
        new.description = input.description;
        new.scheduled_open = input.scheduled_open;
        new.scheduled_close = input.scheduled_close;
        new.branding = input.branding;
        new.is_template = is_template;
        for draft in input.questions {
            question::add_question(&mut new.questions, draft)?;
        }

        let survey = self.store.insert(new).await?;
        tracing::info!(
            survey_id = %survey.id,
            admin_id = %survey.admin_id,
            is_template,
            questions = survey.questions.len(),
            "Survey created"
        );
        Ok(survey)
    }

    // -- reads ---------------------------------------------------------------

    /// List surveys. `status` wins over `is_template`; with neither, all.
    pub async fn list(&self, filter: ListFilter) -> Result<Vec<Survey>, CoreError> {
        let surveys = match (filter.status, filter.is_template) {
            (Some(status), _) => self.store.find_by_status(status).await?,
            (None, Some(is_template)) => self.store.find_by_template_flag(is_template).await?,
            (None, None) => self.store.find_all().await?,
        };
        let surveys = self.refresh_all(surveys).await?;

        // A scheduled close may have moved a survey out of the requested status.
        let surveys: Vec<Survey> = match filter.status {
            Some(status) => surveys.into_iter().filter(|s| s.status == status).collect(),
            None => surveys,
        };

        tracing::debug!(count = surveys.len(), ?filter, "Listed surveys");
        Ok(surveys)
    }

    pub async fn list_templates(&self) -> Result<Vec<Survey>, CoreError> {
        self.list(ListFilter {
            status: None,
            is_template: Some(true),
        })
        .await
    }

    /// Fetch one survey with its effective status.
    pub async fn get_by_id(&self, id: SurveyId) -> Result<Survey, CoreError> {
        let survey = self.load(id).await?;
        self.refresh(survey, Utc::now()).await
    }

    /// Search by case-insensitive name substring and/or exact owner.
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Survey>, CoreError> {
        let surveys = match (&criteria.name, &criteria.admin_id) {
            (Some(name), Some(admin_id)) => self
                .store
                .find_by_name_contains(name)
                .await?
                .into_iter()
                .filter(|s| &s.admin_id == admin_id)
                .collect(),
            (Some(name), None) => self.store.find_by_name_contains(name).await?,
            (None, Some(admin_id)) => self.store.find_by_admin_id(admin_id).await?,
            (None, None) => self.store.find_all().await?,
        };
        let surveys = self.refresh_all(surveys).await?;
        tracing::debug!(count = surveys.len(), "Searched surveys");
        Ok(surveys)
    }

    // -- full update / delete ------------------------------------------------

    /// Replace the descriptive content of an editable survey.
    ///
    /// `id`, `created_at`, `admin_id`, `status`, and `previous_version_id`
    /// are preserved.
    pub async fn update(
        &self,
        id: SurveyId,
        replacement: SurveyReplacement,
    ) -> Result<Survey, CoreError> {
        validate_replacement(&replacement)?;
        question::validate_question_count(
            0,
            replacement.questions.len(),
            self.config.max_questions,
        )?;

        let (survey, ()) = self
            .edit(id, |survey| {
                survey.name = replacement.name;
                survey.description = replacement.description;
                survey.version = replacement.version;
                survey.is_template = replacement.is_template;
                survey.scheduled_open = replacement.scheduled_open;
                survey.scheduled_close = replacement.scheduled_close;
                survey.branding = replacement.branding;
                survey.questions = replacement.questions;
                Ok(())
            })
            .await?;

        tracing::info!(survey_id = %id, revision = survey.revision, "Survey updated");
        Ok(survey)
    }

    /// Delete a survey unconditionally. Returns `false` if it did not exist.
    pub async fn delete(&self, id: SurveyId) -> Result<bool, CoreError> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            tracing::info!(survey_id = %id, "Survey deleted");
        } else {
            tracing::debug!(survey_id = %id, "Delete requested for unknown survey");
        }
        Ok(deleted)
    }

    // -- status transitions --------------------------------------------------

    pub async fn publish(&self, id: SurveyId) -> Result<Survey, CoreError> {
        self.transition(id, SurveyStatus::Published).await
    }

    pub async fn close(&self, id: SurveyId) -> Result<Survey, CoreError> {
        self.transition(id, SurveyStatus::Closed).await
    }

    async fn transition(&self, id: SurveyId, target: SurveyStatus) -> Result<Survey, CoreError> {
        let mut survey = self.get_by_id(id).await?;
        let from = survey.status;
        from.validate_transition(target)?;

        survey.status = target;
        survey.modified_at = Utc::now();
        let survey = self.store.put(&survey).await?;

        tracing::info!(survey_id = %id, %from, to = %target, "Survey status changed");
        Ok(survey)
    }

    /// Close every published survey whose scheduled close has passed.
    ///
    /// Returns the number of surveys closed. Surveys modified concurrently
    /// are skipped; the lazy evaluator will close them on their next read.
    pub async fn close_expired(&self) -> Result<usize, CoreError> {
        let now = Utc::now();
        let mut closed = 0;

        for mut survey in self.store.find_by_status(SurveyStatus::Published).await? {
            if !apply_scheduled_close(&mut survey, now)? {
                continue;
            }
            match self.store.put(&survey).await {
                Ok(_) => {
                    closed += 1;
                    tracing::info!(survey_id = %survey.id, "Survey closed by schedule sweep");
                }
                Err(CoreError::Conflict(msg)) => {
                    tracing::warn!(survey_id = %survey.id, error = %msg, "Skipped concurrently modified survey");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(closed)
    }

    // -- copies and versions -------------------------------------------------

    /// Independent copy: same description, branding, and owner; no questions
    /// and no link to the original.
    pub async fn duplicate(&self, id: SurveyId) -> Result<Survey, CoreError> {
        let original = self.load(id).await?;
        let copy = self
            .store
            .insert(duplicate_of(&original, &self.config.copy_suffix, Utc::now()))
            .await?;
        tracing::info!(survey_id = %copy.id, source_id = %id, "Survey duplicated");
        Ok(copy)
    }

    /// Successor version carrying the questions and linking back to `id`.
    pub async fn create_new_version(&self, id: SurveyId) -> Result<Survey, CoreError> {
        let original = self.load(id).await?;
        let next = self
            .store
            .insert(new_version_of(
                &original,
                &self.config.version_suffix,
                Utc::now(),
            ))
            .await?;
        tracing::info!(
            survey_id = %next.id,
            previous_version_id = %id,
            version = next.version,
            "Survey version created"
        );
        Ok(next)
    }

    /// The chain from `id` back to its root, start-first.
    pub async fn version_history(&self, id: SurveyId) -> Result<Vec<Survey>, CoreError> {
        let chain = versioning::version_history(&self.store, id).await?;
        self.refresh_all(chain).await
    }

    // -- schedule and branding -----------------------------------------------

    /// Set the scheduling window from two RFC 3339 strings.
    ///
    /// Allowed while `CREATED` or `PUBLISHED`; closed surveys are read-only.
    pub async fn update_schedule(
        &self,
        id: SurveyId,
        open: &str,
        close: &str,
    ) -> Result<Survey, CoreError> {
        let open = parse_timestamp("scheduledOpen", open)?;
        let close = parse_timestamp("scheduledClose", close)?;
        validate_window(Some(open), Some(close))?;

        let mut survey = self.get_by_id(id).await?;
        if survey.status.is_closed() {
            return Err(CoreError::NotEditable {
                id: id.to_string(),
                status: survey.status,
            });
        }
        survey.scheduled_open = Some(open);
        survey.scheduled_close = Some(close);
        survey.modified_at = Utc::now();
        let survey = self.store.put(&survey).await?;

        tracing::info!(survey_id = %id, %open, %close, "Survey schedule updated");
        Ok(survey)
    }

    pub async fn update_branding(
        &self,
        id: SurveyId,
        branding: Branding,
    ) -> Result<Survey, CoreError> {
        validate_branding(&branding)?;
        let (survey, ()) = self
            .edit(id, |survey| {
                survey.branding = Some(branding);
                Ok(())
            })
            .await?;
        tracing::info!(survey_id = %id, "Survey branding updated");
        Ok(survey)
    }

    pub async fn clear_branding(&self, id: SurveyId) -> Result<Survey, CoreError> {
        let (survey, ()) = self
            .edit(id, |survey| {
                survey.branding = None;
                Ok(())
            })
            .await?;
        tracing::info!(survey_id = %id, "Survey branding cleared");
        Ok(survey)
    }

    // -- questions -----------------------------------------------------------

    /// Append a question; returns the updated survey and the stored question.
    pub async fn add_question(
        &self,
        id: SurveyId,
        draft: QuestionDraft,
    ) -> Result<(Survey, Question), CoreError> {
        let max = self.config.max_questions;
        let (survey, added) = self
            .edit(id, |survey| {
                question::validate_question_count(survey.questions.len(), 1, max)?;
                question::add_question(&mut survey.questions, draft)
            })
            .await?;
        tracing::info!(
            survey_id = %id,
            question_id = %added.id,
            order = added.order,
            kind = added.kind.tag(),
            "Question added"
        );
        Ok((survey, added))
    }

    pub async fn update_question(
        &self,
        id: SurveyId,
        question_id: QuestionId,
        replacement: QuestionDraft,
    ) -> Result<(Survey, Question), CoreError> {
        let (survey, updated) = self
            .edit(id, |survey| {
                question::update_question(&mut survey.questions, question_id, replacement)
            })
            .await?;
        tracing::info!(survey_id = %id, %question_id, "Question updated");
        Ok((survey, updated))
    }

    pub async fn remove_question(
        &self,
        id: SurveyId,
        question_id: QuestionId,
    ) -> Result<Survey, CoreError> {
        let (survey, _removed) = self
            .edit(id, |survey| {
                question::remove_question(&mut survey.questions, question_id)
            })
            .await?;
        tracing::info!(survey_id = %id, %question_id, "Question removed");
        Ok(survey)
    }

    pub async fn get_questions(&self, id: SurveyId) -> Result<Vec<Question>, CoreError> {
        Ok(self.get_by_id(id).await?.questions)
    }

    pub async fn get_question(
        &self,
        id: SurveyId,
        question_id: QuestionId,
    ) -> Result<Question, CoreError> {
        let survey = self.get_by_id(id).await?;
        question::get_question(&survey.questions, question_id).cloned()
    }

    // -- responses -----------------------------------------------------------

    /// Decide whether `submission` may be accepted for survey `id`.
    pub async fn check_submission(
        &self,
        id: SurveyId,
        submission: &ResponseSubmission,
    ) -> Result<(), CoreError> {
        let survey = self.get_by_id(id).await?;
        validate_submission(&survey, submission, Utc::now())
    }

    // -- helpers -------------------------------------------------------------

    async fn load(&self, id: SurveyId) -> Result<Survey, CoreError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| CoreError::survey_not_found(id))
    }

    /// Apply the scheduled-close evaluator and persist a resulting close.
    ///
    /// A concurrent write makes the put fail with a conflict; the evaluated
    /// copy is returned anyway and the close is persisted on a later read.
    async fn refresh(&self, mut survey: Survey, now: Timestamp) -> Result<Survey, CoreError> {
        if !apply_scheduled_close(&mut survey, now)? {
            return Ok(survey);
        }
        match self.store.put(&survey).await {
            Ok(saved) => {
                tracing::info!(survey_id = %saved.id, "Survey closed after scheduled close passed");
                Ok(saved)
            }
            Err(CoreError::Conflict(msg)) => {
                tracing::warn!(survey_id = %survey.id, error = %msg, "Scheduled close not persisted");
                Ok(survey)
            }
            Err(e) => Err(e),
        }
    }

    async fn refresh_all(&self, surveys: Vec<Survey>) -> Result<Vec<Survey>, CoreError> {
        let now = Utc::now();
        let mut refreshed = Vec::with_capacity(surveys.len());
        for survey in surveys {
            refreshed.push(self.refresh(survey, now).await?);
        }
        Ok(refreshed)
    }

    /// Read-modify-write of an editable survey.
    async fn edit<T, F>(&self, id: SurveyId, apply: F) -> Result<(Survey, T), CoreError>
    where
        F: FnOnce(&mut Survey) -> Result<T, CoreError>,
    {
        let mut survey = self.get_by_id(id).await?;
        survey.ensure_editable()?;
        let out = apply(&mut survey)?;
        survey.modified_at = Utc::now();
        let survey = self.store.put(&survey).await?;
        Ok((survey, out))
    }
}
