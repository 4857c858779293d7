//! Version chains and copies of surveys.
//!
//! A new version carries the questions and links back to its predecessor
//! through `previous_version_id`; a duplicate is an independent survey with
//! no questions and no link.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::store::SurveyStore;
use crate::survey::{NewSurvey, Survey, MAX_SURVEY_NAME_LENGTH};
use crate::types::{SurveyId, Timestamp};

/// Default name suffix for a successor version.
pub const DEFAULT_VERSION_SUFFIX: &str = " (New Version)";

/// Default name suffix for a duplicate.
pub const DEFAULT_COPY_SUFFIX: &str = " (Copy)";

/// Longest chain `version_history` will walk before treating it as corrupt.
pub const MAX_CHAIN_LENGTH: usize = 1000;

/// `base` followed by `suffix`, within [`MAX_SURVEY_NAME_LENGTH`] characters.
///
/// The base is shortened to make room for the suffix, so repeated versioning
/// never grows a name past the limit.
pub fn suffixed_name(base: &str, suffix: &str) -> String {
    let room = MAX_SURVEY_NAME_LENGTH.saturating_sub(suffix.chars().count());
    base.chars()
        .take(room)
        .chain(suffix.chars())
        .take(MAX_SURVEY_NAME_LENGTH)
        .collect()
}

/// Build the successor of `original`.
///
/// Copies description, branding, owner, and the questions by value; links
/// back to `original`; starts `CREATED` regardless of the original's status.
pub fn new_version_of(original: &Survey, suffix: &str, now: Timestamp) -> NewSurvey {
    let mut next = NewSurvey::blank(
        suffixed_name(&original.name, suffix),
        original.admin_id.clone(),
        now,
    );
    next.description = original.description.clone();
    next.branding = original.branding.clone();
    next.questions = original.questions.clone();
    next.previous_version_id = Some(original.id);
    next.version = original.version.saturating_add(1);
    next
}

/// Build an independent copy of `original` without questions or chain link.
pub fn duplicate_of(original: &Survey, suffix: &str, now: Timestamp) -> NewSurvey {
    let mut copy = NewSurvey::blank(
        suffixed_name(&original.name, suffix),
        original.admin_id.clone(),
        now,
    );
    copy.description = original.description.clone();
    copy.branding = original.branding.clone();
    copy
}

/// Walk `previous_version_id` links from `start` back to the root.
///
/// Returns the chain start-first. Traversal stops at a survey without a
/// predecessor or at a predecessor the store cannot resolve. Revisiting an
/// id, or exceeding [`MAX_CHAIN_LENGTH`], fails with
/// [`CoreError::CorruptChain`].
pub async fn version_history<S: SurveyStore>(
    store: &S,
    start: SurveyId,
) -> Result<Vec<Survey>, CoreError> {
    let first = store
        .get(start)
        .await?
        .ok_or_else(|| CoreError::survey_not_found(start))?;

    let mut visited = HashSet::from([first.id]);
    let mut next = first.previous_version_id;
    let mut chain = vec![first];

    while let Some(id) = next {
        if !visited.insert(id) || chain.len() >= MAX_CHAIN_LENGTH {
            tracing::error!(survey_id = %id, length = chain.len(), "Corrupt version chain");
            return Err(CoreError::CorruptChain { id: id.to_string() });
        }
        let Some(survey) = store.get(id).await? else {
            tracing::debug!(survey_id = %id, "Version chain ends at unresolvable predecessor");
            break;
        };
        next = survey.previous_version_id;
        chain.push(survey);
    }

    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branding::Branding;
    use crate::question::{add_question, QuestionDraft, QuestionKind};
    use crate::status::SurveyStatus;
    use crate::store::InMemorySurveyStore;
    use crate::types::new_id;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn original() -> Survey {
        let mut survey = NewSurvey::blank("CSAT".into(), "admin1".into(), Utc::now())
            .into_survey(new_id());
        survey.description = Some("Quarterly".into());
        survey.status = SurveyStatus::Published;
        survey.version = 3;
        survey.branding = Some(Branding {
            primary_color: Some("#000".into()),
            ..Default::default()
        });
        add_question(
            &mut survey.questions,
            QuestionDraft {
                id: None,
                text: "Rate us".into(),
                kind: QuestionKind::Rating { min: 1, max: 5 },
                required: true,
            },
        )
        .unwrap();
        survey
    }

    // -- new_version_of ------------------------------------------------------

    #[test]
    fn new_version_links_and_copies_questions() {
        let original = original();
        let next = new_version_of(&original, DEFAULT_VERSION_SUFFIX, Utc::now());
        assert_eq!(next.previous_version_id, Some(original.id));
        assert_eq!(next.questions, original.questions);
        assert_eq!(next.name, "CSAT (New Version)");
        assert_eq!(next.description, original.description);
        assert_eq!(next.branding, original.branding);
        assert_eq!(next.admin_id, "admin1");
        assert_eq!(next.status, SurveyStatus::Created);
        assert_eq!(next.version, 4);
    }

    // -- duplicate_of --------------------------------------------------------

    #[test]
    fn duplicate_has_no_questions_or_link() {
        let original = original();
        let copy = duplicate_of(&original, DEFAULT_COPY_SUFFIX, Utc::now());
        assert_eq!(copy.name, "CSAT (Copy)");
        assert!(copy.questions.is_empty());
        assert!(copy.previous_version_id.is_none());
        assert_eq!(copy.branding, original.branding);
        assert_eq!(copy.status, SurveyStatus::Created);
        assert_eq!(copy.version, 1);
    }

    // -- suffixed_name -------------------------------------------------------

    #[test]
    fn suffix_fits_short_names() {
        assert_eq!(suffixed_name("CSAT", DEFAULT_COPY_SUFFIX), "CSAT (Copy)");
    }

    #[test]
    fn long_names_are_shortened_to_fit_suffix() {
        let base = "n".repeat(MAX_SURVEY_NAME_LENGTH);
        let name = suffixed_name(&base, DEFAULT_VERSION_SUFFIX);
        assert_eq!(name.chars().count(), MAX_SURVEY_NAME_LENGTH);
        assert!(name.ends_with(DEFAULT_VERSION_SUFFIX));

        let again = suffixed_name(&name, DEFAULT_VERSION_SUFFIX);
        assert_eq!(again.chars().count(), MAX_SURVEY_NAME_LENGTH);
    }

    #[test]
    fn shortening_respects_char_boundaries() {
        let base = "é".repeat(MAX_SURVEY_NAME_LENGTH);
        let name = suffixed_name(&base, DEFAULT_COPY_SUFFIX);
        assert_eq!(name.chars().count(), MAX_SURVEY_NAME_LENGTH);
        assert!(name.ends_with(DEFAULT_COPY_SUFFIX));
    }

    #[test]
    fn oversized_suffix_is_cut_at_limit() {
        let suffix = "s".repeat(MAX_SURVEY_NAME_LENGTH + 10);
        assert_eq!(
            suffixed_name("CSAT", &suffix).chars().count(),
            MAX_SURVEY_NAME_LENGTH
        );
    }

    // -- version_history -----------------------------------------------------

    #[tokio::test]
    async fn history_walks_back_to_root() {
        let store = InMemorySurveyStore::new();
        let root = store.insert(NewSurvey::blank("v1".into(), "a".into(), Utc::now())).await.unwrap();
        let v2 = store
            .insert(new_version_of(&root, DEFAULT_VERSION_SUFFIX, Utc::now()))
            .await
            .unwrap();
        let v3 = store
            .insert(new_version_of(&v2, DEFAULT_VERSION_SUFFIX, Utc::now()))
            .await
            .unwrap();

        let chain = version_history(&store, v3.id).await.unwrap();
        let ids: Vec<SurveyId> = chain.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![v3.id, v2.id, root.id]);
        assert!(chain.last().unwrap().previous_version_id.is_none());

        let from_middle = version_history(&store, v2.id).await.unwrap();
        assert_eq!(from_middle.len(), 2);
    }

    #[tokio::test]
    async fn history_stops_at_missing_predecessor() {
        let store = InMemorySurveyStore::new();
        let root = store.insert(NewSurvey::blank("v1".into(), "a".into(), Utc::now())).await.unwrap();
        let v2 = store
            .insert(new_version_of(&root, DEFAULT_VERSION_SUFFIX, Utc::now()))
            .await
            .unwrap();
        store.delete(root.id).await.unwrap();

        let chain = version_history(&store, v2.id).await.unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].id, v2.id);
    }

    #[tokio::test]
    async fn history_detects_cycle() {
        let store = InMemorySurveyStore::new();
        let a = store.insert(NewSurvey::blank("a".into(), "x".into(), Utc::now())).await.unwrap();
        let b = store
            .insert(new_version_of(&a, DEFAULT_VERSION_SUFFIX, Utc::now()))
            .await
            .unwrap();

        let mut corrupted = a.clone();
        corrupted.previous_version_id = Some(b.id);
        store.put(&corrupted).await.unwrap();

        assert_matches!(
            version_history(&store, b.id).await,
            Err(CoreError::CorruptChain { .. })
        );
    }

    #[tokio::test]
    async fn history_of_unknown_survey_is_not_found() {
        let store = InMemorySurveyStore::new();
        assert_matches!(
            version_history(&store, new_id()).await,
            Err(CoreError::NotFound { .. })
        );
    }
}
