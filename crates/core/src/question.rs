//! Question model and the editor for a survey's ordered question list.
//!
//! The editor functions are pure: they mutate a `Vec<Question>` in place and
//! never touch storage. Lost updates between concurrent editors are caught by
//! the store's revision check, not here.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{new_id, QuestionId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum allowed length for question text.
pub const MAX_QUESTION_TEXT_LENGTH: usize = 1000;

/// Minimum number of options for a choice question.
pub const MIN_CHOICE_OPTIONS: usize = 2;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What kind of answer a question expects, with the settings for that kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum QuestionKind {
    /// Pick from a fixed list of options.
    MultipleChoice {
        options: Vec<String>,
        #[serde(default)]
        allow_multiple: bool,
    },
    /// Integer rating within `min..=max`.
    Rating { min: i32, max: i32 },
    /// Free text, optionally length-limited.
    Text {
        #[serde(default)]
        max_length: Option<u32>,
    },
}

impl QuestionKind {
    /// Short tag used in log fields and error messages.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::MultipleChoice { .. } => "multiple_choice",
            Self::Rating { .. } => "rating",
            Self::Text { .. } => "text",
        }
    }
}

/// A question embedded in a survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub kind: QuestionKind,
    pub required: bool,
    /// 1-based position. Removal does not renumber, so gaps are possible.
    pub order: u32,
}

/// Input for adding or replacing a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    /// Assigned on insertion when absent. Ignored on replacement.
    #[serde(default)]
    pub id: Option<QuestionId>,
    pub text: String,
    pub kind: QuestionKind,
    #[serde(default)]
    pub required: bool,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate question text and the settings of its kind.
pub fn validate_question(draft: &QuestionDraft) -> Result<(), CoreError> {
    let text = draft.text.trim();
    if text.is_empty() {
        return Err(CoreError::Validation(
            "Question text must not be empty".to_string(),
        ));
    }
    let length = draft.text.chars().count();
    if length > MAX_QUESTION_TEXT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Question text must not exceed {MAX_QUESTION_TEXT_LENGTH} characters, got {length}"
        )));
    }

    match &draft.kind {
        QuestionKind::MultipleChoice { options, .. } => {
            if options.len() < MIN_CHOICE_OPTIONS {
                return Err(CoreError::Validation(format!(
                    "Multiple-choice questions need at least {MIN_CHOICE_OPTIONS} options, got {}",
                    options.len()
                )));
            }
            let mut seen = HashSet::new();
            for option in options {
                if option.trim().is_empty() {
                    return Err(CoreError::Validation(
                        "Choice options must not be empty".to_string(),
                    ));
                }
                if !seen.insert(option.as_str()) {
                    return Err(CoreError::Validation(format!(
                        "Duplicate choice option '{option}'"
                    )));
                }
            }
        }
        QuestionKind::Rating { min, max } => {
            if min >= max {
                return Err(CoreError::Validation(format!(
                    "Rating range must have min < max, got {min}..{max}"
                )));
            }
        }
        QuestionKind::Text { max_length } => {
            if *max_length == Some(0) {
                return Err(CoreError::Validation(
                    "Text max length must be positive".to_string(),
                ));
            }
        }
    }

    Ok(())
}

/// Validate that adding `additional` questions keeps the list within `max`.
pub fn validate_question_count(
    current: usize,
    additional: usize,
    max: usize,
) -> Result<(), CoreError> {
    if current + additional > max {
        return Err(CoreError::Validation(format!(
            "A survey may hold at most {max} questions, it already has {current}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// Append a question, assigning an id when the draft has none.
///
/// The new order is one past the highest existing order, which is
/// `len + 1` for a list without gaps. Returns the stored question.
pub fn add_question(
    questions: &mut Vec<Question>,
    draft: QuestionDraft,
) -> Result<Question, CoreError> {
    validate_question(&draft)?;

    let id = draft.id.unwrap_or_else(new_id);
    if questions.iter().any(|q| q.id == id) {
        return Err(CoreError::Conflict(format!(
            "Question {id} already exists in this survey"
        )));
    }

    let order = questions
        .iter()
        .map(|q| q.order)
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Question order {} is the highest possible; no question can follow it",
                u32::MAX
            ))
        })?;
    let question = Question {
        id,
        text: draft.text,
        kind: draft.kind,
        required: draft.required,
        order,
    };
    questions.push(question.clone());
    Ok(question)
}

/// Replace a question in place, keeping its id and order.
pub fn update_question(
    questions: &mut [Question],
    id: QuestionId,
    replacement: QuestionDraft,
) -> Result<Question, CoreError> {
    validate_question(&replacement)?;

    let slot = questions
        .iter_mut()
        .find(|q| q.id == id)
        .ok_or_else(|| CoreError::question_not_found(id))?;

    *slot = Question {
        id,
        text: replacement.text,
        kind: replacement.kind,
        required: replacement.required,
        order: slot.order,
    };
    Ok(slot.clone())
}

/// Remove a question. Remaining orders are left untouched.
pub fn remove_question(
    questions: &mut Vec<Question>,
    id: QuestionId,
) -> Result<Question, CoreError> {
    let index = questions
        .iter()
        .position(|q| q.id == id)
        .ok_or_else(|| CoreError::question_not_found(id))?;
    Ok(questions.remove(index))
}

/// Look up a question by id.
pub fn get_question(questions: &[Question], id: QuestionId) -> Result<&Question, CoreError> {
    questions
        .iter()
        .find(|q| q.id == id)
        .ok_or_else(|| CoreError::question_not_found(id))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn text_draft(text: &str) -> QuestionDraft {
        QuestionDraft {
            id: None,
            text: text.to_string(),
            kind: QuestionKind::Text { max_length: None },
            required: false,
        }
    }

    fn choice_draft(options: &[&str]) -> QuestionDraft {
        QuestionDraft {
            id: None,
            text: "Pick one".to_string(),
            kind: QuestionKind::MultipleChoice {
                options: options.iter().map(|o| o.to_string()).collect(),
                allow_multiple: false,
            },
            required: true,
        }
    }

    // -- validate_question ---------------------------------------------------

    #[test]
    fn valid_text_question() {
        assert!(validate_question(&text_draft("How was it?")).is_ok());
    }

    #[test]
    fn rejects_blank_text() {
        assert!(validate_question(&text_draft("   ")).is_err());
    }

    #[test]
    fn rejects_overlong_text() {
        let text = "q".repeat(MAX_QUESTION_TEXT_LENGTH + 1);
        assert!(validate_question(&text_draft(&text)).is_err());
    }

    #[test]
    fn text_limit_counts_characters() {
        let text = "ß".repeat(MAX_QUESTION_TEXT_LENGTH);
        assert!(validate_question(&text_draft(&text)).is_ok());
    }

    #[test]
    fn rejects_single_option_choice() {
        assert!(validate_question(&choice_draft(&["Yes"])).is_err());
    }

    #[test]
    fn rejects_duplicate_options() {
        let err = validate_question(&choice_draft(&["Yes", "Yes"])).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn rejects_inverted_rating_range() {
        let mut draft = text_draft("Rate us");
        draft.kind = QuestionKind::Rating { min: 5, max: 1 };
        assert!(validate_question(&draft).is_err());
    }

    #[test]
    fn rejects_zero_text_length() {
        let mut draft = text_draft("Comments");
        draft.kind = QuestionKind::Text {
            max_length: Some(0),
        };
        assert!(validate_question(&draft).is_err());
    }

    #[test]
    fn question_count_limit() {
        assert!(validate_question_count(9, 1, 10).is_ok());
        assert!(validate_question_count(10, 1, 10).is_err());
    }

    // -- add_question --------------------------------------------------------

    #[test]
    fn sequential_adds_number_from_one() {
        let mut questions = Vec::new();
        for i in 0..5 {
            add_question(&mut questions, text_draft(&format!("Q{i}"))).unwrap();
        }
        let orders: Vec<u32> = questions.iter().map(|q| q.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5]);
        let texts: Vec<&str> = questions.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["Q0", "Q1", "Q2", "Q3", "Q4"]);
    }

    #[test]
    fn add_assigns_unique_ids() {
        let mut questions = Vec::new();
        let a = add_question(&mut questions, text_draft("A")).unwrap();
        let b = add_question(&mut questions, text_draft("B")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn add_keeps_supplied_id() {
        let mut questions = Vec::new();
        let id = new_id();
        let mut draft = text_draft("A");
        draft.id = Some(id);
        let added = add_question(&mut questions, draft).unwrap();
        assert_eq!(added.id, id);
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let mut questions = Vec::new();
        let first = add_question(&mut questions, text_draft("A")).unwrap();
        let mut draft = text_draft("B");
        draft.id = Some(first.id);
        assert_matches!(
            add_question(&mut questions, draft),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn add_after_removal_does_not_reuse_order() {
        let mut questions = Vec::new();
        add_question(&mut questions, text_draft("A")).unwrap();
        let b = add_question(&mut questions, text_draft("B")).unwrap();
        add_question(&mut questions, text_draft("C")).unwrap();
        remove_question(&mut questions, b.id).unwrap();

        let d = add_question(&mut questions, text_draft("D")).unwrap();
        assert_eq!(d.order, 4);
    }

    #[test]
    fn add_after_highest_order_is_rejected() {
        let mut questions = Vec::new();
        let a = add_question(&mut questions, text_draft("A")).unwrap();
        questions[0].order = u32::MAX;

        assert_matches!(
            add_question(&mut questions, text_draft("B")),
            Err(CoreError::Validation(_))
        );
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, a.id);
    }

    #[test]
    fn add_rejects_invalid_draft() {
        let mut questions = Vec::new();
        assert!(add_question(&mut questions, text_draft("")).is_err());
        assert!(questions.is_empty());
    }

    // -- update_question -----------------------------------------------------

    #[test]
    fn update_preserves_id_and_order() {
        let mut questions = Vec::new();
        add_question(&mut questions, text_draft("A")).unwrap();
        let b = add_question(&mut questions, text_draft("B")).unwrap();

        let mut replacement = choice_draft(&["Red", "Blue"]);
        replacement.id = Some(new_id());
        let updated = update_question(&mut questions, b.id, replacement).unwrap();

        assert_eq!(updated.id, b.id);
        assert_eq!(updated.order, 2);
        assert_eq!(updated.text, "Pick one");
        assert!(updated.required);
        assert_eq!(questions[1], updated);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut questions = Vec::new();
        add_question(&mut questions, text_draft("A")).unwrap();
        assert_matches!(
            update_question(&mut questions, new_id(), text_draft("X")),
            Err(CoreError::NotFound {
                entity: "Question",
                ..
            })
        );
    }

    // -- remove_question -----------------------------------------------------

    #[test]
    fn remove_leaves_gap_in_order() {
        let mut questions = Vec::new();
        add_question(&mut questions, text_draft("A")).unwrap();
        let b = add_question(&mut questions, text_draft("B")).unwrap();
        add_question(&mut questions, text_draft("C")).unwrap();

        let removed = remove_question(&mut questions, b.id).unwrap();
        assert_eq!(removed.text, "B");
        let orders: Vec<u32> = questions.iter().map(|q| q.order).collect();
        assert_eq!(orders, vec![1, 3]);
    }

    #[test]
    fn remove_unknown_id_is_not_found() {
        let mut questions = Vec::new();
        assert_matches!(
            remove_question(&mut questions, new_id()),
            Err(CoreError::NotFound { .. })
        );
    }

    // -- get_question --------------------------------------------------------

    #[test]
    fn get_finds_by_id() {
        let mut questions = Vec::new();
        let a = add_question(&mut questions, text_draft("A")).unwrap();
        assert_eq!(get_question(&questions, a.id).unwrap().text, "A");
        assert!(get_question(&questions, new_id()).is_err());
    }

    // -- serialization -------------------------------------------------------

    #[test]
    fn kind_serializes_with_type_tag() {
        let kind = QuestionKind::MultipleChoice {
            options: vec!["a".into(), "b".into()],
            allow_multiple: true,
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["type"], "multiple_choice");
        assert_eq!(json["allowMultiple"], true);
    }
}
