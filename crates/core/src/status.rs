//! Survey status state machine.
//!
//! A survey moves strictly forward through `CREATED -> PUBLISHED -> CLOSED`.
//! Every status mutation in the lifecycle facade and the scheduled-close
//! evaluator goes through [`SurveyStatus::validate_transition`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of a survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurveyStatus {
    /// Being composed. Editable, cannot receive responses.
    #[default]
    Created,
    /// Live. Not editable, accepts responses.
    Published,
    /// Terminal and read-only.
    Closed,
}

impl SurveyStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [SurveyStatus; 3] = [Self::Created, Self::Published, Self::Closed];

    /// Canonical upper-case name, as stored and as accepted by listing filters.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Published => "PUBLISHED",
            Self::Closed => "CLOSED",
        }
    }

    /// Only freshly created surveys may have their content changed.
    pub fn is_editable(self) -> bool {
        self == Self::Created
    }

    pub fn can_receive_responses(self) -> bool {
        self == Self::Published
    }

    pub fn is_closed(self) -> bool {
        self == Self::Closed
    }

    /// The canonical successor, or `None` from the terminal state.
    pub fn next_status(self) -> Option<SurveyStatus> {
        match self {
            Self::Created => Some(Self::Published),
            Self::Published => Some(Self::Closed),
            Self::Closed => None,
        }
    }

    /// `true` only for the single forward edge out of the current state.
    pub fn can_transition_to(self, target: SurveyStatus) -> bool {
        self.next_status() == Some(target)
    }

    /// Validate a transition, returning [`CoreError::InvalidTransition`] for
    /// self, backward, and out-of-terminal edges.
    pub fn validate_transition(self, target: SurveyStatus) -> Result<(), CoreError> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                from: self,
                to: target,
            })
        }
    }
}

impl fmt::Display for SurveyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SurveyStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::Parse {
                field: "status",
                value: s.to_string(),
                reason: "expected one of CREATED, PUBLISHED, CLOSED".to_string(),
            })
    }
}
