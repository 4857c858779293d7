/// Survey and question identifiers are UUIDs (v7 when generated here).
pub type SurveyId = uuid::Uuid;

pub type QuestionId = uuid::Uuid;

/// Opaque actor identifier handed over by the identity provider.
pub type ActorId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh time-ordered identifier.
pub fn new_id() -> uuid::Uuid {
    uuid::Uuid::now_v7()
}
