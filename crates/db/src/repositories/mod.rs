//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod survey_repo;

pub use survey_repo::SurveyRepo;
