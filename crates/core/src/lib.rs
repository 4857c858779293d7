//! Survey lifecycle domain: the survey aggregate, its status state machine,
//! question editing, branding, scheduling, version chains, and the
//! [`lifecycle::SurveyLifecycle`] facade over a [`store::SurveyStore`].
//!
//! This crate has no internal dependencies so it can back any transport or
//! storage adapter.

pub mod branding;
pub mod error;
pub mod lifecycle;
pub mod question;
pub mod schedule;
pub mod status;
pub mod store;
pub mod submission;
pub mod survey;
pub mod types;
pub mod versioning;
