//! Background worker for the survey lifecycle.
//!
//! Runs the scheduled-close sweep against the PostgreSQL store so surveys
//! close on time even when nobody reads them.

pub mod config;
pub mod sweep;
