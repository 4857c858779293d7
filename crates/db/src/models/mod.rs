//! Row structs for the survey tables.
//!
//! Each submodule holds a `FromRow` struct matching the table columns and
//! the conversions to and from the core domain types.

pub mod survey;
