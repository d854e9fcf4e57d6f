//! Core domain types for the merge workflow.

pub mod errors;
pub mod model;
pub mod source;
