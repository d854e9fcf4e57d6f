//! Application layer orchestrating domain logic and infrastructure.

pub mod export;
pub mod listing;
pub mod merge;
pub mod session;
pub mod sort;
pub mod store;
