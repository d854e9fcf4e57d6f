//! Domain-specific errors.

use std::io;

use thiserror::Error;

/// Violations of the store's invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("maximum limit of {max} files exceeded")]
    CapacityExceeded { max: usize },
}

/// Failure to obtain the text of a single file.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read file: {0}")]
    Io(#[from] io::Error),
    #[error("file is not valid UTF-8 text")]
    NotText,
    #[error("empty file content")]
    Empty,
}
