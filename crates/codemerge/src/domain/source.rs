//! Abstraction over the handles supplied by the input side.

use std::fmt::Debug;

use crate::domain::errors::ReadError;

/// An opaque, readable file handle.
///
/// `name` and `size` are known up front; the text is produced on demand and
/// may be requested more than once.
pub trait FileSource: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn size(&self) -> u64;

    fn read_text(&self) -> Result<String, ReadError>;
}
