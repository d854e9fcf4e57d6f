//! Domain models for tracked files, sort keys, and merge options.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::source::FileSource;

/// Stable identifier assigned to an entry when it enters the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(u64);

impl FileId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One tracked file: identifier, metadata, and the handle used to read it.
#[derive(Debug, Clone)]
pub struct FileEntry {
    id: FileId,
    name: String,
    size: u64,
    source: Arc<dyn FileSource>,
}

impl FileEntry {
    pub(crate) fn new(id: FileId, source: Arc<dyn FileSource>) -> Self {
        Self {
            id,
            name: source.name().to_owned(),
            size: source.size(),
            source,
        }
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Substring after the last `.` in the name, or empty when there is none.
    pub fn extension(&self) -> &str {
        extension_of(&self.name)
    }

    pub fn source(&self) -> &dyn FileSource {
        self.source.as_ref()
    }
}

pub(crate) fn extension_of(name: &str) -> &str {
    name.rfind('.').map(|idx| &name[idx + 1..]).unwrap_or("")
}

/// Ordering applied to the store before merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum SortKey {
    /// Insertion order.
    #[default]
    None,
    /// File name, A-Z.
    Name,
    /// File size, smallest first.
    Size,
    /// File extension.
    Type,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::None => "none",
            SortKey::Name => "name",
            SortKey::Size => "size",
            SortKey::Type => "type",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = SortKeyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "added" | "insertion" => Ok(SortKey::None),
            "name" => Ok(SortKey::Name),
            "size" => Ok(SortKey::Size),
            "type" | "extension" | "ext" => Ok(SortKey::Type),
            other => Err(SortKeyParseError::UnknownKey(other.to_string())),
        }
    }
}

/// Error returned when parsing a [`SortKey`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SortKeyParseError {
    #[error("unknown sort key '{0}'")]
    UnknownKey(String),
}

/// Character used to frame a file header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum SeparatorStyle {
    /// `-----`
    #[default]
    Dash,
    /// `#####`
    Hash,
    /// `/////`
    Slash,
}

impl SeparatorStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeparatorStyle::Dash => "dash",
            SeparatorStyle::Hash => "hash",
            SeparatorStyle::Slash => "slash",
        }
    }

    pub fn fill_char(&self) -> char {
        match self {
            SeparatorStyle::Dash => '-',
            SeparatorStyle::Hash => '#',
            SeparatorStyle::Slash => '/',
        }
    }
}

impl fmt::Display for SeparatorStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeparatorStyle {
    type Err = SeparatorStyleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dash" | "-" => Ok(SeparatorStyle::Dash),
            "hash" | "#" => Ok(SeparatorStyle::Hash),
            "slash" | "/" => Ok(SeparatorStyle::Slash),
            other => Err(SeparatorStyleParseError::UnknownStyle(other.to_string())),
        }
    }
}

/// Error returned when parsing a [`SeparatorStyle`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SeparatorStyleParseError {
    #[error("unknown separator style '{0}'")]
    UnknownStyle(String),
}

/// Formatting applied to every fragment of a single merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    pub include_separator: bool,
    pub separator_style: SeparatorStyle,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            include_separator: true,
            separator_style: SeparatorStyle::Dash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_uses_last_dot() {
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("Makefile"), "");
        assert_eq!(extension_of(".env"), "env");
        assert_eq!(extension_of("trailing."), "");
    }

    #[test]
    fn parses_aliases() {
        assert_eq!("Extension".parse::<SortKey>(), Ok(SortKey::Type));
        assert_eq!(" hash ".parse::<SeparatorStyle>(), Ok(SeparatorStyle::Hash));
        assert!("zigzag".parse::<SeparatorStyle>().is_err());
    }
}
