//! Tracking the files selected for a merge.

use std::sync::Arc;

use crate::domain::errors::StoreError;
use crate::domain::model::{FileEntry, FileId};
use crate::domain::source::FileSource;

/// Number of files a store accepts unless configured otherwise.
pub const DEFAULT_MAX_FILES: usize = 40;

/// Ordered, capped collection of file entries in insertion order.
#[derive(Debug, Clone)]
pub struct FileStore {
    entries: Vec<FileEntry>,
    max: usize,
    next_id: u64,
}

impl Default for FileStore {
    fn default() -> Self {
        Self::with_max(DEFAULT_MAX_FILES)
    }
}

impl FileStore {
    /// Create an empty store with the default limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store holding at most `max` entries.
    pub fn with_max(max: usize) -> Self {
        Self {
            entries: Vec::new(),
            max,
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn get(&self, id: FileId) -> Option<&FileEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// Append every file or none of them.
    ///
    /// When the resulting length would exceed the limit the store is left
    /// untouched and [`StoreError::CapacityExceeded`] is returned. On success
    /// the ids assigned to the new entries are returned in the given order.
    pub fn add<I>(&mut self, files: I) -> Result<Vec<FileId>, StoreError>
    where
        I: IntoIterator<Item = Arc<dyn FileSource>>,
    {
        let files: Vec<_> = files.into_iter().collect();
        if self.entries.len() + files.len() > self.max {
            return Err(StoreError::CapacityExceeded { max: self.max });
        }

        let mut ids = Vec::with_capacity(files.len());
        for source in files {
            let id = self.allocate_id();
            self.entries.push(FileEntry::new(id, source));
            ids.push(id);
        }
        Ok(ids)
    }

    /// Remove the entry with `id`. Unknown ids are ignored; returns whether
    /// anything was removed.
    pub fn remove(&mut self, id: FileId) -> bool {
        let original_len = self.entries.len();
        self.entries.retain(|entry| entry.id() != id);
        self.entries.len() != original_len
    }

    /// Remove all entries. Ids handed out earlier are not reissued.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn allocate_id(&mut self) -> FileId {
        let id = FileId::new(self.next_id);
        self.next_id += 1;
        id
    }
}
