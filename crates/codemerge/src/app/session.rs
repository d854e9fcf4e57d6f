//! Interactive merge session state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::app::merge::{MergeError, MergeReport, Merger};
use crate::app::sort::sort_entries;
use crate::app::store::FileStore;
use crate::domain::errors::StoreError;
use crate::domain::model::{FileEntry, FileId, MergeOptions, SortKey};
use crate::domain::source::FileSource;
use crate::infra::config::Config;

/// Notice shown after a failed merge.
pub const MERGE_FAILED_NOTICE: &str = "An error occurred while merging files.";

/// Owns the file store together with the choices applied when merging it.
#[derive(Debug)]
pub struct MergeSession {
    store: FileStore,
    sort: SortKey,
    options: MergeOptions,
    merger: Merger,
    processing: Arc<AtomicBool>,
    notice: Option<String>,
}

impl Default for MergeSession {
    fn default() -> Self {
        Self::new(FileStore::new(), Merger::default())
    }
}

impl MergeSession {
    pub fn new(store: FileStore, merger: Merger) -> Self {
        Self {
            store,
            sort: SortKey::default(),
            options: MergeOptions::default(),
            merger,
            processing: Arc::new(AtomicBool::new(false)),
            notice: None,
        }
    }

    /// Build an empty session from configuration defaults.
    pub fn from_config(config: &Config) -> Self {
        let mut session = Self::new(
            FileStore::with_max(config.limits.max_files()),
            Merger::new(config.limits.read_threads()),
        );
        session.sort = config.merge.sort();
        session.options = config.merge.options();
        session
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort
    }

    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort = key;
    }

    pub fn options(&self) -> MergeOptions {
        self.options
    }

    pub fn set_options(&mut self, options: MergeOptions) {
        self.options = options;
    }

    /// Whether a merge is currently running.
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// Shared handle to the processing flag, readable from other threads
    /// while [`MergeSession::merge`] holds the session.
    pub fn processing_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.processing)
    }

    /// Most recent user-facing problem, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Add a batch of files, all or nothing.
    pub fn add_files<I>(&mut self, files: I) -> Result<Vec<FileId>, StoreError>
    where
        I: IntoIterator<Item = Arc<dyn FileSource>>,
    {
        self.notice = None;
        match self.store.add(files) {
            Ok(ids) => {
                tracing::debug!(added = ids.len(), total = self.store.len(), "files added");
                Ok(ids)
            }
            Err(err) => {
                let StoreError::CapacityExceeded { max } = &err;
                self.notice = Some(format!(
                    "Maximum limit of {max} files exceeded. Please select fewer files."
                ));
                Err(err)
            }
        }
    }

    pub fn remove(&mut self, id: FileId) -> bool {
        let held = self.store.len();
        let removed = self.store.remove(id);
        if held <= 1 {
            self.notice = None;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.notice = None;
    }

    /// The store as it will be merged.
    pub fn ordered(&self) -> Vec<FileEntry> {
        sort_entries(self.store.entries(), self.sort)
    }

    /// Merge the ordered view. Returns `Ok(None)` when there is nothing to merge.
    ///
    /// The processing flag is cleared however the merge ends, and the store is
    /// never modified.
    pub fn merge(&mut self) -> Result<Option<MergeReport>, MergeError> {
        if self.store.is_empty() {
            return Ok(None);
        }

        self.processing.store(true, Ordering::SeqCst);
        let ordered = self.ordered();
        let result = self.merger.merge(&ordered, &self.options);
        self.processing.store(false, Ordering::SeqCst);

        match result {
            Ok(report) => Ok(Some(report)),
            Err(err) => {
                tracing::error!(error = %err, "merge failed");
                self.notice = Some(MERGE_FAILED_NOTICE.to_owned());
                Err(err)
            }
        }
    }
}
