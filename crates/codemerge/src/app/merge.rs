//! Concatenating file contents into a single document.

use std::panic::{self, AssertUnwindSafe};

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::domain::errors::ReadError;
use crate::domain::model::{FileEntry, FileId, MergeOptions};

/// Width of the framed header lines.
pub const HEADER_WIDTH: usize = 50;

/// A file whose content could not be included in the merge.
#[derive(Debug)]
pub struct FileReadFailure {
    pub id: FileId,
    pub name: String,
    pub error: ReadError,
}

/// Output of a completed merge.
#[derive(Debug)]
pub struct MergeReport {
    pub text: String,
    pub failures: Vec<FileReadFailure>,
    pub file_count: usize,
}

impl MergeReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Failure of the merge as a whole, as opposed to a single file.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("failed to start reader pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("merge aborted: {0}")]
    Aborted(String),
}

/// Runs the read → format → join pipeline on a dedicated rayon pool.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    read_threads: usize,
}

impl Merger {
    /// `read_threads == 0` lets rayon pick the pool size.
    pub fn new(read_threads: usize) -> Self {
        Self { read_threads }
    }

    /// Read every entry concurrently and join the fragments in input order.
    ///
    /// Per-file failures become inline error markers and are listed in
    /// [`MergeReport::failures`]; only pipeline-level problems are returned
    /// as errors.
    pub fn merge(
        &self,
        entries: &[FileEntry],
        options: &MergeOptions,
    ) -> Result<MergeReport, MergeError> {
        tracing::debug!(
            files = entries.len(),
            threads = self.read_threads,
            "starting merge"
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.read_threads)
            .thread_name(|idx| format!("codemerge-read-{idx}"))
            .build()?;

        let fragments = panic::catch_unwind(AssertUnwindSafe(|| {
            pool.install(|| {
                entries
                    .par_iter()
                    .map(|entry| render_fragment(entry, options))
                    .collect::<Vec<_>>()
            })
        }))
        .map_err(|payload| MergeError::Aborted(panic_message(payload.as_ref())))?;

        let mut parts = Vec::with_capacity(fragments.len());
        let mut failures = Vec::new();
        for (text, failure) in fragments {
            parts.push(text);
            if let Some(failure) = failure {
                failures.push(failure);
            }
        }

        let report = MergeReport {
            text: parts.join("\n"),
            failures,
            file_count: entries.len(),
        };
        tracing::info!(
            files = report.file_count,
            failed = report.failures.len(),
            bytes = report.text.len(),
            "merge finished"
        );
        Ok(report)
    }
}

/// Header placed above a file's content.
pub fn header(name: &str, options: &MergeOptions) -> String {
    if !options.include_separator {
        return format!("\n\n// --- {name} ---\n");
    }

    let fill = options.separator_style.fill_char();
    let label = format!(" FILE: {name} ");
    let pad = HEADER_WIDTH.saturating_sub(label.encode_utf16().count()) / 2;
    let sidebar = fill.to_string().repeat(pad);
    let fullbar = fill.to_string().repeat(HEADER_WIDTH);

    format!("\n{fullbar}\n{sidebar}{label}{sidebar}\n{fullbar}\n")
}

/// Marker emitted in place of a file that could not be read.
pub fn error_marker(name: &str) -> String {
    format!("\n// !!! ERROR READING FILE: {name} !!!\n")
}

fn render_fragment(
    entry: &FileEntry,
    options: &MergeOptions,
) -> (String, Option<FileReadFailure>) {
    let content = entry.source().read_text().and_then(|content| {
        if content.is_empty() {
            Err(ReadError::Empty)
        } else {
            Ok(content)
        }
    });

    match content {
        Ok(content) => (format!("{}\n{content}", header(entry.name(), options)), None),
        Err(error) => {
            tracing::warn!(file = %entry.name(), id = %entry.id(), error = %error, "failed to read file");
            let failure = FileReadFailure {
                id: entry.id(),
                name: entry.name().to_owned(),
                error,
            };
            (error_marker(entry.name()), Some(failure))
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "reader panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::app::store::FileStore;
    use crate::domain::model::SeparatorStyle;
    use crate::domain::source::FileSource;
    use crate::infra::fs::MemoryFile;

    #[derive(Debug)]
    struct SlowFile {
        inner: MemoryFile,
        delay: Duration,
        finished: Arc<AtomicUsize>,
        order: Arc<parking_lot::Mutex<Vec<String>>>,
    }

    impl FileSource for SlowFile {
        fn name(&self) -> &str {
            self.inner.name()
        }

        fn size(&self) -> u64 {
            self.inner.size()
        }

        fn read_text(&self) -> Result<String, ReadError> {
            std::thread::sleep(self.delay);
            self.finished.fetch_add(1, Ordering::SeqCst);
            self.order.lock().push(self.inner.name().to_owned());
            self.inner.read_text()
        }
    }

    #[derive(Debug)]
    struct BrokenFile(&'static str);

    impl FileSource for BrokenFile {
        fn name(&self) -> &str {
            self.0
        }

        fn size(&self) -> u64 {
            0
        }

        fn read_text(&self) -> Result<String, ReadError> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied").into())
        }
    }

    #[derive(Debug)]
    struct PanickingFile;

    impl FileSource for PanickingFile {
        fn name(&self) -> &str {
            "boom.txt"
        }

        fn size(&self) -> u64 {
            1
        }

        fn read_text(&self) -> Result<String, ReadError> {
            panic!("reader exploded")
        }
    }

    fn store_with(sources: Vec<Arc<dyn FileSource>>) -> FileStore {
        let mut store = FileStore::new();
        store.add(sources).unwrap();
        store
    }

    fn memory(name: &str, contents: &str) -> Arc<dyn FileSource> {
        Arc::new(MemoryFile::new(name, contents))
    }

    #[test]
    fn framed_header_matches_padding_formula() {
        let options = MergeOptions {
            include_separator: true,
            separator_style: SeparatorStyle::Dash,
        };
        let rendered = header("main.py", &options);
        let lines: Vec<&str> = rendered.split('\n').collect();

        // leading and trailing newlines frame three visible lines
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "-".repeat(50));
        assert_eq!(lines[2], format!("{} FILE: main.py {}", "-".repeat(17), "-".repeat(17)));
        assert_eq!(lines[3], "-".repeat(50));
        assert_eq!(lines[4], "");
    }

    #[test]
    fn header_width_counts_utf16_units() {
        let options = MergeOptions::default();
        // the emoji is one char but two UTF-16 units, so the label is 13 wide
        let rendered = header("😀.rs", &options);
        let lines: Vec<&str> = rendered.split('\n').collect();
        assert_eq!(lines[2], format!("{} FILE: 😀.rs {}", "-".repeat(18), "-".repeat(18)));

        let rendered = header("é.rs", &options);
        let lines: Vec<&str> = rendered.split('\n').collect();
        assert_eq!(lines[2], format!("{} FILE: é.rs {}", "-".repeat(19), "-".repeat(19)));
    }

    #[test]
    fn header_uses_style_character() {
        let hash = MergeOptions {
            include_separator: true,
            separator_style: SeparatorStyle::Hash,
        };
        let slash = MergeOptions {
            separator_style: SeparatorStyle::Slash,
            ..hash
        };
        assert!(header("a.c", &hash).starts_with(&format!("\n{}\n", "#".repeat(50))));
        let sidebar = "/".repeat(19);
        assert!(header("a.c", &slash).contains(&format!("{sidebar} FILE: a.c {sidebar}")));
    }

    #[test]
    fn overlong_label_drops_padding() {
        let options = MergeOptions::default();
        let name = "a".repeat(60);
        let rendered = header(&name, &options);
        let lines: Vec<&str> = rendered.split('\n').collect();
        assert_eq!(lines[2], format!(" FILE: {name} "));
        assert_eq!(lines[1].len(), 50);
    }

    #[test]
    fn inline_header_without_separator() {
        let options = MergeOptions {
            include_separator: false,
            separator_style: SeparatorStyle::Hash,
        };
        assert_eq!(header("lib.rs", &options), "\n\n// --- lib.rs ---\n");
    }

    #[test]
    fn joins_fragments_with_single_newline() {
        let store = store_with(vec![memory("a.txt", "alpha"), memory("b.txt", "beta")]);
        let options = MergeOptions {
            include_separator: false,
            ..MergeOptions::default()
        };

        let report = Merger::default().merge(store.entries(), &options).unwrap();
        assert_eq!(
            report.text,
            "\n\n// --- a.txt ---\n\nalpha\n\n\n// --- b.txt ---\n\nbeta"
        );
        assert!(report.is_complete());
        assert_eq!(report.file_count, 2);
    }

    #[test]
    fn output_follows_input_order_not_completion_order() {
        let finished = Arc::new(AtomicUsize::new(0));
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let slow: Arc<dyn FileSource> = Arc::new(SlowFile {
            inner: MemoryFile::new("slow.txt", "SLOW"),
            delay: Duration::from_millis(200),
            finished: finished.clone(),
            order: order.clone(),
        });
        let fast: Arc<dyn FileSource> = Arc::new(SlowFile {
            inner: MemoryFile::new("fast.txt", "FAST"),
            delay: Duration::ZERO,
            finished: finished.clone(),
            order: order.clone(),
        });
        let store = store_with(vec![slow, fast]);

        let report = Merger::new(2)
            .merge(store.entries(), &MergeOptions::default())
            .unwrap();

        assert_eq!(finished.load(Ordering::SeqCst), 2);
        assert_eq!(order.lock().as_slice(), ["fast.txt", "slow.txt"]);
        let slow_at = report.text.find("SLOW").unwrap();
        let fast_at = report.text.find("FAST").unwrap();
        assert!(slow_at < fast_at);
    }

    #[test]
    fn unreadable_file_becomes_marker() {
        let broken: Arc<dyn FileSource> = Arc::new(BrokenFile("locked.rs"));
        let store = store_with(vec![
            memory("ok.rs", "fn ok() {}"),
            broken,
            memory("after.rs", "fn after() {}"),
        ]);

        let report = Merger::default()
            .merge(store.entries(), &MergeOptions::default())
            .unwrap();

        assert!(report.text.contains("fn ok() {}"));
        assert!(report.text.contains("// !!! ERROR READING FILE: locked.rs !!!"));
        assert!(report.text.contains("fn after() {}"));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "locked.rs");
        assert_eq!(report.failures[0].id, store.entries()[1].id());
        assert!(matches!(report.failures[0].error, ReadError::Io(_)));
    }

    #[test]
    fn empty_and_binary_files_are_failures() {
        let blob: Arc<dyn FileSource> = Arc::new(MemoryFile::new("blob.bin", vec![0xc3, 0x28]));
        let store = store_with(vec![memory("empty.txt", ""), blob]);

        let report = Merger::default()
            .merge(store.entries(), &MergeOptions::default())
            .unwrap();

        assert_eq!(
            report.text,
            format!("{}\n{}", error_marker("empty.txt"), error_marker("blob.bin"))
        );
        assert!(matches!(report.failures[0].error, ReadError::Empty));
        assert!(matches!(report.failures[1].error, ReadError::NotText));
    }

    #[test]
    fn merging_twice_is_identical() {
        let store = store_with(vec![memory("x.md", "# x"), memory("y.md", "# y")]);
        let merger = Merger::default();
        let options = MergeOptions::default();

        let first = merger.merge(store.entries(), &options).unwrap();
        let second = merger.merge(store.entries(), &options).unwrap();
        assert_eq!(first.text, second.text);
    }

    #[test]
    fn empty_entry_list_merges_to_empty_text() {
        let report = Merger::default().merge(&[], &MergeOptions::default()).unwrap();
        assert_eq!(report.text, "");
        assert_eq!(report.file_count, 0);
    }

    #[test]
    fn reader_panic_aborts_merge() {
        let panicking: Arc<dyn FileSource> = Arc::new(PanickingFile);
        let store = store_with(vec![memory("fine.txt", "fine"), panicking]);
        let err = Merger::new(1)
            .merge(store.entries(), &MergeOptions::default())
            .unwrap_err();
        assert!(matches!(err, MergeError::Aborted(ref message) if message.contains("reader exploded")));
    }
}
