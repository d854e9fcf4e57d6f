//! Writing merged output to its destinations.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::infra::clipboard::{Clipboard, ClipboardBackend};
use crate::infra::config::Config;

/// Media type of the merged artifact.
pub const MIME_TYPE: &str = "text/plain; charset=utf-8";

/// Extension of the merged artifact.
pub const FILE_EXTENSION: &str = "txt";

/// `<prefix>-<YYYY-MM-DD>.txt`
pub fn export_file_name(prefix: &str, date: Date) -> Result<String> {
    let stamp = date
        .format(format_description!("[year]-[month]-[day]"))
        .context("failed to format export date")?;
    Ok(format!("{prefix}-{stamp}.{FILE_EXTENSION}"))
}

/// Where the merged text should go.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub file_prefix: String,
    /// Overrides the date-stamped name inside `output_dir`.
    pub output_path: Option<PathBuf>,
    /// Skip writing a file entirely.
    pub no_file: bool,
    pub to_stdout: bool,
    pub copy_to_clipboard: bool,
}

impl ExportOptions {
    /// Build options from configuration defaults.
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_dir: config.export.output_dir(),
            file_prefix: config.export.file_prefix(),
            output_path: None,
            no_file: false,
            to_stdout: false,
            copy_to_clipboard: config.export.copy_to_clipboard(),
        }
    }

    /// Destination file for an export performed on `date`, if any.
    pub fn resolve_path(&self, date: Date) -> Result<Option<PathBuf>> {
        if self.no_file {
            return Ok(None);
        }
        if let Some(path) = &self.output_path {
            return Ok(Some(path.clone()));
        }
        let name = export_file_name(&self.file_prefix, date)?;
        Ok(Some(self.output_dir.join(name)))
    }
}

/// Result of an export operation.
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub output_path: Option<PathBuf>,
    pub bytes_written: usize,
    pub clipboard: Option<ClipboardBackend>,
    pub printed: bool,
}

/// Delivers merged text to files, stdout, and the clipboard.
pub struct Exporter {
    clipboard: Mutex<Option<Clipboard>>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter {
    pub fn new() -> Self {
        Self {
            clipboard: Mutex::new(None),
        }
    }

    pub fn export(&self, text: &str, options: &ExportOptions) -> Result<ExportResult> {
        self.export_on(text, options, OffsetDateTime::now_utc().date())
    }

    /// Export as if performed on `date`.
    pub fn export_on(&self, text: &str, options: &ExportOptions, date: Date) -> Result<ExportResult> {
        let output_path = options.resolve_path(date)?;

        if let Some(path) = &output_path {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create export directory: {}", parent.display())
                })?;
            }
            fs::write(path, text)
                .with_context(|| format!("failed to write merged output to {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = text.len(), mime = MIME_TYPE, "wrote merged file");
        }

        if options.to_stdout {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .context("failed to write merged output to stdout")?;
            stdout.flush().context("failed to flush stdout")?;
        }

        let clipboard = if options.copy_to_clipboard {
            let mut guard = self.clipboard.lock();
            let backend = guard
                .get_or_insert_with(Clipboard::new)
                .copy(text)
                .context("failed to copy merged output to clipboard")?;
            tracing::info!(%backend, "copied merged output");
            Some(backend)
        } else {
            None
        };

        Ok(ExportResult {
            output_path,
            bytes_written: text.len(),
            clipboard,
            printed: options.to_stdout,
        })
    }
}
