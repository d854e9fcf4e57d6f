//! Human and machine readable views of the merge plan.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::model::FileEntry;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Render a byte count using base-1024 units with up to two decimals.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_owned();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[unit])
}

/// Output formats for [`render_listing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingFormat {
    #[default]
    Plain,
    Json,
}

#[derive(Debug, Serialize)]
struct ListingRow<'a> {
    id: u64,
    name: &'a str,
    size: u64,
    size_label: String,
    extension: &'a str,
}

/// Render `entries` in the order they will be merged.
pub fn render_listing(entries: &[FileEntry], format: ListingFormat) -> Result<String> {
    match format {
        ListingFormat::Plain => Ok(render_plain(entries)),
        ListingFormat::Json => {
            let rows: Vec<_> = entries
                .iter()
                .map(|entry| ListingRow {
                    id: entry.id().get(),
                    name: entry.name(),
                    size: entry.size(),
                    size_label: format_file_size(entry.size()),
                    extension: entry.extension(),
                })
                .collect();
            serde_json::to_string_pretty(&rows).context("failed to serialize file listing")
        }
    }
}

fn render_plain(entries: &[FileEntry]) -> String {
    let width = entries.len().max(1).to_string().len();
    let mut out = String::new();
    for (idx, entry) in entries.iter().enumerate() {
        out.push_str(&format!(
            "{:>width$}. {}  ({})\n",
            idx + 1,
            entry.name(),
            format_file_size(entry.size()),
        ));
    }
    let count = entries.len();
    let plural = if count == 1 { "" } else { "s" };
    out.push_str(&format!("{count} file{plural} ready to merge"));
    out
}
