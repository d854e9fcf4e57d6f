//! Derived orderings of the store.

use std::cmp::Ordering;

use feruca::{Collator, Locale, Tailoring};

use crate::domain::model::{FileEntry, SortKey};

/// Return a new ordering of `entries` for `key`. The input is left untouched
/// and entries with equal keys keep their relative order.
pub fn sort_entries(entries: &[FileEntry], key: SortKey) -> Vec<FileEntry> {
    let mut sorted = entries.to_vec();
    let mut collator = text_collator();
    match key {
        SortKey::None => {}
        SortKey::Name => sorted.sort_by(|a, b| collator.collate(a.name(), b.name())),
        SortKey::Size => sorted.sort_by_key(FileEntry::size),
        SortKey::Type => sorted.sort_by(|a, b| collator.collate(a.extension(), b.extension())),
    }
    sorted
}

/// Compare two strings with the Unicode Collation Algorithm (CLDR root order).
///
/// Accents and case only break ties between otherwise equal letters, and
/// lowercase sorts ahead of uppercase.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    text_collator().collate(a, b)
}

// Punctuation stays significant at the first level, so `a.rs` sorts before `a1.rs`.
fn text_collator() -> Collator {
    Collator::new(Tailoring::Cldr(Locale::Root), false, true)
}
