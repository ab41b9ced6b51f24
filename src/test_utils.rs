//! Shared builders for catalog entries in unit tests.
#![cfg(test)]

use crate::catalog::{
    CatalogEntry,
    EntryType,
};

/// An untranslated entry without id or location.
pub(crate) fn entry(context: &str, source_text: &str) -> CatalogEntry {
    CatalogEntry::new(context, source_text, "")
}

pub(crate) fn entry_with_id(id: &str, context: &str, source_text: &str) -> CatalogEntry {
    CatalogEntry { id: id.to_string(), ..entry(context, source_text) }
}

/// An entry referenced from `file_name:line_number`.
pub(crate) fn entry_at(
    context: &str,
    source_text: &str,
    file_name: &str,
    line_number: i32,
) -> CatalogEntry {
    let mut entry = entry(context, source_text);
    entry.add_reference(file_name, line_number);
    entry
}

pub(crate) fn translated(entry: CatalogEntry, translations: &[&str]) -> CatalogEntry {
    CatalogEntry {
        translations: translations.iter().map(ToString::to_string).collect(),
        ..entry
    }
}

/// A finished entry with the given translations.
pub(crate) fn finished(
    context: &str,
    source_text: &str,
    comment: &str,
    translations: &[&str],
) -> CatalogEntry {
    CatalogEntry {
        entry_type: EntryType::Finished,
        ..translated(CatalogEntry::new(context, source_text, comment), translations)
    }
}
