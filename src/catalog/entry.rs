//! Catalog entry data model.

use std::collections::BTreeMap;
use std::path::{
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};

/// Source text of the placeholder entries that only carry a context comment.
pub const CONTEXT_COMMENT: &str = "QT_LINGUIST_INTERNAL_CONTEXT_COMMENT";

/// Lifecycle state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryType {
    #[default]
    Unfinished,
    Finished,
    /// The source string disappeared but the entry was never published.
    Vanished,
    Obsolete,
}

impl EntryType {
    /// Obsolete and vanished entries only live in editable catalogs.
    #[must_use]
    pub const fn is_retired(self) -> bool {
        matches!(self, Self::Vanished | Self::Obsolete)
    }
}

/// A (file, line) location. Negative lines mean "unknown".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub file_name: PathBuf,
    pub line_number: i32,
}

impl Reference {
    #[must_use]
    pub fn new(file_name: impl Into<PathBuf>, line_number: i32) -> Self {
        Self { file_name: file_name.into(), line_number }
    }
}

/// One translatable unit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogEntry {
    /// Stable identifier; wins over the content identity when present.
    pub id: String,
    pub context: String,
    pub source_text: String,
    pub old_source_text: String,
    /// Disambiguation comment, part of the content identity.
    pub comment: String,
    pub old_comment: String,
    pub user_data: String,
    pub extra_comment: String,
    pub translator_comment: String,
    pub warning: String,
    /// One slot per plural form, or exactly one for non-plural entries.
    pub translations: Vec<String>,

    pub file_name: Option<PathBuf>,
    pub line_number: i32,
    /// Line of the entry inside the editable catalog it was read from.
    pub ts_line_number: i32,
    pub extra_refs: Vec<Reference>,

    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub plural: bool,

    /// Format specific metadata, e.g. `po-flags`.
    pub extras: BTreeMap<String, String>,
    pub warning_only: bool,
}

impl Default for CatalogEntry {
    fn default() -> Self {
        Self {
            id: String::new(),
            context: String::new(),
            source_text: String::new(),
            old_source_text: String::new(),
            comment: String::new(),
            old_comment: String::new(),
            user_data: String::new(),
            extra_comment: String::new(),
            translator_comment: String::new(),
            warning: String::new(),
            translations: Vec::new(),
            file_name: None,
            line_number: -1,
            ts_line_number: -1,
            extra_refs: Vec::new(),
            entry_type: EntryType::Unfinished,
            plural: false,
            extras: BTreeMap::new(),
            warning_only: false,
        }
    }
}

impl CatalogEntry {
    #[must_use]
    pub fn new(
        context: impl Into<String>,
        source_text: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            context: context.into(),
            source_text: source_text.into(),
            comment: comment.into(),
            ..Self::default()
        }
    }

    /// An entry is translated when at least one slot is non-empty.
    #[must_use]
    pub fn is_translated(&self) -> bool {
        self.translations.iter().any(|translation| !translation.is_empty())
    }

    /// The first translation slot, or `""`.
    #[must_use]
    pub fn translation(&self) -> &str {
        self.translations.first().map_or("", String::as_str)
    }

    /// Replaces all slots with a single translation.
    pub fn set_translation(&mut self, translation: impl Into<String>) {
        self.translations = vec![translation.into()];
    }

    /// Placeholder entries carry a context-level comment and nothing else.
    #[must_use]
    pub fn is_context_comment(&self) -> bool {
        self.source_text.is_empty() && self.id.is_empty()
    }

    /// Primary reference followed by the extra ones.
    #[must_use]
    pub fn all_references(&self) -> Vec<Reference> {
        let Some(file_name) = &self.file_name else {
            return Vec::new();
        };
        std::iter::once(Reference::new(file_name.clone(), self.line_number))
            .chain(self.extra_refs.iter().cloned())
            .collect()
    }

    pub fn clear_references(&mut self) {
        self.file_name = None;
        self.line_number = -1;
        self.extra_refs.clear();
    }

    pub fn add_reference(&mut self, file_name: impl Into<PathBuf>, line_number: i32) {
        let file_name = file_name.into();
        if self.file_name.is_none() {
            self.file_name = Some(file_name);
            self.line_number = line_number;
        } else {
            self.extra_refs.push(Reference::new(file_name, line_number));
        }
    }

    /// Adds a reference unless the same (file, line) pair is already known.
    pub fn add_reference_uniq(&mut self, file_name: &Path, line_number: i32) {
        match &self.file_name {
            None => {
                self.file_name = Some(file_name.to_path_buf());
                self.line_number = line_number;
            }
            Some(primary) if primary == file_name && self.line_number == line_number => {}
            Some(_) => {
                let known = self
                    .extra_refs
                    .iter()
                    .any(|r| r.file_name == file_name && r.line_number == line_number);
                if !known {
                    self.extra_refs.push(Reference::new(file_name, line_number));
                }
            }
        }
    }

    pub fn set_references(&mut self, references: Vec<Reference>) {
        let mut references = references.into_iter();
        match references.next() {
            Some(first) => {
                self.file_name = Some(first.file_name);
                self.line_number = first.line_number;
                self.extra_refs = references.collect();
            }
            None => self.clear_references(),
        }
    }
}

/// Truncates `id` to `length` characters, marking the cut with `[...]`.
#[must_use]
pub fn elided_id(id: &str, length: usize) -> String {
    if id.chars().count() <= length {
        return id.to_string();
    }
    let mut elided: String = id.chars().take(length.saturating_sub(5)).collect();
    elided.push_str("[...]");
    elided
}

/// Human readable identity of an entry for diagnostics.
#[must_use]
pub fn make_msg_id(entry: &CatalogEntry) -> String {
    let mut id = format!("{}//{}", entry.context, elided_id(&entry.source_text, 100));
    if !entry.comment.is_empty() {
        id.push_str("//");
        id.push_str(&elided_id(&entry.comment, 30));
    }
    id
}
