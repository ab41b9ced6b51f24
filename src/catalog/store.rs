//! The message store: an ordered, lazily indexed sequence of entries.

use std::collections::{
    BTreeMap,
    BTreeSet,
    HashMap,
};
use std::fmt::Write as _;
use std::path::Path;

use serde::{
    Deserialize,
    Serialize,
};

use super::entry::{
    CONTEXT_COMMENT,
    CatalogEntry,
    EntryType,
    Reference,
    make_msg_id,
};
use super::index::{
    ContentKey,
    MessageIndex,
};
use crate::diagnostics::Diagnostics;
use crate::numerus;

/// Separator between merged extra-comment blocks.
pub const EXTRA_COMMENT_SEPARATOR: &str = "\n----------\n";

/// How the references of a catalog are to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationsType {
    None,
    Relative,
    #[default]
    Absolute,
}

/// Survivor positions of folded duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Duplicates {
    pub by_id: BTreeSet<usize>,
    pub by_contents: BTreeSet<usize>,
}

impl Duplicates {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.by_contents.is_empty()
    }
}

/// Content identity used while folding duplicates.
///
/// Context-comment placeholders (empty source) match on context alone.
type DuplicateKey = (String, String, Option<String>);

/// Duplicate key of `entry`.
fn duplicate_key(entry: &CatalogEntry) -> DuplicateKey {
    let comment = (!entry.source_text.is_empty()).then(|| entry.comment.clone());
    (entry.context.clone(), entry.source_text.clone(), comment)
}

/// Why an entry was folded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DuplicateKind {
    /// Same id as an earlier entry.
    Id,
    /// Same content identity as an earlier entry.
    Contents,
}

/// A whole catalog: entries plus catalog-level metadata.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Catalog {
    /// Entries in file order.
    messages: Vec<CatalogEntry>,
    /// Target language code, e.g. `de_DE`.
    language: String,
    /// Source language code.
    source_language: String,
    /// Catalogs loaded together with this one.
    dependencies: Vec<String>,
    /// Catalog-level extension values.
    extras: BTreeMap<String, String>,
    /// How references are to be interpreted.
    locations_type: LocationsType,

    /// Lookup cache over `messages`.
    #[serde(skip)]
    index: MessageIndex,
    /// Whether `index` reflects `messages`.
    #[serde(skip)]
    index_ok: bool,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn language_code(&self) -> &str {
        &self.language
    }

    pub fn set_language_code(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }

    #[must_use]
    pub fn source_language_code(&self) -> &str {
        &self.source_language
    }

    pub fn set_source_language_code(&mut self, language: impl Into<String>) {
        self.source_language = language.into();
    }

    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn set_dependencies(&mut self, dependencies: Vec<String>) {
        self.dependencies = dependencies;
    }

    #[must_use]
    pub const fn extras(&self) -> &BTreeMap<String, String> {
        &self.extras
    }

    #[must_use]
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extras.insert(key.into(), value.into());
    }

    #[must_use]
    pub const fn locations_type(&self) -> LocationsType {
        self.locations_type
    }

    pub const fn set_locations_type(&mut self, locations_type: LocationsType) {
        self.locations_type = locations_type;
    }

    #[must_use]
    pub fn messages(&self) -> &[CatalogEntry] {
        &self.messages
    }

    /// Direct access to the entry sequence. Invalidates the indices.
    pub fn messages_mut(&mut self) -> &mut Vec<CatalogEntry> {
        self.index_ok = false;
        &mut self.messages
    }

    #[must_use]
    pub fn into_messages(self) -> Vec<CatalogEntry> {
        self.messages
    }

    #[must_use]
    pub fn message(&self, position: usize) -> Option<&CatalogEntry> {
        self.messages.get(position)
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Rebuilds the indices if a mutation left them stale.
    fn ensure_indexed(&mut self) {
        if !self.index_ok {
            self.index.rebuild(&self.messages);
            self.index_ok = true;
        }
    }

    /// Position of the entry matching `entry`.
    ///
    /// An id match wins. When `entry` has an id that is not indexed, a
    /// content match is only accepted if the matched entry has no id of its
    /// own, so two distinct ids are never merged because of equal text.
    pub fn find(&mut self, entry: &CatalogEntry) -> Option<usize> {
        self.ensure_indexed();
        let content_key = ContentKey::of(entry);
        if entry.id.is_empty() {
            return self.index.by_content(&content_key);
        }
        if let Some(position) = self.index.by_id(&entry.id) {
            return Some(position);
        }
        self.index
            .by_content(&content_key)
            .filter(|&position| self.messages.get(position).is_some_and(|m| m.id.is_empty()))
    }

    pub fn find_by_id(&mut self, id: &str) -> Option<usize> {
        self.ensure_indexed();
        self.index.by_id(id)
    }

    /// Position of the context-comment placeholder of `context`.
    pub fn find_context_comment(&mut self, context: &str) -> Option<usize> {
        self.ensure_indexed();
        self.index.by_context(context)
    }

    /// First entry with the given context and comment sharing a reference
    /// with `references`.
    #[must_use]
    pub fn find_by_context_comment_refs(
        &self,
        context: &str,
        comment: &str,
        references: &[Reference],
    ) -> Option<usize> {
        self.messages.iter().position(|entry| {
            entry.context == context
                && entry.comment == comment
                && entry.all_references().iter().any(|reference| references.contains(reference))
        })
    }

    /// Inserts at `position` (clamped to the end).
    ///
    /// Appending keeps the indices current; anything else marks them stale.
    pub fn insert(&mut self, position: usize, entry: CatalogEntry) {
        let position = position.min(self.messages.len());
        if self.index_ok {
            if position == self.messages.len() {
                self.index.add(position, &entry);
            } else {
                self.index_ok = false;
            }
        }
        self.messages.insert(position, entry);
    }

    pub fn append(&mut self, entry: CatalogEntry) {
        self.insert(self.messages.len(), entry);
    }

    /// Inserts `entry` next to entries of the same file and context whose
    /// line numbers bracket it.
    ///
    /// Runs of same-file entries with ascending lines are scored: a run the
    /// new line falls inside beats a run it only extends, and longer runs
    /// beat shorter ones of the same score. Without any qualifying run the
    /// entry is appended.
    pub fn append_sorted(&mut self, entry: CatalogEntry) {
        let line = entry.line_number;
        if line < 0 {
            self.append(entry);
            return;
        }

        // 0 = no hit, 1 = before or after a run, 2 = inside a run
        let (mut best_index, mut best_score, mut best_size) = (0_usize, 0_u8, 0_usize);
        let (mut this_index, mut this_score, mut this_size) = (0_usize, 0_u8, 0_usize);
        let mut previous_line = 0;

        for (current, existing) in self.messages.iter().enumerate() {
            let same_file =
                existing.file_name == entry.file_name && existing.context == entry.context;
            let current_line = existing.line_number;
            if same_file && current_line >= previous_line {
                if previous_line <= line && line < current_line {
                    this_index = current;
                    this_score = if this_size > 0 { 2 } else { 1 };
                }
                this_size += 1;
                previous_line = current_line;
            } else if this_size > 0 {
                if this_score == 0 {
                    this_index = current;
                    this_score = 1;
                }
                if this_score > best_score || (this_score == best_score && this_size > best_size)
                {
                    best_index = this_index;
                    best_score = this_score;
                    best_size = this_size;
                }
                this_score = 0;
                this_size = usize::from(same_file);
                previous_line = 0;
            }
        }
        if this_size > 0 && this_score == 0 {
            this_index = self.messages.len();
            this_score = 1;
        }

        if this_score > best_score || (this_score == best_score && this_size > best_size) {
            self.insert(this_index, entry);
        } else if best_score > 0 {
            self.insert(best_index, entry);
        } else {
            self.append(entry);
        }
    }

    /// Replaces the matching entry in place, or sorts `entry` in.
    pub fn replace_sorted(&mut self, entry: CatalogEntry) {
        let Some(position) = self.find(&entry) else {
            self.append_sorted(entry);
            return;
        };
        if let Some(slot) = self.messages.get_mut(position) {
            self.index.remove(slot);
            self.index.add(position, &entry);
            *slot = entry;
        }
    }

    /// Merges a freshly scanned single-location entry.
    ///
    /// A matching entry gains the source text if it had none, the new
    /// reference and the new extra comment. Contradicting source text or
    /// metadata is reported and leaves the existing entry untouched.
    pub fn extend(&mut self, entry: CatalogEntry, diagnostics: &mut Diagnostics) {
        let Some(position) = self.find(&entry) else {
            self.append(entry);
            return;
        };
        let Some(existing) = self.messages.get_mut(position) else {
            return;
        };

        if existing.source_text.is_empty() {
            self.index.remove(existing);
            existing.source_text.clone_from(&entry.source_text);
            self.index.add(position, existing);
        } else if !entry.source_text.is_empty() && existing.source_text != entry.source_text {
            diagnostics.append_error(format!(
                "Contradicting source strings for message with id '{}'.",
                existing.id
            ));
            return;
        }

        if existing.extras.is_empty() {
            existing.extras = entry.extras;
        } else if !entry.extras.is_empty() && existing.extras != entry.extras {
            if existing.id.is_empty() {
                diagnostics.append_error(format!(
                    "Contradicting meta data for message '{}'.",
                    make_msg_id(&entry)
                ));
            } else {
                diagnostics.append_error(format!(
                    "Contradicting meta data for message with id '{}'.",
                    existing.id
                ));
            }
            return;
        }

        if let Some(file_name) = &entry.file_name {
            existing.add_reference_uniq(file_name, entry.line_number);
        }

        if !entry.extra_comment.is_empty() {
            if existing.extra_comment.is_empty() {
                existing.extra_comment = entry.extra_comment;
            } else if !existing
                .extra_comment
                .split(EXTRA_COMMENT_SEPARATOR)
                .any(|block| block == entry.extra_comment)
            {
                existing.extra_comment.push_str(EXTRA_COMMENT_SEPARATOR);
                existing.extra_comment.push_str(&entry.extra_comment);
            }
        }
    }

    /// Removes every entry `remove` accepts.
    fn strip(&mut self, pass: &'static str, mut remove: impl FnMut(&CatalogEntry) -> bool) {
        let before = self.messages.len();
        self.messages.retain(|entry| !remove(entry));
        let removed = before - self.messages.len();
        if removed > 0 {
            self.index_ok = false;
            tracing::debug!(pass, removed, "Stripped messages");
        }
    }

    pub fn strip_obsolete_messages(&mut self) {
        self.strip("obsolete", |entry| entry.entry_type.is_retired());
    }

    pub fn strip_finished_messages(&mut self) {
        self.strip("finished", |entry| entry.entry_type == EntryType::Finished);
    }

    pub fn strip_untranslated_messages(&mut self) {
        self.strip("untranslated", |entry| !entry.is_translated());
    }

    /// Removes context-comment placeholders.
    pub fn strip_empty_contexts(&mut self) {
        self.strip("empty contexts", |entry| {
            entry.source_text == CONTEXT_COMMENT || entry.is_context_comment()
        });
    }

    pub fn strip_non_plural_forms(&mut self) {
        self.strip("non-plural", |entry| !entry.plural);
    }

    /// Removes entries whose only translation equals the source text.
    pub fn strip_identical_source_translations(&mut self) {
        self.strip("identical", |entry| {
            matches!(entry.translations.as_slice(), [only] if *only == entry.source_text)
        });
    }

    /// Resets every entry to a single empty translation.
    pub fn drop_translations(&mut self) {
        for entry in &mut self.messages {
            if entry.entry_type == EntryType::Finished {
                entry.entry_type = EntryType::Unfinished;
            }
            entry.set_translation("");
        }
    }

    /// Resolves every reference against `root`.
    pub fn make_file_names_absolute(&mut self, root: &Path) {
        for entry in &mut self.messages {
            let references = entry
                .all_references()
                .into_iter()
                .map(|reference| Reference::new(root.join(reference.file_name), reference.line_number))
                .collect();
            entry.set_references(references);
        }
    }

    #[must_use]
    pub fn translations_exist(&self) -> bool {
        self.messages.iter().any(CatalogEntry::is_translated)
    }

    /// Folds duplicate entries into their first occurrence.
    ///
    /// An entry whose id was already seen is a duplicate by id. Otherwise it
    /// is a duplicate by contents when an entry with the same content
    /// identity exists and at most one of the two has an id; the id then
    /// moves to the survivor. A translated duplicate hands its translations
    /// to an untranslated survivor. Duplicates are removed from the store.
    pub fn resolve_duplicates(&mut self) -> Duplicates {
        let mut duplicates = Duplicates::default();
        let mut seen_ids: HashMap<String, usize> = HashMap::new();
        let mut seen_contents: HashMap<DuplicateKey, usize> = HashMap::new();

        let mut i = 0;
        while let Some(entry) = self.messages.get(i) {
            let content_key = duplicate_key(entry);

            let mut survivor = None;
            if !entry.id.is_empty() {
                survivor = seen_ids.get(&entry.id).map(|&other| (other, DuplicateKind::Id));
            }
            if survivor.is_none() {
                if let Some(&other) = seen_contents.get(&content_key) {
                    let other_has_id =
                        self.messages.get(other).is_some_and(|other| !other.id.is_empty());
                    if entry.id.is_empty() || !other_has_id {
                        survivor = Some((other, DuplicateKind::Contents));
                    }
                }
            }

            let Some((other, kind)) = survivor else {
                if !entry.id.is_empty() {
                    seen_ids.entry(entry.id.clone()).or_insert(i);
                }
                seen_contents.entry(content_key).or_insert(i);
                i += 1;
                continue;
            };

            let duplicate = self.messages.remove(i);
            self.index_ok = false;
            if let Some(kept) = self.messages.get_mut(other) {
                if kind == DuplicateKind::Contents && kept.id.is_empty() && !duplicate.id.is_empty()
                {
                    kept.id.clone_from(&duplicate.id);
                    seen_ids.insert(duplicate.id.clone(), other);
                }
                if !kept.is_translated() && duplicate.is_translated() {
                    kept.translations = duplicate.translations;
                }
            }
            match kind {
                DuplicateKind::Id => duplicates.by_id.insert(other),
                DuplicateKind::Contents => duplicates.by_contents.insert(other),
            };
        }

        if !duplicates.is_empty() {
            tracing::debug!(
                by_id = duplicates.by_id.len(),
                by_contents = duplicates.by_contents.len(),
                "Folded duplicate messages"
            );
        }
        duplicates
    }

    /// Formats the warning printed for folded duplicates.
    ///
    /// Returns nothing when there were no duplicates.
    #[must_use]
    pub fn report_duplicates(
        &self,
        duplicates: &Duplicates,
        file_name: &Path,
        verbose: bool,
    ) -> Vec<String> {
        if duplicates.is_empty() {
            return Vec::new();
        }
        let header = format!("Warning: dropping duplicate messages in '{}'", file_name.display());
        if !verbose {
            return vec![format!("{header}\n(try --verbose for more info).")];
        }

        let mut report = vec![format!("{header}:")];
        for entry in duplicates.by_id.iter().filter_map(|&i| self.messages.get(i)) {
            report.push(format!("* ID: {}", entry.id));
        }
        for entry in duplicates.by_contents.iter().filter_map(|&i| self.messages.get(i)) {
            let mut block =
                format!("* Context: {}\n* Source: {}", entry.context, entry.source_text);
            if !entry.comment.is_empty() {
                let _ = write!(block, "\n* Comment: {}", entry.comment);
            }
            if entry.ts_line_number >= 0 {
                let _ = write!(block, "\n* Line in .ts File: {}", entry.ts_line_number);
            }
            report.push(block);
        }
        report
    }

    /// Plural form count of the target language, 1 when it is unknown.
    #[must_use]
    pub fn plural_form_count(&self) -> usize {
        numerus::form_count(&self.language).unwrap_or(1)
    }

    /// Pads or truncates every entry to the slot count it needs.
    ///
    /// Non-plural entries get one slot, plural entries one per form of the
    /// target language. Dropped forms and padded translated plurals are
    /// reported.
    pub fn normalize_translations(&mut self, diagnostics: &mut Diagnostics) {
        let form_count = self.plural_form_count();
        let mut truncated = false;
        let mut padded = 0_usize;

        for entry in &mut self.messages {
            let expected = if entry.plural { form_count } else { 1 };
            let actual = entry.translations.len();
            if actual > expected {
                entry.translations.truncate(expected);
                truncated = true;
            } else if actual < expected {
                if entry.plural && entry.is_translated() {
                    padded += 1;
                }
                entry.translations.resize(expected, String::new());
            }
        }

        if truncated {
            diagnostics.append_error(
                "Removed plural forms as the target language has less forms.\nIf this sounds \
                 wrong, possibly the target language is not set or recognized.",
            );
        }
        if padded > 0 {
            diagnostics.append_error(format!(
                "Added empty plural forms to {padded} message(s) as the target language has \
                 more forms."
            ));
        }
    }
}

/// Pads or truncates `entry`'s translations to `form_count` slots (one for
/// non-plural entries).
#[must_use]
pub fn normalized_translations(entry: &CatalogEntry, form_count: usize) -> Vec<String> {
    let expected = if entry.plural { form_count } else { 1 };
    let mut translations = entry.translations.clone();
    translations.resize(expected, String::new());
    translations
}
