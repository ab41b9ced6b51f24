//! Derived lookup indices of a [`Catalog`](super::Catalog).
//!
//! The indices are cache state. The store marks them stale whenever the
//! entry sequence changes in a way that shifts positions and rebuilds them
//! on the next lookup.

use std::collections::HashMap;

use super::entry::CatalogEntry;

/// Content identity: (context, source text, comment).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey {
    pub context: String,
    pub source_text: String,
    pub comment: String,
}

impl ContentKey {
    #[must_use]
    pub fn of(entry: &CatalogEntry) -> Self {
        Self {
            context: entry.context.clone(),
            source_text: entry.source_text.clone(),
            comment: entry.comment.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MessageIndex {
    /// Entries keyed by content identity.
    by_content: HashMap<ContentKey, usize>,
    /// Entries with an id.
    by_id: HashMap<String, usize>,
    /// Context-comment placeholders, keyed by context.
    by_context: HashMap<String, usize>,
}

impl MessageIndex {
    pub fn clear(&mut self) {
        self.by_content.clear();
        self.by_id.clear();
        self.by_context.clear();
    }

    pub fn rebuild(&mut self, messages: &[CatalogEntry]) {
        self.clear();
        for (position, entry) in messages.iter().enumerate() {
            self.add(position, entry);
        }
        tracing::trace!(messages = messages.len(), "Rebuilt catalog indices");
    }

    /// Registers `entry` at `position` in the one category it belongs to.
    pub fn add(&mut self, position: usize, entry: &CatalogEntry) {
        if entry.is_context_comment() {
            self.by_context.insert(entry.context.clone(), position);
            return;
        }
        self.by_content.insert(ContentKey::of(entry), position);
        if !entry.id.is_empty() {
            self.by_id.insert(entry.id.clone(), position);
        }
    }

    pub fn remove(&mut self, entry: &CatalogEntry) {
        if entry.is_context_comment() {
            self.by_context.remove(&entry.context);
            return;
        }
        self.by_content.remove(&ContentKey::of(entry));
        if !entry.id.is_empty() {
            self.by_id.remove(&entry.id);
        }
    }

    #[must_use]
    pub fn by_content(&self, key: &ContentKey) -> Option<usize> {
        self.by_content.get(key).copied()
    }

    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    #[must_use]
    pub fn by_context(&self, context: &str) -> Option<usize> {
        self.by_context.get(context).copied()
    }
}
