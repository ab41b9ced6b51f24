//! Accumulating diagnostic sink.
//!
//! Non-fatal problems found while merging, normalizing or encoding a catalog
//! (dropped ids, truncated plural forms, oversized context pools, merge
//! conflicts) are collected here instead of aborting the operation. Callers
//! decide whether to show them to a user or only log them.

/// Collected diagnostics of one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Messages in the order they were reported.
    errors: Vec<String>,
    /// Whether informational messages are kept.
    verbose: bool,
}

impl Diagnostics {
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new(), verbose: false }
    }

    /// Creates a sink that also collects informational messages.
    #[must_use]
    pub const fn verbose() -> Self {
        Self { errors: Vec::new(), verbose: true }
    }

    #[must_use]
    pub const fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub const fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Records a diagnostic and mirrors it to the log.
    pub fn append_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(diagnostic = %message, "Catalog diagnostic");
        self.errors.push(message);
    }

    /// Records an informational message; ignored unless the sink is verbose.
    pub fn append_info(&mut self, message: impl Into<String>) {
        if !self.verbose {
            return;
        }
        let message = message.into();
        tracing::info!(diagnostic = %message, "Catalog info");
        self.errors.push(message);
    }

    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// All diagnostics joined into one newline-terminated block.
    #[must_use]
    pub fn error(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        let mut out = self.errors.join("\n");
        out.push('\n');
        out
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }
}
