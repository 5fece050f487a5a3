//! Diagnostic queue for collecting and deduplicating diagnostics.
//!
//! Features:
//! - Processing-order preservation (the export walk is deterministic, so
//!   the order diagnostics were raised in is the order callers see)
//! - Error limits to prevent overwhelming output
//! - Deduplication of identical diagnostics raised for the same subject
//! - `ErrorGuaranteed` proof that errors were emitted

use rustc_hash::FxHashSet;

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed, Severity};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of warnings kept before further ones are dropped
    /// (0 = unlimited). Errors are never dropped.
    pub warning_limit: usize,
    /// Deduplicate diagnostics with the same code, subject and message.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            warning_limit: 0,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits and no deduplication (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            warning_limit: 0,
            deduplicate: false,
        }
    }
}

/// Queue for collecting diagnostics in the order they were raised.
///
/// # Example
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// queue.add(Diagnostic::warning(ErrorCode::W2001).with_message("..."));
/// let ordered = queue.flush();
/// ```
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    /// Fingerprints of queued diagnostics for dedup.
    seen: FxHashSet<(ErrorCode, Option<String>, String)>,
    error_count: usize,
    warning_count: usize,
    /// Warnings dropped because the limit was reached.
    suppressed: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic to the queue.
    ///
    /// Returns `true` if the diagnostic was added, `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        if diag.severity == Severity::Warning
            && self.config.warning_limit > 0
            && self.warning_count >= self.config.warning_limit
        {
            self.suppressed += 1;
            return false;
        }

        if self.config.deduplicate {
            let key = (diag.code, diag.subject.clone(), diag.message.clone());
            if !self.seen.insert(key) {
                return false;
            }
        }

        match diag.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Note => {}
        }
        self.diagnostics.push(diag);
        true
    }

    /// Emit an error diagnostic and get proof it was emitted.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diag.is_error(), "emit_error called with a non-error");
        self.add(diag);
        ErrorGuaranteed::new()
    }

    /// Get the number of errors collected.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Get the number of warnings collected.
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Number of warnings dropped because the warning limit was reached.
    pub fn suppressed_count(&self) -> usize {
        self.suppressed
    }

    /// Check if any errors were emitted and get proof if so.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Check whether a diagnostic with the given code has been queued.
    pub fn contains(&self, code: ErrorCode) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }

    /// Return the diagnostics in the order they were raised.
    ///
    /// Clears the queue after flushing.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let result = std::mem::take(&mut self.diagnostics);
        self.seen.clear();
        self.error_count = 0;
        self.warning_count = 0;
        self.suppressed = 0;
        result
    }

    /// Get diagnostics without clearing the queue.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Number of queued diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
