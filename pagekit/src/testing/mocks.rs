//! Test doubles for page capabilities.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::clipboard::{Clipboard, FallbackCopier};
use crate::errors::ClipboardError;
use crate::page::{ElementId, Page};
use crate::search::SuggestionSource;

/// A clipboard that accepts every write and remembers it.
#[derive(Debug, Default)]
pub struct RecordingClipboard {
    writes: Mutex<Vec<String>>,
}

impl RecordingClipboard {
    /// Creates an empty recording clipboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every text written, oldest first.
    #[must_use]
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().clone()
    }
}

#[async_trait]
impl Clipboard for RecordingClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.writes.lock().push(text.to_string());
        Ok(())
    }
}

/// A clipboard that rejects every write.
#[derive(Debug, Clone)]
pub struct RejectingClipboard {
    reason: String,
}

impl RejectingClipboard {
    /// Creates a clipboard rejecting with `reason`.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl Default for RejectingClipboard {
    fn default() -> Self {
        Self::new("Document is not focused")
    }
}

#[async_trait]
impl Clipboard for RejectingClipboard {
    async fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Rejected(self.reason.clone()))
    }
}

/// A legacy copy command that never succeeds.
#[derive(Debug, Clone)]
pub struct FailingCopier {
    error: Option<ClipboardError>,
    calls: std::sync::Arc<Mutex<usize>>,
}

impl FailingCopier {
    /// The command runs and reports `false`.
    #[must_use]
    pub fn returning_false() -> Self {
        Self {
            error: None,
            calls: std::sync::Arc::default(),
        }
    }

    /// The command throws.
    #[must_use]
    pub fn erroring() -> Self {
        Self {
            error: Some(ClipboardError::CommandFailed("execCommand is not supported".to_string())),
            calls: std::sync::Arc::default(),
        }
    }

    /// Number of times the command ran.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

impl FallbackCopier for FailingCopier {
    fn exec_copy(&self, _page: &Page, _textarea: ElementId) -> Result<bool, ClipboardError> {
        *self.calls.lock() += 1;
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(false),
        }
    }
}

/// A suggestion source that records every query.
#[derive(Debug, Default)]
pub struct RecordingSuggestionSource {
    queries: Mutex<Vec<String>>,
}

impl RecordingSuggestionSource {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every query fetched, oldest first.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

impl SuggestionSource for RecordingSuggestionSource {
    fn fetch_suggestions(&self, query: &str) {
        self.queries.lock().push(query.to_string());
    }
}
