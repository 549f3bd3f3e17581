//! Copy-to-clipboard with a legacy fallback.
//!
//! The async clipboard is tried first. If it is missing or rejects the
//! write, the text is placed in a temporary `textarea` and the legacy copy
//! command runs against it. The caller never sees an error: the outcome is
//! reported through a notification.

use crate::context::PageContext;
use crate::errors::ClipboardError;
use crate::events::names;
use crate::notify::{Notifier, Severity};
use crate::page::{Element, ElementId, Page};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// The async clipboard capability (`navigator.clipboard`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Writes `text` to the system clipboard.
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The legacy copy command, run against a selected textarea.
pub trait FallbackCopier: Send + Sync {
    /// Copies the contents of `textarea`.
    ///
    /// `Ok(false)` means the command ran but reported failure.
    fn exec_copy(&self, page: &Page, textarea: ElementId) -> Result<bool, ClipboardError>;
}

/// Fallback copier that keeps the copied text in memory.
///
/// Succeeds whenever the textarea is attached to the page.
#[derive(Debug, Default)]
pub struct BufferCopier {
    buffer: Mutex<Option<String>>,
}

impl BufferCopier {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last copied text.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.buffer.lock().clone()
    }
}

impl FallbackCopier for BufferCopier {
    fn exec_copy(&self, page: &Page, textarea: ElementId) -> Result<bool, ClipboardError> {
        if !page.contains(textarea) {
            return Ok(false);
        }
        let value = page
            .get(textarea)
            .map(|el| el.value)
            .ok_or_else(|| ClipboardError::CommandFailed(format!("{textarea} vanished")))?;
        *self.buffer.lock() = Some(value);
        Ok(true)
    }
}

/// How a copy ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyOutcome {
    /// Written through the async clipboard.
    Clipboard,
    /// Written by the legacy copy command.
    Fallback,
    /// Both paths failed.
    Failed,
}

impl CopyOutcome {
    /// Whether the text reached the clipboard.
    #[must_use]
    pub const fn is_success(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Copies text and reports the outcome as a notification.
pub struct ClipboardService {
    ctx: PageContext,
    notifier: Notifier,
    clipboard: Option<Arc<dyn Clipboard>>,
    fallback: Arc<dyn FallbackCopier>,
}

impl ClipboardService {
    /// Creates a service with only the fallback path.
    #[must_use]
    pub fn new(ctx: PageContext, notifier: Notifier, fallback: Arc<dyn FallbackCopier>) -> Self {
        Self {
            ctx,
            notifier,
            clipboard: None,
            fallback,
        }
    }

    /// Adds the async clipboard capability.
    #[must_use]
    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    /// Copies `text`.
    pub async fn copy_to_clipboard(&self, text: &str) -> CopyOutcome {
        if let Some(clipboard) = &self.clipboard {
            match clipboard.write_text(text).await {
                Ok(()) => {
                    self.succeeded(CopyOutcome::Clipboard, text);
                    return CopyOutcome::Clipboard;
                }
                Err(err) => {
                    error!(error = %err, "Failed to copy text");
                }
            }
        }
        self.fallback_copy(text)
    }

    fn fallback_copy(&self, text: &str) -> CopyOutcome {
        let page = self.ctx.page();
        let textarea = page.append_to_body(
            Element::new("textarea")
                .with_value(text)
                .with_style("top", "0")
                .with_style("left", "0")
                .with_style("position", "fixed"),
        );

        let result = self.fallback.exec_copy(page, textarea);
        page.remove(textarea);

        match result {
            Ok(true) => {
                self.succeeded(CopyOutcome::Fallback, text);
                CopyOutcome::Fallback
            }
            Ok(false) => {
                warn!("Fallback copy command reported failure");
                self.failed("command returned false");
                CopyOutcome::Failed
            }
            Err(err) => {
                error!(error = %err, "Fallback: unable to copy");
                self.failed(&err.to_string());
                CopyOutcome::Failed
            }
        }
    }

    fn succeeded(&self, outcome: CopyOutcome, text: &str) {
        debug!(?outcome, chars = text.chars().count(), "Text copied");
        self.notifier
            .notify(self.ctx.config().messages.copy_success.clone(), Severity::Success);
        self.ctx.try_emit_event(
            names::CLIPBOARD_COPIED,
            Some(serde_json::json!({ "via": outcome })),
        );
    }

    fn failed(&self, reason: &str) {
        self.notifier
            .notify(self.ctx.config().messages.copy_failure.clone(), Severity::Error);
        self.ctx.try_emit_event(
            names::CLIPBOARD_FAILED,
            Some(serde_json::json!({ "reason": reason })),
        );
    }
}

impl std::fmt::Debug for ClipboardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardService")
            .field("has_clipboard", &self.clipboard.is_some())
            .finish_non_exhaustive()
    }
}
