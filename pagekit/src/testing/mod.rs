//! Testing utilities for pagekit.
//!
//! This module provides:
//! - Test doubles for the clipboard and suggestion capabilities
//! - A page fixture wired to a virtual clock and a collecting event sink

mod fixtures;
mod mocks;

pub use fixtures::TestPage;
pub use mocks::{FailingCopier, RecordingClipboard, RecordingSuggestionSource, RejectingClipboard};
