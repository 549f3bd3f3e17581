//! Page events for observability.
//!
//! Components report what they did (a banner shown, a share window opened,
//! a copy that failed) to the [`EventSink`] held by their
//! [`PageContext`](crate::context::PageContext).

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Event type names emitted by pagekit components.
pub mod names {
    /// A notification banner was attached.
    pub const NOTIFICATION_SHOWN: &str = "notification.shown";
    /// A notification banner was removed.
    pub const NOTIFICATION_REMOVED: &str = "notification.removed";
    /// Text reached the clipboard.
    pub const CLIPBOARD_COPIED: &str = "clipboard.copied";
    /// Both clipboard paths failed.
    pub const CLIPBOARD_FAILED: &str = "clipboard.failed";
    /// A share window was opened.
    pub const SHARE_OPENED: &str = "share.opened";
    /// A share was requested for an unknown platform.
    pub const SHARE_UNSUPPORTED: &str = "share.unsupported";
    /// A suggestion lookup ran.
    pub const SEARCH_SUGGEST: &str = "search.suggest";
    /// A lazy image received its source.
    pub const IMAGE_LOADED: &str = "image.loaded";
    /// Page features were initialised.
    pub const PAGE_INITIALIZED: &str = "page.initialized";
}
