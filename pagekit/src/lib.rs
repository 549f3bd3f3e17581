//! # Pagekit
//!
//! The page-enhancement layer of the UzbekNews reader, running headless.
//!
//! Pagekit drives the small behaviours a news page layers over its markup:
//!
//! - **Debouncing**: bursts of input collapse into one delayed (or one
//!   leading) call
//! - **Notifications**: transient banners with guaranteed, idempotent removal
//! - **Sharing and copying**: social share links and clipboard copy with a
//!   legacy fallback
//! - **Page features**: clock, search suggestions, lazy images, tooltips,
//!   anchor scrolling, reading progress and form loading states, enabled per
//!   route
//!
//! Browser capabilities are injected: timers through a
//! [`Scheduler`](scheduler::Scheduler), the document through a
//! [`Page`](page::Page), the clipboard through
//! [`Clipboard`](clipboard::Clipboard).
//!
//! ## Quick Start
//!
//! ```rust
//! use pagekit::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let page = Arc::new(Page::new(Location::new("https://news.uz/yangilik/42", "Yangilik")));
//! let clock = Arc::new(ManualScheduler::new());
//!
//! let mut runtime = PageRuntime::builder(page.clone(), clock.clone()).build();
//! let features = runtime.boot();
//! assert!(features.article);
//!
//! runtime.show_notification("Saqlandi", Severity::Success);
//! clock.advance(Duration::from_secs(3));
//! assert_eq!(runtime.notifier().visible_count(), 0);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod clipboard;
pub mod clock;
pub mod config;
pub mod context;
pub mod debounce;
pub mod errors;
pub mod events;
pub mod format;
pub mod forms;
pub mod lazy_images;
pub mod notify;
pub mod observability;
pub mod page;
pub mod progress;
pub mod router;
pub mod runtime;
pub mod scheduler;
pub mod scroll;
pub mod search;
pub mod share;
pub mod testing;
pub mod tooltips;

#[cfg(test)]
mod integration_tests;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clipboard::{BufferCopier, Clipboard, CopyOutcome, FallbackCopier};
    pub use crate::config::PageConfig;
    pub use crate::context::PageContext;
    pub use crate::debounce::{debounce, Debounced};
    pub use crate::errors::{ClipboardError, PageError};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::format::{format_currency, format_number, format_uzbek_date};
    pub use crate::notify::{Notification, NotificationId, NotificationState, Notifier, Severity};
    pub use crate::observability::{init_logging, LogFormat};
    pub use crate::page::{Element, ElementId, Location, Page, Selector, Viewport};
    pub use crate::runtime::{DomEvent, PageRuntime};
    pub use crate::scheduler::{ManualScheduler, Scheduler, SchedulerExt, TimerHandle, TokioScheduler};
    pub use crate::share::{share_link, SharePlatform};
}
