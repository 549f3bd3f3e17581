//! Page fixtures.

use std::sync::Arc;
use std::time::Duration;

use crate::config::PageConfig;
use crate::context::PageContext;
use crate::events::CollectingEventSink;
use crate::page::{Location, Page};
use crate::scheduler::ManualScheduler;

/// A page on a virtual clock with every event captured.
#[derive(Debug, Clone)]
pub struct TestPage {
    /// The page.
    pub page: Arc<Page>,
    /// The virtual clock.
    pub clock: Arc<ManualScheduler>,
    /// Captured events.
    pub events: Arc<CollectingEventSink>,
    /// Context wired to the three above.
    pub ctx: PageContext,
}

impl TestPage {
    /// A page at `http://localhost/` with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::at("http://localhost/", "")
    }

    /// A page at `href` titled `title`.
    #[must_use]
    pub fn at(href: &str, title: &str) -> Self {
        Self::with_config(href, title, PageConfig::default())
    }

    /// A page at `href` with `config`.
    #[must_use]
    pub fn with_config(href: &str, title: &str, config: PageConfig) -> Self {
        let page = Arc::new(Page::new(Location::new(href, title)));
        let clock = Arc::new(ManualScheduler::new());
        let events = Arc::new(CollectingEventSink::new());
        let ctx = PageContext::new(page.clone(), clock.clone())
            .with_events(events.clone())
            .with_config(config);
        Self {
            page,
            clock,
            events,
            ctx,
        }
    }

    /// Advances the virtual clock by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.clock.advance(Duration::from_millis(ms));
    }
}

impl Default for TestPage {
    fn default() -> Self {
        Self::new()
    }
}
