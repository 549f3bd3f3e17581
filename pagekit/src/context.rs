//! The shared handles every page component works against.

use crate::config::PageConfig;
use crate::events::{EventSink, NoOpEventSink};
use crate::page::Page;
use crate::scheduler::Scheduler;
use std::sync::Arc;

/// Page, timers, event sink and configuration, bundled.
///
/// Cheap to clone; components keep their own copy and move clones into timer
/// callbacks.
#[derive(Clone)]
pub struct PageContext {
    page: Arc<Page>,
    scheduler: Arc<dyn Scheduler>,
    events: Arc<dyn EventSink>,
    config: Arc<PageConfig>,
}

impl PageContext {
    /// Creates a context with a no-op event sink and default configuration.
    #[must_use]
    pub fn new(page: Arc<Page>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            page,
            scheduler,
            events: Arc::new(NoOpEventSink),
            config: Arc::new(PageConfig::default()),
        }
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: PageConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// The page.
    #[must_use]
    pub fn page(&self) -> &Arc<Page> {
        &self.page
    }

    /// The scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Emits an event without blocking.
    pub fn try_emit_event(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.try_emit(event_type, data);
    }

    /// Emits an event asynchronously.
    pub async fn emit_event(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.emit(event_type, data).await;
    }
}

impl std::fmt::Debug for PageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContext")
            .field("page", &self.page)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
