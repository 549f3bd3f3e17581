//! The page runtime: wires every component to one page and dispatches DOM
//! events to them.

use crate::clipboard::{BufferCopier, Clipboard, ClipboardService, CopyOutcome, FallbackCopier};
use crate::clock::ClockWidget;
use crate::config::PageConfig;
use crate::context::PageContext;
use crate::events::{names, EventSink};
use crate::forms::FormLoading;
use crate::lazy_images::{IntersectionEntry, LazyImages};
use crate::notify::{NotificationId, Notifier, Severity};
use crate::page::{ElementId, Page, Selector};
use crate::progress::ReadingProgress;
use crate::router::RouteFeatures;
use crate::scheduler::Scheduler;
use crate::scroll::SmoothScroll;
use crate::search::{LoggingSuggestionSource, SearchBox, SuggestionSource};
use crate::share::ShareService;
use crate::tooltips::TooltipRegistry;
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// A DOM event delivered to the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomEvent {
    /// A click on an element.
    Click {
        /// The clicked element.
        target: ElementId,
    },
    /// An `input` event on a form control.
    Input {
        /// The edited control.
        target: ElementId,
    },
    /// A form submission.
    Submit {
        /// The submitted form.
        form: ElementId,
    },
    /// The window scrolled; the page viewport holds the new position.
    Scroll,
    /// A batch of visibility changes.
    Intersection {
        /// The changes.
        entries: Vec<IntersectionEntry>,
    },
}

/// Builds a [`PageRuntime`].
pub struct PageRuntimeBuilder {
    page: Arc<Page>,
    scheduler: Arc<dyn Scheduler>,
    events: Option<Arc<dyn EventSink>>,
    config: PageConfig,
    clipboard: Option<Arc<dyn Clipboard>>,
    fallback: Arc<dyn FallbackCopier>,
    suggestions: Arc<dyn SuggestionSource>,
}

impl PageRuntimeBuilder {
    /// Sets the event sink.
    #[must_use]
    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: PageConfig) -> Self {
        self.config = config;
        self
    }

    /// Provides the async clipboard.
    #[must_use]
    pub fn clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    /// Replaces the legacy copy command.
    #[must_use]
    pub fn fallback(mut self, fallback: Arc<dyn FallbackCopier>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Replaces the suggestion source.
    #[must_use]
    pub fn suggestions(mut self, suggestions: Arc<dyn SuggestionSource>) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// Builds the runtime. Nothing is wired until [`PageRuntime::boot`].
    #[must_use]
    pub fn build(self) -> PageRuntime {
        let mut ctx = PageContext::new(self.page, self.scheduler).with_config(self.config);
        if let Some(events) = self.events {
            ctx = ctx.with_events(events);
        }

        let notifier = Notifier::new(ctx.clone());
        let mut clipboard = ClipboardService::new(ctx.clone(), notifier.clone(), self.fallback);
        if let Some(async_clipboard) = self.clipboard {
            clipboard = clipboard.with_clipboard(async_clipboard);
        }

        PageRuntime {
            share: ShareService::new(ctx.clone()),
            lazy_images: LazyImages::new(ctx.clone()),
            scroll: SmoothScroll::new(ctx.clone()),
            tooltips: TooltipRegistry::new(),
            suggestions: self.suggestions,
            search: None,
            clock: None,
            progress: None,
            forms: Vec::new(),
            features: RouteFeatures::default(),
            notifier,
            clipboard,
            ctx,
        }
    }
}

/// Page glue for one loaded page.
pub struct PageRuntime {
    ctx: PageContext,
    notifier: Notifier,
    clipboard: ClipboardService,
    share: ShareService,
    lazy_images: LazyImages,
    scroll: SmoothScroll,
    tooltips: TooltipRegistry,
    suggestions: Arc<dyn SuggestionSource>,
    search: Option<SearchBox>,
    clock: Option<ClockWidget>,
    progress: Option<ReadingProgress>,
    forms: Vec<FormLoading>,
    features: RouteFeatures,
}

impl PageRuntime {
    /// Starts building a runtime for `page` on `scheduler`.
    #[must_use]
    pub fn builder(page: Arc<Page>, scheduler: Arc<dyn Scheduler>) -> PageRuntimeBuilder {
        PageRuntimeBuilder {
            page,
            scheduler,
            events: None,
            config: PageConfig::default(),
            clipboard: None,
            fallback: Arc::new(BufferCopier::new()),
            suggestions: Arc::new(LoggingSuggestionSource),
        }
    }

    /// Route features first, then the document-ready components.
    pub fn boot(&mut self) -> RouteFeatures {
        let features = self.initialize_page();
        self.on_content_loaded();
        features
    }

    /// Starts the components every page gets: clock, search suggestions,
    /// lazy images, tooltips and smooth scrolling.
    pub fn on_content_loaded(&mut self) {
        let page = Arc::clone(self.ctx.page());
        // Widgets from an earlier pass cancel their timers when dropped.
        self.clock = None;
        self.search = None;
        self.clock = ClockWidget::start(self.ctx.clone());
        self.search = SearchBox::init(self.ctx.clone(), Arc::clone(&self.suggestions));
        let images = self.lazy_images.observe_all();
        let tooltips = self.tooltips.init(&page);
        let anchors = self.scroll.wire_anchors();
        debug!(
            clock = self.clock.is_some(),
            search = self.search.is_some(),
            images,
            tooltips,
            anchors,
            "Components initialized"
        );
    }

    /// Enables the feature sets the current path calls for.
    pub fn initialize_page(&mut self) -> RouteFeatures {
        let path = self.ctx.page().location().path;
        let features = RouteFeatures::for_path(&path);

        if features.admin {
            self.forms
                .extend(FormLoading::bind(self.ctx.clone(), &Selector::class("admin-form")));
            self.tooltips.init(self.ctx.page());
            info!("Admin features initialized");
        }
        if features.article {
            self.progress = Some(ReadingProgress::install(&self.ctx));
            self.share.wire_buttons();
            info!("Article page features initialized");
        }
        if features.home {
            info!("Home page features initialized");
        }

        self.features = features;
        self.ctx.try_emit_event(
            names::PAGE_INITIALIZED,
            Some(serde_json::json!({ "path": path, "features": features })),
        );
        features
    }

    /// Adds loading-state handling to the first form matching `selector`.
    pub fn handle_form_submission(&mut self, selector: &Selector) -> bool {
        match FormLoading::bind(self.ctx.clone(), selector) {
            Some(form) => {
                self.forms.push(form);
                true
            }
            None => false,
        }
    }

    /// Delivers a DOM event. Returns true if the default action was
    /// prevented.
    pub fn dispatch(&self, event: &DomEvent) -> bool {
        match event {
            DomEvent::Click { target } => {
                self.notifier.on_close_click(*target);
                let shared = self.share.on_click(*target);
                let scrolled = self.scroll.on_click(*target);
                if let Some(search) = &self.search {
                    search.on_document_click(*target);
                }
                shared || scrolled
            }
            DomEvent::Input { target } => {
                if let Some(search) = self.search.as_ref().filter(|s| s.input() == *target) {
                    search.on_input();
                }
                false
            }
            DomEvent::Submit { form } => {
                for bound in self.forms.iter().filter(|f| f.form() == *form) {
                    bound.on_submit();
                }
                false
            }
            DomEvent::Scroll => {
                if let Some(progress) = &self.progress {
                    progress.on_scroll();
                }
                false
            }
            DomEvent::Intersection { entries } => {
                self.lazy_images.on_intersection(entries);
                false
            }
        }
    }

    /// Dispatches every event of `events` until the stream ends. Returns
    /// the number of events delivered.
    pub async fn run<S>(&self, events: S) -> usize
    where
        S: Stream<Item = DomEvent>,
    {
        let mut events = std::pin::pin!(events);
        let mut delivered = 0;
        while let Some(event) = events.next().await {
            self.dispatch(&event);
            delivered += 1;
        }
        delivered
    }

    /// Stops the clock and drops any pending suggestion fetch.
    pub fn shutdown(&self) {
        if let Some(clock) = &self.clock {
            clock.stop();
        }
        if let Some(search) = &self.search {
            search.cancel_pending();
        }
    }

    /// Copies `text`, reporting the outcome as a notification.
    pub async fn copy_to_clipboard(&self, text: &str) -> CopyOutcome {
        self.clipboard.copy_to_clipboard(text).await
    }

    /// Shows a transient notification.
    pub fn show_notification(&self, message: impl Into<String>, severity: Severity) -> NotificationId {
        self.notifier.notify(message, severity)
    }

    /// Opens a share popup; see [`ShareService::share_to_social`].
    pub fn share_to_social(&self, platform: &str, url: Option<&str>, title: Option<&str>) -> Option<String> {
        self.share.share_to_social(platform, url, title)
    }

    /// See [`crate::format::format_number`].
    #[must_use]
    pub fn format_number(&self, value: f64) -> String {
        crate::format::format_number(value)
    }

    /// See [`crate::format::format_currency`].
    #[must_use]
    pub fn format_currency(&self, amount: f64) -> String {
        crate::format::format_currency(amount)
    }

    /// Formats `date` in the configured clock zone.
    #[must_use]
    pub fn format_uzbek_date(&self, date: DateTime<Utc>) -> String {
        crate::format::format_uzbek_date_in(
            date,
            crate::format::offset_from_minutes(self.ctx.config().clock.utc_offset_minutes),
        )
    }

    /// The notifier.
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// The tooltips created so far.
    #[must_use]
    pub fn tooltips(&self) -> &TooltipRegistry {
        &self.tooltips
    }

    /// The reading progress bar, on article pages.
    #[must_use]
    pub fn progress(&self) -> Option<&ReadingProgress> {
        self.progress.as_ref()
    }

    /// Features enabled by the last [`initialize_page`](Self::initialize_page).
    #[must_use]
    pub fn features(&self) -> RouteFeatures {
        self.features
    }

    /// The shared context.
    #[must_use]
    pub fn context(&self) -> &PageContext {
        &self.ctx
    }
}

impl std::fmt::Debug for PageRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRuntime")
            .field("features", &self.features)
            .field("clock", &self.clock.is_some())
            .field("search", &self.search.is_some())
            .field("forms", &self.forms.len())
            .finish_non_exhaustive()
    }
}
