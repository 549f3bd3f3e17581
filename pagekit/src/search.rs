//! Search-as-you-type suggestions.

use crate::context::PageContext;
use crate::debounce::{debounce, Debounced};
use crate::events::names;
use crate::page::{ElementId, Page, Selector};
use std::sync::Arc;
use tracing::{debug, info};

/// Where suggestions come from.
#[cfg_attr(test, mockall::automock)]
pub trait SuggestionSource: Send + Sync {
    /// Fetches suggestions for a trimmed query.
    fn fetch_suggestions(&self, query: &str);
}

/// Source that only logs the query; no suggestion backend exists yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSuggestionSource;

impl SuggestionSource for LoggingSuggestionSource {
    fn fetch_suggestions(&self, query: &str) {
        info!(query = %query, "Search suggestions for: {}", query);
    }
}

/// The search box behaviour: debounced suggestion fetches and hiding the
/// suggestion list.
#[derive(Debug)]
pub struct SearchBox {
    ctx: PageContext,
    input: ElementId,
    fetch: Debounced<String>,
}

impl SearchBox {
    /// Binds to `form[action*="search"]` and `input[name="q"]`.
    ///
    /// Returns `None` unless both exist.
    pub fn init(ctx: PageContext, source: Arc<dyn SuggestionSource>) -> Option<Self> {
        let page = ctx.page();
        page.query_selector(&Selector::tag("form").with_attr_containing("action", "search"))?;
        let input = page.query_selector(&Selector::tag("input").with_attr_eq("name", "q"))?;

        let events = ctx.clone();
        let fetch = debounce(
            Arc::clone(ctx.scheduler()),
            move |query: String| {
                source.fetch_suggestions(&query);
                events.try_emit_event(names::SEARCH_SUGGEST, Some(serde_json::json!({ "query": query })));
            },
            ctx.config().search.debounce(),
            false,
        );
        debug!(input = %input, "Search suggestions enabled");
        Some(Self { ctx, input, fetch })
    }

    /// The bound input element.
    #[must_use]
    pub fn input(&self) -> ElementId {
        self.input
    }

    /// Handles an `input` event on the search field.
    pub fn on_input(&self) {
        self.fetch.cancel();
        let value = self
            .ctx
            .page()
            .get(self.input)
            .map(|el| el.value)
            .unwrap_or_default();
        let query = value.trim();

        if query.chars().count() < self.ctx.config().search.min_query_chars {
            hide_suggestions(self.ctx.page());
            return;
        }
        self.fetch.trigger(query.to_string());
    }

    /// Handles a click anywhere on the document.
    pub fn on_document_click(&self, target: ElementId) {
        if self
            .ctx
            .page()
            .closest(target, &Selector::class("search-container"))
            .is_none()
        {
            hide_suggestions(self.ctx.page());
        }
    }

    /// Drops a suggestion fetch waiting for the quiet period.
    pub fn cancel_pending(&self) -> bool {
        self.fetch.cancel()
    }

    /// Whether a suggestion fetch is waiting for the quiet period.
    #[must_use]
    pub fn is_fetch_pending(&self) -> bool {
        self.fetch.is_pending()
    }
}

impl Drop for SearchBox {
    fn drop(&mut self) {
        self.fetch.cancel();
    }
}

/// Hides `.search-suggestions`, if present.
pub fn hide_suggestions(page: &Page) {
    if let Some(list) = page.query_selector(&Selector::class("search-suggestions")) {
        page.update(list, |el| {
            el.style.insert("display".to_string(), "none".to_string());
        });
    }
}
