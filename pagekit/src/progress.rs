//! Reading progress bar for article pages.

use crate::context::PageContext;
use crate::debounce::{debounce, Debounced};
use crate::page::{Element, ElementId, Page, Viewport};
use std::sync::Arc;

/// Id of the bar element.
pub const PROGRESS_BAR_ID: &str = "reading-progress";

/// Percentage of the document scrolled, in `[0, 100]`.
///
/// A document that cannot scroll reads as 0%.
#[must_use]
pub fn scroll_percent(viewport: &Viewport) -> f64 {
    let scrollable = viewport.scroll_height - viewport.client_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    (viewport.scroll_top / scrollable * 100.0).clamp(0.0, 100.0)
}

/// The installed bar and its debounced scroll handler.
#[derive(Debug)]
pub struct ReadingProgress {
    bar: ElementId,
    on_scroll: Debounced<()>,
}

impl ReadingProgress {
    /// Appends the bar to the body and starts tracking scroll.
    pub fn install(ctx: &PageContext) -> Self {
        let bar = ctx.page().append_to_body(
            Element::new("div")
                .with_id(PROGRESS_BAR_ID)
                .with_style("position", "fixed")
                .with_style("top", "0")
                .with_style("left", "0")
                .with_style("width", "0%")
                .with_style("height", "3px")
                .with_style("background", "linear-gradient(to right, #0066cc, #00cc66)")
                .with_style("z-index", "9999")
                .with_style("transition", "width 0.3s ease"),
        );

        let page = Arc::clone(ctx.page());
        let on_scroll = debounce(
            Arc::clone(ctx.scheduler()),
            move |()| update_width(&page, bar),
            ctx.config().progress.debounce(),
            false,
        );
        Self { bar, on_scroll }
    }

    /// The bar element.
    #[must_use]
    pub fn bar(&self) -> ElementId {
        self.bar
    }

    /// Handles a window scroll event.
    pub fn on_scroll(&self) {
        self.on_scroll.trigger(());
    }
}

fn update_width(page: &Page, bar: ElementId) {
    let percent = scroll_percent(&page.viewport());
    page.update(bar, |el| {
        el.style.insert("width".to_string(), format!("{percent}%"));
    });
}
