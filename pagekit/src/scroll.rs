//! Smooth scrolling for in-page anchors.

use crate::context::PageContext;
use crate::page::{ElementId, ScrollBehavior, Selector};
use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::debug;

/// Handles clicks on `a[href^="#"]`.
#[derive(Debug)]
pub struct SmoothScroll {
    ctx: PageContext,
    anchors: Mutex<HashSet<ElementId>>,
}

impl SmoothScroll {
    /// Creates the handler with no anchors wired.
    #[must_use]
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            anchors: Mutex::new(HashSet::new()),
        }
    }

    /// Wires every in-page anchor currently on the page.
    pub fn wire_anchors(&self) -> usize {
        let found = self
            .ctx
            .page()
            .query_selector_all(&Selector::tag("a").with_attr_prefix("href", "#"));
        let count = found.len();
        self.anchors.lock().extend(found);
        count
    }

    /// Handles a click. Returns true if the default navigation was
    /// prevented because the page scrolled instead.
    pub fn on_click(&self, target: ElementId) -> bool {
        let page = self.ctx.page();
        let Some(anchor) = page.closest(target, &Selector::tag("a")) else {
            return false;
        };
        if !self.anchors.lock().contains(&anchor) {
            return false;
        }
        let Some(href) = page.get(anchor).and_then(|a| a.attr("href")) else {
            return false;
        };
        let Some(fragment) = href.strip_prefix('#').filter(|f| !f.is_empty()) else {
            return false;
        };
        let Some(destination) = page.get_element_by_id(fragment).and_then(|id| page.get(id)) else {
            debug!(href = %href, "Anchor target missing; default navigation proceeds");
            return false;
        };

        page.scroll_to(destination.offset_top, ScrollBehavior::Smooth);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Element, Viewport};
    use crate::testing::TestPage;

    fn setup() -> TestPage {
        let t = TestPage::new();
        t.page.set_viewport(Viewport::new(5000.0, 800.0));
        t.page
            .append_to_body(Element::new("section").with_id("izohlar").at_offset(1800.0));
        t
    }

    #[test]
    fn test_anchor_scrolls_smoothly_to_target() {
        let t = setup();
        let anchor = t.page.append_to_body(Element::new("a").with_attr("href", "#izohlar"));
        let scroll = SmoothScroll::new(t.ctx.clone());
        assert_eq!(scroll.wire_anchors(), 1);

        assert!(scroll.on_click(anchor));
        let viewport = t.page.viewport();
        assert_eq!(viewport.scroll_top, 1800.0);
        assert_eq!(viewport.last_behavior, ScrollBehavior::Smooth);
    }

    #[test]
    fn test_click_on_child_of_anchor() {
        let t = setup();
        let anchor = t.page.append_to_body(Element::new("a").with_attr("href", "#izohlar"));
        let icon = t.page.insert(anchor, Element::new("i")).unwrap();
        let scroll = SmoothScroll::new(t.ctx.clone());
        scroll.wire_anchors();

        assert!(scroll.on_click(icon));
    }

    #[test]
    fn test_empty_and_missing_targets_fall_through() {
        let t = setup();
        let bare = t.page.append_to_body(Element::new("a").with_attr("href", "#"));
        let dangling = t.page.append_to_body(Element::new("a").with_attr("href", "#yoq"));
        let external = t.page.append_to_body(Element::new("a").with_attr("href", "/yangilik/1"));
        let scroll = SmoothScroll::new(t.ctx.clone());
        assert_eq!(scroll.wire_anchors(), 2);

        assert!(!scroll.on_click(bare));
        assert!(!scroll.on_click(dangling));
        assert!(!scroll.on_click(external));
        assert_eq!(t.page.viewport().scroll_top, 0.0);
    }
}
