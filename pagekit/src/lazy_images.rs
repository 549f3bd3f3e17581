//! Deferred image loading driven by visibility.

use crate::context::PageContext;
use crate::events::names;
use crate::page::{ElementId, Selector};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// One visibility change reported by the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    /// The observed element.
    pub target: ElementId,
    /// Whether it is now in view.
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    /// An entry reporting `target` as visible.
    #[must_use]
    pub const fn visible(target: ElementId) -> Self {
        Self {
            target,
            is_intersecting: true,
        }
    }
}

/// Observes `img[data-src]` and swaps in the real source once visible.
#[derive(Debug)]
pub struct LazyImages {
    ctx: PageContext,
    observed: Mutex<BTreeSet<ElementId>>,
}

impl LazyImages {
    /// Creates an observer with nothing observed.
    #[must_use]
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            observed: Mutex::new(BTreeSet::new()),
        }
    }

    /// Starts observing every `img[data-src]` on the page.
    ///
    /// Does nothing when the page has no visibility observer. Returns the
    /// number of images now observed.
    pub fn observe_all(&self) -> usize {
        let page = self.ctx.page();
        if !page.supports_intersection_observer() {
            debug!("Visibility observer unavailable; images load eagerly");
            return 0;
        }
        let images = page.query_selector_all(&Selector::tag("img").with_attr("data-src"));
        let mut observed = self.observed.lock();
        observed.extend(images);
        observed.len()
    }

    /// Whether `image` is being observed.
    #[must_use]
    pub fn is_observed(&self, image: ElementId) -> bool {
        self.observed.lock().contains(&image)
    }

    /// Handles an observer callback.
    ///
    /// Returns the images loaded by this batch.
    pub fn on_intersection(&self, entries: &[IntersectionEntry]) -> Vec<ElementId> {
        let page = self.ctx.page();
        let mut loaded = Vec::new();
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            if !self.observed.lock().remove(&entry.target) {
                continue;
            }
            let src = page.update(entry.target, |img| {
                let src = img.data("src").unwrap_or_default().to_string();
                img.set_attr("src", src.clone());
                img.remove_class("lazy");
                src
            });
            if let Some(src) = src {
                self.ctx
                    .try_emit_event(names::IMAGE_LOADED, Some(serde_json::json!({ "src": src })));
                loaded.push(entry.target);
            }
        }
        loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Element;
    use crate::testing::TestPage;

    fn lazy_img(t: &TestPage, src: &str) -> ElementId {
        t.page.append_to_body(
            Element::new("img")
                .with_class("lazy")
                .with_attr("data-src", src)
                .with_attr("src", "placeholder.gif"),
        )
    }

    #[test]
    fn test_visible_image_loads_once() {
        let t = TestPage::new();
        let img = lazy_img(&t, "/static/uploads/a.jpg");
        let eager = t.page.append_to_body(Element::new("img").with_attr("src", "b.jpg"));
        let lazy = LazyImages::new(t.ctx.clone());

        assert_eq!(lazy.observe_all(), 1);
        assert!(!lazy.is_observed(eager));

        let loaded = lazy.on_intersection(&[IntersectionEntry::visible(img)]);
        assert_eq!(loaded, vec![img]);
        let el = t.page.get(img).unwrap();
        assert_eq!(el.attr("src").as_deref(), Some("/static/uploads/a.jpg"));
        assert!(!el.has_class("lazy"));
        assert!(!lazy.is_observed(img));

        assert!(lazy.on_intersection(&[IntersectionEntry::visible(img)]).is_empty());
        assert_eq!(t.events.count(names::IMAGE_LOADED), 1);
    }

    #[test]
    fn test_non_intersecting_entries_are_ignored() {
        let t = TestPage::new();
        let img = lazy_img(&t, "a.jpg");
        let lazy = LazyImages::new(t.ctx.clone());
        lazy.observe_all();

        let entry = IntersectionEntry {
            target: img,
            is_intersecting: false,
        };
        assert!(lazy.on_intersection(&[entry]).is_empty());
        assert!(lazy.is_observed(img));
        assert_eq!(t.page.get(img).unwrap().attr("src").as_deref(), Some("placeholder.gif"));
    }

    #[test]
    fn test_without_observer_support_nothing_is_observed() {
        let t = TestPage::new();
        t.page.set_intersection_observer_support(false);
        let img = lazy_img(&t, "a.jpg");
        let lazy = LazyImages::new(t.ctx.clone());

        assert_eq!(lazy.observe_all(), 0);
        assert!(lazy.on_intersection(&[IntersectionEntry::visible(img)]).is_empty());
        assert!(t.page.get(img).unwrap().has_class("lazy"));
    }
}
