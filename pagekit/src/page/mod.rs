//! Headless document model.
//!
//! [`Page`] holds the element tree, the location, the viewport and the record
//! of windows opened by the page. It is shared (`Arc<Page>`) between
//! components and timer callbacks, so all access goes through an internal
//! lock and no method hands out references into the tree.

mod element;
mod selector;

pub use element::{Element, ElementId};
pub use selector::{AttrMatch, Selector};

use crate::errors::PageError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where the page is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Full URL (`window.location.href`).
    pub href: String,
    /// Path component (`window.location.pathname`).
    pub path: String,
    /// Document title.
    pub title: String,
}

impl Location {
    /// Creates a location from an absolute URL, deriving the path.
    #[must_use]
    pub fn new(href: impl Into<String>, title: impl Into<String>) -> Self {
        let href = href.into();
        let path = path_of(&href);
        Self {
            href,
            path,
            title: title.into(),
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new("http://localhost/", "")
    }
}

fn path_of(href: &str) -> String {
    let after_scheme = href.split_once("://").map_or(href, |(_, rest)| rest);
    let path = after_scheme
        .find('/')
        .map_or("/", |idx| &after_scheme[idx..]);
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].to_string()
}

/// How a scroll was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    /// Jump.
    #[default]
    Auto,
    /// Animated.
    Smooth,
}

/// Scroll geometry of the document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    /// `scrollTop`
    pub scroll_top: f64,
    /// `scrollHeight`
    pub scroll_height: f64,
    /// `clientHeight`
    pub client_height: f64,
    /// Behavior of the last programmatic scroll.
    pub last_behavior: ScrollBehavior,
}

impl Viewport {
    /// Creates a viewport at the top of a document.
    #[must_use]
    pub fn new(scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top: 0.0,
            scroll_height,
            client_height,
            last_behavior: ScrollBehavior::Auto,
        }
    }

    /// Largest reachable `scroll_top`.
    #[must_use]
    pub fn max_scroll(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }
}

/// A `window.open` call made by the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenedWindow {
    /// URL opened.
    pub url: String,
    /// Browsing context name (`_blank`).
    pub target: String,
    /// Window feature string (`width=600,height=400`).
    pub features: String,
}

struct Node {
    element: Element,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

struct Document {
    next_id: u64,
    nodes: HashMap<ElementId, Node>,
    body: ElementId,
    location: Location,
    viewport: Viewport,
    windows: Vec<OpenedWindow>,
    observer_supported: bool,
}

impl Document {
    fn is_attached(&self, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == self.body {
                return true;
            }
            current = self.nodes.get(&node_id).and_then(|n| n.parent);
        }
        false
    }

    /// Attached elements in document order.
    fn walk(&self) -> Vec<ElementId> {
        self.walk_from(self.body)
    }

    /// `root` and its subtree in document order.
    fn walk_from(&self, root: ElementId) -> Vec<ElementId> {
        let mut order = Vec::new();
        if !self.nodes.contains_key(&root) {
            return order;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev());
            }
        }
        order
    }

    fn drop_subtree(&mut self, id: ElementId) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children);
            }
        }
    }
}

/// The headless page.
pub struct Page {
    doc: RwLock<Document>,
}

impl Page {
    /// Creates an empty page at `location` with an empty body.
    #[must_use]
    pub fn new(location: Location) -> Self {
        let body = ElementId::new(1);
        let mut nodes = HashMap::new();
        nodes.insert(
            body,
            Node {
                element: Element::new("body"),
                parent: None,
                children: Vec::new(),
            },
        );
        Self {
            doc: RwLock::new(Document {
                next_id: 2,
                nodes,
                body,
                location,
                viewport: Viewport::default(),
                windows: Vec::new(),
                observer_supported: true,
            }),
        }
    }

    /// The body element.
    #[must_use]
    pub fn body(&self) -> ElementId {
        self.doc.read().body
    }

    /// Creates a detached element.
    pub fn create(&self, element: Element) -> ElementId {
        let mut doc = self.doc.write();
        let id = ElementId::new(doc.next_id);
        doc.next_id += 1;
        doc.nodes.insert(
            id,
            Node {
                element,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    /// Moves `child` to the end of `parent`'s children.
    pub fn append_child(&self, parent: ElementId, child: ElementId) -> Result<(), PageError> {
        let mut doc = self.doc.write();
        if !doc.nodes.contains_key(&parent) {
            return Err(PageError::ElementNotFound(parent.to_string()));
        }
        if !doc.nodes.contains_key(&child) {
            return Err(PageError::ElementNotFound(child.to_string()));
        }
        // Refuse to create a cycle.
        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child {
                return Err(PageError::ElementNotFound(format!(
                    "{child} cannot be appended inside itself"
                )));
            }
            ancestor = doc.nodes.get(&id).and_then(|n| n.parent);
        }

        let old_parent = doc.nodes.get(&child).and_then(|n| n.parent);
        if let Some(old) = old_parent {
            if let Some(node) = doc.nodes.get_mut(&old) {
                node.children.retain(|c| *c != child);
            }
        }
        if let Some(node) = doc.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = doc.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Creates `element` as the last child of `parent`.
    pub fn insert(&self, parent: ElementId, element: Element) -> Result<ElementId, PageError> {
        let id = self.create(element);
        if let Err(err) = self.append_child(parent, id) {
            self.doc.write().nodes.remove(&id);
            return Err(err);
        }
        Ok(id)
    }

    /// Creates `element` as the last child of the body.
    pub fn append_to_body(&self, element: Element) -> ElementId {
        let mut doc = self.doc.write();
        let id = ElementId::new(doc.next_id);
        doc.next_id += 1;
        let body = doc.body;
        doc.nodes.insert(
            id,
            Node {
                element,
                parent: Some(body),
                children: Vec::new(),
            },
        );
        if let Some(node) = doc.nodes.get_mut(&body) {
            node.children.push(id);
        }
        id
    }

    /// Removes an element and its subtree.
    ///
    /// Returns false if the element no longer exists; removing twice is a
    /// no-op. The body cannot be removed.
    pub fn remove(&self, id: ElementId) -> bool {
        let mut doc = self.doc.write();
        if id == doc.body {
            return false;
        }
        let Some(parent) = doc.nodes.get(&id).map(|n| n.parent) else {
            return false;
        };
        if let Some(parent) = parent {
            if let Some(node) = doc.nodes.get_mut(&parent) {
                node.children.retain(|c| *c != id);
            }
        }
        doc.drop_subtree(id);
        true
    }

    /// Whether the element exists and is attached to the body.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.doc.read().is_attached(id)
    }

    /// Whether the element exists, attached or not.
    #[must_use]
    pub fn exists(&self, id: ElementId) -> bool {
        self.doc.read().nodes.contains_key(&id)
    }

    /// A snapshot of the element.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<Element> {
        self.doc.read().nodes.get(&id).map(|n| n.element.clone())
    }

    /// Mutates an element in place.
    ///
    /// Returns `None` if the element does not exist.
    pub fn update<R>(&self, id: ElementId, f: impl FnOnce(&mut Element) -> R) -> Option<R> {
        self.doc.write().nodes.get_mut(&id).map(|n| f(&mut n.element))
    }

    /// Parent of an element.
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.doc.read().nodes.get(&id).and_then(|n| n.parent)
    }

    /// Children of an element.
    #[must_use]
    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.doc
            .read()
            .nodes
            .get(&id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// First attached element matching `selector`, in document order.
    #[must_use]
    pub fn query_selector(&self, selector: &Selector) -> Option<ElementId> {
        let doc = self.doc.read();
        doc.walk()
            .into_iter()
            .find(|id| doc.nodes.get(id).is_some_and(|n| selector.matches(&n.element)))
    }

    /// Every attached element matching `selector`, in document order.
    #[must_use]
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<ElementId> {
        let doc = self.doc.read();
        doc.walk()
            .into_iter()
            .filter(|id| doc.nodes.get(id).is_some_and(|n| selector.matches(&n.element)))
            .collect()
    }

    /// First descendant of `root` matching any of `selectors`, in document
    /// order. `root` itself is never returned.
    #[must_use]
    pub fn query_selector_in(&self, root: ElementId, selectors: &[Selector]) -> Option<ElementId> {
        let doc = self.doc.read();
        doc.walk_from(root).into_iter().skip(1).find(|id| {
            doc.nodes
                .get(id)
                .is_some_and(|n| selectors.iter().any(|s| s.matches(&n.element)))
        })
    }

    /// `document.getElementById`
    #[must_use]
    pub fn get_element_by_id(&self, dom_id: &str) -> Option<ElementId> {
        self.query_selector(&Selector::id(dom_id))
    }

    /// The element itself or its nearest ancestor matching `selector`.
    #[must_use]
    pub fn closest(&self, id: ElementId, selector: &Selector) -> Option<ElementId> {
        let doc = self.doc.read();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = doc.nodes.get(&node_id)?;
            if selector.matches(&node.element) {
                return Some(node_id);
            }
            current = node.parent;
        }
        None
    }

    /// Current location.
    #[must_use]
    pub fn location(&self) -> Location {
        self.doc.read().location.clone()
    }

    /// Navigates (without reloading the tree).
    pub fn set_location(&self, location: Location) {
        self.doc.write().location = location;
    }

    /// Document title.
    #[must_use]
    pub fn title(&self) -> String {
        self.doc.read().location.title.clone()
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.doc.read().viewport
    }

    /// Replaces the viewport geometry.
    pub fn set_viewport(&self, viewport: Viewport) {
        self.doc.write().viewport = viewport;
    }

    /// Scrolls the document, clamped to the scrollable range.
    pub fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        let mut doc = self.doc.write();
        let max = doc.viewport.max_scroll();
        doc.viewport.scroll_top = top.clamp(0.0, max);
        doc.viewport.last_behavior = behavior;
    }

    /// `window.open`
    pub fn open_window(&self, url: impl Into<String>, target: impl Into<String>, features: impl Into<String>) {
        self.doc.write().windows.push(OpenedWindow {
            url: url.into(),
            target: target.into(),
            features: features.into(),
        });
    }

    /// Every window the page has opened.
    #[must_use]
    pub fn opened_windows(&self) -> Vec<OpenedWindow> {
        self.doc.read().windows.clone()
    }

    /// Whether the visibility observer capability exists.
    #[must_use]
    pub fn supports_intersection_observer(&self) -> bool {
        self.doc.read().observer_supported
    }

    /// Toggles the visibility observer capability.
    pub fn set_intersection_observer_support(&self, supported: bool) {
        self.doc.write().observer_supported = supported;
    }

    /// Number of elements attached to the body, body excluded.
    #[must_use]
    pub fn attached_count(&self) -> usize {
        self.doc.read().walk().len() - 1
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Location::default())
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let doc = self.doc.read();
        f.debug_struct("Page")
            .field("location", &doc.location)
            .field("elements", &doc.nodes.len())
            .field("viewport", &doc.viewport)
            .finish()
    }
}
