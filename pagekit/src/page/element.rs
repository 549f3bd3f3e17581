//! Page elements.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of an element within one [`Page`](super::Page).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(u64);

impl ElementId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el-{}", self.0)
    }
}

/// A node of the headless document.
///
/// `content` stands in for both `textContent` and `innerHTML`; the page glue
/// never needs to tell them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Lower-case tag name.
    pub tag: String,
    /// The `id` attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dom_id: Option<String>,
    /// Class list in insertion order.
    #[serde(default)]
    pub classes: Vec<String>,
    /// Remaining attributes (`href`, `data-*`, `type`, ...).
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Inline style declarations.
    #[serde(default)]
    pub style: BTreeMap<String, String>,
    /// Text / markup content.
    #[serde(default)]
    pub content: String,
    /// Form control value.
    #[serde(default)]
    pub value: String,
    /// Form control disabled flag.
    #[serde(default)]
    pub disabled: bool,
    /// Distance from the top of the document, in pixels.
    #[serde(default)]
    pub offset_top: f64,
}

impl Element {
    /// Creates an element with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            dom_id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            content: String::new(),
            value: String::new(),
            disabled: false,
            offset_top: 0.0,
        }
    }

    /// Sets the `id` attribute.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.dom_id = Some(id.into());
        self
    }

    /// Adds a class.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    /// Adds every whitespace-separated class in `classes`.
    #[must_use]
    pub fn with_classes(mut self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            self.add_class(class);
        }
        self
    }

    /// Sets an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Sets an inline style declaration.
    #[must_use]
    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(property.into(), value.into());
        self
    }

    /// Sets the content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Sets the form control value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Sets the document offset.
    #[must_use]
    pub fn at_offset(mut self, offset_top: f64) -> Self {
        self.offset_top = offset_top;
        self
    }

    /// Returns an attribute; `id` and `class` are answered from their fields.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.dom_id.clone(),
            "class" if !self.classes.is_empty() => Some(self.classes.join(" ")),
            "class" => None,
            _ => self.attributes.get(name).cloned(),
        }
    }

    /// Sets an attribute; `id` and `class` update their fields.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match name.as_str() {
            "id" => self.dom_id = Some(value),
            "class" => {
                self.classes.clear();
                for class in value.split_whitespace() {
                    self.add_class(class);
                }
            }
            _ => {
                self.attributes.insert(name, value);
            }
        }
    }

    /// Returns a `data-*` attribute by its dataset key.
    #[must_use]
    pub fn data(&self, key: &str) -> Option<&str> {
        self.attributes.get(&format!("data-{key}")).map(String::as_str)
    }

    /// Whether the element carries `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Adds a class if absent.
    pub fn add_class(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !self.has_class(&class) {
            self.classes.push(class);
        }
    }

    /// Removes a class; returns whether it was present.
    pub fn remove_class(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        self.classes.len() != before
    }

    /// Renders the inline style as a `cssText` string.
    #[must_use]
    pub fn css_text(&self) -> String {
        self.style
            .iter()
            .map(|(k, v)| format!("{k}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let el = Element::new("DIV")
            .with_id("main")
            .with_classes("alert  alert-info")
            .with_attr("data-share", "telegram")
            .with_style("top", "0");

        assert_eq!(el.tag, "div");
        assert_eq!(el.attr("id").as_deref(), Some("main"));
        assert_eq!(el.attr("class").as_deref(), Some("alert alert-info"));
        assert_eq!(el.data("share"), Some("telegram"));
        assert_eq!(el.css_text(), "top: 0;");
    }

    #[test]
    fn test_class_list() {
        let mut el = Element::new("img").with_class("lazy").with_class("lazy");
        assert_eq!(el.classes.len(), 1);
        assert!(el.remove_class("lazy"));
        assert!(!el.remove_class("lazy"));
        assert_eq!(el.attr("class"), None);
    }

    #[test]
    fn test_set_attr_routes_id_and_class() {
        let mut el = Element::new("a");
        el.set_attr("id", "top");
        el.set_attr("class", "nav-link active");
        el.set_attr("href", "#top");

        assert_eq!(el.dom_id.as_deref(), Some("top"));
        assert!(el.has_class("active"));
        assert_eq!(el.attributes.get("href").map(String::as_str), Some("#top"));
        assert!(!el.attributes.contains_key("id"));
    }
}
