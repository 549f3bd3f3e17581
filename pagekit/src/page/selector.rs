//! A small selector vocabulary covering what the page glue queries.

use super::Element;

/// How an attribute must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrMatch {
    /// `[name]`
    Exists,
    /// `[name="value"]`
    Equals(String),
    /// `[name^="value"]`
    StartsWith(String),
    /// `[name*="value"]`
    Contains(String),
}

/// A compound selector: every present part must match.
///
/// ```
/// use pagekit::page::Selector;
///
/// // a[href^="#"]
/// let anchors = Selector::tag("a").with_attr_prefix("href", "#");
/// assert_eq!(anchors.to_string(), r##"a[href^="#"]"##);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, AttrMatch)>,
}

impl Selector {
    /// Matches every element.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// `tag`
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into().to_ascii_lowercase()),
            ..Self::default()
        }
    }

    /// `#id`
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// `.class`
    #[must_use]
    pub fn class(class: impl Into<String>) -> Self {
        Self::any().with_class(class)
    }

    /// `[name]`
    #[must_use]
    pub fn attr(name: impl Into<String>) -> Self {
        Self::any().with_attr(name)
    }

    /// Adds a class requirement.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Adds `[name]`.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>) -> Self {
        self.attrs.push((name.into(), AttrMatch::Exists));
        self
    }

    /// Adds `[name="value"]`.
    #[must_use]
    pub fn with_attr_eq(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), AttrMatch::Equals(value.into())));
        self
    }

    /// Adds `[name^="value"]`.
    #[must_use]
    pub fn with_attr_prefix(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), AttrMatch::StartsWith(value.into())));
        self
    }

    /// Adds `[name*="value"]`.
    #[must_use]
    pub fn with_attr_containing(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), AttrMatch::Contains(value.into())));
        self
    }

    /// Whether `element` satisfies every part of the selector.
    #[must_use]
    pub fn matches(&self, element: &Element) -> bool {
        if self.tag.as_ref().is_some_and(|tag| *tag != element.tag) {
            return false;
        }
        if self.id.is_some() && self.id != element.dom_id {
            return false;
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|(name, rule)| {
            let Some(value) = element.attr(name) else {
                return false;
            };
            match rule {
                AttrMatch::Exists => true,
                AttrMatch::Equals(expected) => value == *expected,
                AttrMatch::StartsWith(prefix) => value.starts_with(prefix.as_str()),
                AttrMatch::Contains(needle) => value.contains(needle.as_str()),
            }
        })
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(tag) = &self.tag {
            write!(f, "{tag}")?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        for (name, rule) in &self.attrs {
            match rule {
                AttrMatch::Exists => write!(f, "[{name}]")?,
                AttrMatch::Equals(v) => write!(f, "[{name}=\"{v}\"]")?,
                AttrMatch::StartsWith(v) => write!(f, "[{name}^=\"{v}\"]")?,
                AttrMatch::Contains(v) => write!(f, "[{name}*=\"{v}\"]")?,
            }
        }
        if self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty() {
            write!(f, "*")?;
        }
        Ok(())
    }
}
