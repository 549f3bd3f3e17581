//! Tooltip initialisation for `[data-bs-toggle="tooltip"]`.

use crate::page::{ElementId, Page, Selector};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Where a tooltip opens relative to its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Above.
    #[default]
    Top,
    /// Below.
    Bottom,
    /// To the left.
    Left,
    /// To the right.
    Right,
    /// Chosen from the available space.
    Auto,
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown placement: {other}")),
        }
    }
}

/// A tooltip bound to an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tooltip {
    /// The trigger element.
    pub element: ElementId,
    /// Text shown.
    pub title: String,
    /// Where it opens.
    pub placement: Placement,
}

impl Tooltip {
    fn read(page: &Page, element: ElementId) -> Option<Self> {
        let el = page.get(element)?;
        let title = el
            .attr("data-bs-title")
            .or_else(|| el.attr("title"))
            .unwrap_or_default();
        let placement = el
            .data("bs-placement")
            .and_then(|p| p.parse::<Placement>().ok())
            .unwrap_or_default();
        Some(Self {
            element,
            title,
            placement,
        })
    }
}

/// Tooltips created so far, one per trigger element.
#[derive(Debug, Default)]
pub struct TooltipRegistry {
    tooltips: Mutex<BTreeMap<ElementId, Tooltip>>,
}

impl TooltipRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tooltip for every trigger on the page.
    ///
    /// Running it again refreshes existing tooltips instead of stacking
    /// duplicates. Returns the number of triggers found.
    pub fn init(&self, page: &Page) -> usize {
        let triggers = page.query_selector_all(&Selector::any().with_attr_eq("data-bs-toggle", "tooltip"));
        let mut tooltips = self.tooltips.lock();
        for element in &triggers {
            if let Some(tooltip) = Tooltip::read(page, *element) {
                tooltips.insert(*element, tooltip);
            }
        }
        triggers.len()
    }

    /// The tooltip bound to `element`.
    #[must_use]
    pub fn get(&self, element: ElementId) -> Option<Tooltip> {
        self.tooltips.lock().get(&element).cloned()
    }

    /// Number of tooltips.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tooltips.lock().len()
    }

    /// Whether no tooltip exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tooltips.lock().is_empty()
    }
}
