//! Transient notification banners.
//!
//! A banner goes `Created -> Visible -> Removed`. Removal happens on the
//! first of: the TTL timer (3 s by default) or a user dismissal. Whichever
//! comes second finds the banner gone and does nothing. Only live
//! notifications stay in the registry.

use crate::context::PageContext;
use crate::events::names;
use crate::page::{Element, ElementId, Selector};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Visual classification of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Neutral information.
    #[default]
    Info,
    /// A completed action.
    Success,
    /// A failed action.
    Error,
}

impl Severity {
    /// The tag used by callers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// The alert style suffix; errors use the `danger` style.
    #[must_use]
    pub const fn alert_style(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "danger",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// Identifier of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationState {
    /// Built, not yet attached.
    Created,
    /// Attached to the page.
    Visible,
    /// Gone; terminal.
    Removed,
}

impl NotificationState {
    /// Whether `self -> next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!((self, next), (Self::Created, Self::Visible) | (Self::Visible, Self::Removed))
    }
}

/// Why a notification was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalCause {
    /// The TTL elapsed.
    Timeout,
    /// The user closed it.
    Dismissed,
}

/// A notification and where it lives on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Identifier.
    pub id: NotificationId,
    /// Text shown.
    pub message: String,
    /// Visual style.
    pub severity: Severity,
    /// When it was created.
    pub created_at: DateTime<Utc>,
    /// The banner element.
    pub element: ElementId,
    /// Lifecycle state.
    pub state: NotificationState,
}

impl Notification {
    fn transition(&mut self, next: NotificationState) -> bool {
        if self.state.can_transition_to(next) {
            self.state = next;
            true
        } else {
            false
        }
    }
}

/// Shows banners and guarantees their removal.
///
/// Clones share the same registry. Only live notifications are tracked; a
/// record is dropped as soon as its banner is removed.
#[derive(Clone)]
pub struct Notifier {
    ctx: PageContext,
    registry: Arc<Mutex<HashMap<NotificationId, Notification>>>,
}

impl Notifier {
    /// Creates a notifier on `ctx`.
    #[must_use]
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            registry: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Shows `message` as a dismissible banner.
    ///
    /// Calls never queue or deduplicate: each one stacks its own banner.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> NotificationId {
        let message = message.into();
        let page = self.ctx.page();
        let mut notification = Notification {
            id: NotificationId::generate(),
            message: message.clone(),
            severity,
            created_at: self.ctx.scheduler().now(),
            element: page.create(banner(&message, severity)),
            state: NotificationState::Created,
        };

        if let Err(err) = page.insert(notification.element, close_button()) {
            debug!(error = %err, "Could not attach close button");
        }
        if let Err(err) = page.append_child(page.body(), notification.element) {
            debug!(error = %err, "Could not attach notification");
        }
        notification.transition(NotificationState::Visible);

        let id = notification.id;
        self.registry.lock().insert(id, notification);
        self.ctx.try_emit_event(
            names::NOTIFICATION_SHOWN,
            Some(serde_json::json!({
                "id": id.to_string(),
                "severity": severity.as_str(),
                "message": message,
            })),
        );

        let notifier = self.clone();
        self.ctx.scheduler().schedule(
            self.ctx.config().notifications.ttl(),
            Box::new(move || {
                notifier.remove(id, RemovalCause::Timeout);
            }),
        );

        id
    }

    /// `notify(message, Severity::Info)`
    pub fn info(&self, message: impl Into<String>) -> NotificationId {
        self.notify(message, Severity::Info)
    }

    /// `notify(message, Severity::Success)`
    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.notify(message, Severity::Success)
    }

    /// `notify(message, Severity::Error)`
    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.notify(message, Severity::Error)
    }

    /// User dismissal. Returns false if the banner was already gone.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        self.remove(id, RemovalCause::Dismissed)
    }

    /// Handles a click on an element inside a banner (its close button).
    ///
    /// Returns false if the click did not hit a live banner's close button.
    pub fn on_close_click(&self, target: ElementId) -> bool {
        let page = self.ctx.page();
        if page.closest(target, &Selector::class("btn-close")).is_none() {
            return false;
        }
        let Some(banner) = page.closest(target, &Selector::class("alert")) else {
            return false;
        };
        let id = self
            .registry
            .lock()
            .values()
            .find(|n| n.element == banner && n.state == NotificationState::Visible)
            .map(|n| n.id);
        id.is_some_and(|id| self.dismiss(id))
    }

    /// A snapshot of a live notification.
    #[must_use]
    pub fn get(&self, id: NotificationId) -> Option<Notification> {
        self.registry.lock().get(&id).cloned()
    }

    /// Number of banners currently visible.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.registry
            .lock()
            .values()
            .filter(|n| n.state == NotificationState::Visible)
            .count()
    }

    /// Number of notifications still tracked.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.registry.lock().len()
    }

    fn remove(&self, id: NotificationId, cause: RemovalCause) -> bool {
        let element = {
            let mut registry = self.registry.lock();
            let Some(mut notification) = registry.remove(&id) else {
                return false;
            };
            if !notification.transition(NotificationState::Removed) {
                return false;
            }
            notification.element
        };

        // The element may already be gone if something else detached it.
        let page = self.ctx.page();
        if page.contains(element) {
            page.remove(element);
        }

        debug!(notification = %id, ?cause, "Notification removed");
        self.ctx.try_emit_event(
            names::NOTIFICATION_REMOVED,
            Some(serde_json::json!({
                "id": id.to_string(),
                "cause": cause,
            })),
        );
        true
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("visible", &self.visible_count())
            .finish()
    }
}

fn banner(message: &str, severity: Severity) -> Element {
    Element::new("div")
        .with_classes(&format!(
            "alert alert-{} alert-dismissible fade show position-fixed",
            severity.alert_style()
        ))
        .with_attr("role", "alert")
        .with_style("top", "20px")
        .with_style("right", "20px")
        .with_style("z-index", "9999")
        .with_style("min-width", "250px")
        .with_content(message)
}

fn close_button() -> Element {
    Element::new("button")
        .with_attr("type", "button")
        .with_class("btn-close")
        .with_attr("data-bs-dismiss", "alert")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;
    use crate::page::Page;
    use crate::scheduler::{ManualScheduler, Scheduler};
    use std::time::Duration;

    fn setup() -> (Notifier, Arc<Page>, Arc<ManualScheduler>, Arc<CollectingEventSink>) {
        let page = Arc::new(Page::default());
        let clock = Arc::new(ManualScheduler::new());
        let events = Arc::new(CollectingEventSink::new());
        let ctx = PageContext::new(page.clone(), clock.clone()).with_events(events.clone());
        (Notifier::new(ctx), page, clock, events)
    }

    #[test]
    fn test_banner_markup() {
        let (notifier, page, _clock, _) = setup();
        let id = notifier.notify("Saqlandi", Severity::Error);
        let element = notifier.get(id).unwrap().element;

        let banner = page.get(element).unwrap();
        assert!(banner.has_class("alert-danger"));
        assert!(banner.has_class("alert-dismissible"));
        assert_eq!(banner.content, "Saqlandi");
        assert_eq!(banner.style.get("z-index").map(String::as_str), Some("9999"));

        let close = page.children(element);
        assert_eq!(close.len(), 1);
        assert_eq!(page.get(close[0]).unwrap().data("bs-dismiss"), Some("alert"));
    }

    #[test]
    fn test_removed_after_ttl() {
        let (notifier, page, clock, events) = setup();
        let id = notifier.info("Salom");
        let element = notifier.get(id).unwrap().element;
        assert!(page.contains(element));
        assert_eq!(notifier.get(id).unwrap().state, NotificationState::Visible);

        clock.advance(Duration::from_millis(2999));
        assert!(page.contains(element));

        clock.advance(Duration::from_millis(1));
        assert!(!page.contains(element));
        assert!(notifier.get(id).is_none());

        let removed = events.events_of_type(names::NOTIFICATION_REMOVED);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].1.as_ref().unwrap()["cause"], "timeout");
    }

    #[test]
    fn test_registry_empty_after_ttl() {
        let (notifier, _page, clock, _) = setup();
        for _ in 0..1000 {
            notifier.success("Matn nusxa olindi!");
            clock.advance(Duration::from_millis(3000));
        }
        assert_eq!(notifier.visible_count(), 0);
        assert_eq!(notifier.tracked_count(), 0);
        assert_eq!(clock.pending_count(), 0);
    }

    #[test]
    fn test_dismiss_first_wins() {
        let (notifier, page, clock, events) = setup();
        let id = notifier.success("Tayyor");
        let element = notifier.get(id).unwrap().element;

        clock.advance(Duration::from_millis(1000));
        assert!(notifier.dismiss(id));
        assert!(!page.contains(element));
        assert!(!notifier.dismiss(id));

        clock.advance(Duration::from_secs(5));
        let removed = events.events_of_type(names::NOTIFICATION_REMOVED);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].1.as_ref().unwrap()["cause"], "dismissed");
        assert_eq!(notifier.tracked_count(), 0);
    }

    #[test]
    fn test_externally_removed_banner_is_tolerated() {
        let (notifier, page, clock, _) = setup();
        let id = notifier.info("x");
        page.remove(notifier.get(id).unwrap().element);

        clock.advance(Duration::from_secs(3));
        assert!(notifier.get(id).is_none());
    }

    #[test]
    fn test_close_button_click() {
        let (notifier, page, _clock, _) = setup();
        let id = notifier.info("x");
        let element = notifier.get(id).unwrap().element;
        let close = page.children(element)[0];

        assert!(!notifier.on_close_click(element));
        assert!(notifier.on_close_click(close));
        assert!(!page.contains(element));
    }

    #[test]
    fn test_stacking_without_dedup() {
        let (notifier, page, clock, _) = setup();
        notifier.info("same");
        clock.advance(Duration::from_millis(500));
        notifier.info("same");
        assert_eq!(notifier.visible_count(), 2);
        assert_eq!(page.query_selector_all(&Selector::class("alert")).len(), 2);

        clock.advance(Duration::from_millis(2500));
        assert_eq!(notifier.visible_count(), 1);
        clock.advance(Duration::from_millis(500));
        assert_eq!(notifier.visible_count(), 0);
        assert_eq!(notifier.tracked_count(), 0);
    }

    #[test]
    fn test_created_at_uses_scheduler_clock() {
        let (notifier, _page, clock, _) = setup();
        clock.advance(Duration::from_secs(60));
        let id = notifier.info("x");
        assert_eq!(notifier.get(id).unwrap().created_at, clock.now());
    }

    #[test]
    fn test_state_machine() {
        use NotificationState::*;
        assert!(Created.can_transition_to(Visible));
        assert!(Visible.can_transition_to(Removed));
        assert!(!Removed.can_transition_to(Visible));
        assert!(!Created.can_transition_to(Removed));
        assert!(!Removed.can_transition_to(Removed));
    }

    #[test]
    fn test_severity_parsing() {
        assert_eq!("error".parse::<Severity>(), Ok(Severity::Error));
        assert!("warning".parse::<Severity>().is_err());
        assert_eq!(Severity::default().alert_style(), "info");
    }
}
