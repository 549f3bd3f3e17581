//! Social share links.

use crate::context::PageContext;
use crate::errors::PageError;
use crate::events::names;
use crate::page::{ElementId, Selector};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error};
use urlencoding::encode;

/// A supported share target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharePlatform {
    /// t.me share dialog.
    Telegram,
    /// Facebook sharer.
    Facebook,
    /// Twitter/X tweet intent.
    Twitter,
    /// wa.me text link.
    Whatsapp,
}

impl SharePlatform {
    /// All supported platforms.
    pub const ALL: [Self; 4] = [Self::Telegram, Self::Facebook, Self::Twitter, Self::Whatsapp];

    /// The platform tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Telegram => "telegram",
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::Whatsapp => "whatsapp",
        }
    }

    /// Builds the share URL for `url` and `title`.
    ///
    /// Facebook ignores the title.
    #[must_use]
    pub fn link(self, url: &str, title: &str) -> String {
        let u = encode(url);
        let t = encode(title);
        match self {
            Self::Telegram => format!("https://t.me/share/url?url={u}&text={t}"),
            Self::Facebook => format!("https://www.facebook.com/sharer/sharer.php?u={u}"),
            Self::Twitter => format!("https://twitter.com/intent/tweet?url={u}&text={t}"),
            Self::Whatsapp => format!("https://wa.me/?text={t}%20{u}"),
        }
    }
}

impl fmt::Display for SharePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SharePlatform {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| PageError::unsupported_platform(s))
    }
}

/// Builds a share URL for a platform tag.
///
/// Unknown tags are logged and rejected.
///
/// ```
/// let link = pagekit::share::share_link("facebook", "https://x.test/", "ignored").unwrap();
/// assert_eq!(link, "https://www.facebook.com/sharer/sharer.php?u=https%3A%2F%2Fx.test%2F");
/// assert!(pagekit::share::share_link("myspace", "u", "t").is_err());
/// ```
pub fn share_link(platform: &str, url: &str, title: &str) -> Result<String, PageError> {
    let platform = platform.parse::<SharePlatform>().map_err(|err| {
        error!(platform = %platform, "Unsupported platform: {}", platform);
        err
    })?;
    Ok(platform.link(url, title))
}

/// Opens share windows and handles `[data-share]` buttons.
#[derive(Debug)]
pub struct ShareService {
    ctx: PageContext,
    buttons: Mutex<HashSet<ElementId>>,
}

impl ShareService {
    /// Creates a share service on `ctx`.
    #[must_use]
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            buttons: Mutex::new(HashSet::new()),
        }
    }

    /// Opens a share popup.
    ///
    /// A missing or empty `url`/`title` falls back to the page's location
    /// and title. Unknown platforms are logged and nothing is opened.
    /// Returns the opened URL.
    pub fn share_to_social(&self, platform: &str, url: Option<&str>, title: Option<&str>) -> Option<String> {
        let page = self.ctx.page();
        let location = page.location();
        let url = url.filter(|u| !u.is_empty()).unwrap_or(location.href.as_str());
        let title = title.filter(|t| !t.is_empty()).unwrap_or(location.title.as_str());

        match share_link(platform, url, title) {
            Ok(link) => {
                page.open_window(link.clone(), "_blank", self.ctx.config().share.window_features());
                self.ctx.try_emit_event(
                    names::SHARE_OPENED,
                    Some(serde_json::json!({ "platform": platform, "url": link })),
                );
                Some(link)
            }
            Err(err) => {
                self.ctx.try_emit_event(
                    names::SHARE_UNSUPPORTED,
                    Some(serde_json::json!({ "platform": platform, "error": err.code() })),
                );
                None
            }
        }
    }

    /// Attaches click handling to every `[data-share]` element currently on
    /// the page. Returns the number of buttons wired.
    pub fn wire_buttons(&self) -> usize {
        let found = self.ctx.page().query_selector_all(&Selector::attr("data-share"));
        let mut buttons = self.buttons.lock();
        buttons.extend(found.iter().copied());
        debug!(count = found.len(), "Share buttons wired");
        found.len()
    }

    /// Handles a click. Returns true if it hit a wired share button, in
    /// which case the default action is prevented.
    pub fn on_click(&self, target: ElementId) -> bool {
        let page = self.ctx.page();
        let Some(button) = page.closest(target, &Selector::attr("data-share")) else {
            return false;
        };
        if !self.buttons.lock().contains(&button) {
            return false;
        }
        let Some(element) = page.get(button) else {
            return false;
        };
        let platform = element.data("share").unwrap_or_default();
        self.share_to_social(platform, element.data("url"), element.data("title"));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;
    use crate::page::{Element, Location, Page};
    use crate::scheduler::ManualScheduler;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tracing_test::traced_test;

    fn query_params(link: &str) -> HashMap<String, String> {
        let (_, query) = link.split_once('?').unwrap();
        query
            .split('&')
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap();
                (k.to_string(), urlencoding::decode(v).unwrap().into_owned())
            })
            .collect()
    }

    #[test]
    fn test_telegram_params_round_trip() {
        let link = share_link("telegram", "https://x.test/a?b=1", "Hi").unwrap();
        assert!(link.starts_with("https://t.me/share/url?"));
        let params = query_params(&link);
        assert_eq!(params["url"], "https://x.test/a?b=1");
        assert_eq!(params["text"], "Hi");
    }

    #[test]
    fn test_twitter_encodes_reserved_characters() {
        let link = share_link("twitter", "https://x.test/?q=a&b=c", "Yangi & eski").unwrap();
        assert_eq!(
            link,
            "https://twitter.com/intent/tweet?url=https%3A%2F%2Fx.test%2F%3Fq%3Da%26b%3Dc&text=Yangi%20%26%20eski"
        );
        let params = query_params(&link);
        assert_eq!(params["text"], "Yangi & eski");
    }

    #[test]
    fn test_whatsapp_joins_title_and_url() {
        let link = share_link("whatsapp", "https://x.test/", "Salom").unwrap();
        assert_eq!(link, "https://wa.me/?text=Salom%20https%3A%2F%2Fx.test%2F");
        assert_eq!(query_params(&link)["text"], "Salom https://x.test/");
    }

    #[test]
    #[traced_test]
    fn test_unknown_platform_is_rejected_and_logged() {
        let err = share_link("unknown", "https://x.test/", "t").unwrap_err();
        assert!(matches!(err, PageError::UnsupportedPlatform { ref platform } if platform == "unknown"));
        assert!(logs_contain("Unsupported platform: unknown"));

        assert!(share_link("Telegram", "u", "t").is_err());
        assert!(logs_contain("Unsupported platform: Telegram"));
    }

    fn service() -> (ShareService, Arc<Page>, Arc<CollectingEventSink>) {
        let page = Arc::new(Page::new(Location::new("https://news.test/yangilik/42", "Bosh sahifa")));
        let events = Arc::new(CollectingEventSink::new());
        let ctx = PageContext::new(page.clone(), Arc::new(ManualScheduler::new())).with_events(events.clone());
        (ShareService::new(ctx), page, events)
    }

    #[test]
    fn test_share_to_social_defaults_to_location() {
        let (share, page, events) = service();
        let link = share.share_to_social("telegram", None, Some("")).unwrap();

        let params = query_params(&link);
        assert_eq!(params["url"], "https://news.test/yangilik/42");
        assert_eq!(params["text"], "Bosh sahifa");

        let windows = page.opened_windows();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].target, "_blank");
        assert_eq!(windows[0].features, "width=600,height=400");
        assert_eq!(events.count(names::SHARE_OPENED), 1);
    }

    #[test]
    fn test_share_to_social_unknown_is_noop() {
        let (share, page, events) = service();
        assert!(share.share_to_social("myspace", None, None).is_none());
        assert!(page.opened_windows().is_empty());
        assert_eq!(events.count(names::SHARE_UNSUPPORTED), 1);
    }

    #[test]
    fn test_button_click() {
        let (share, page, _) = service();
        let button = page.append_to_body(
            Element::new("a")
                .with_attr("data-share", "facebook")
                .with_attr("data-url", "https://x.test/b"),
        );
        let icon = page.insert(button, Element::new("i")).unwrap();
        let late = page.append_to_body(Element::new("a").with_attr("data-share", "twitter"));
        page.remove(late);

        assert_eq!(share.wire_buttons(), 1);
        assert!(share.on_click(icon));
        assert_eq!(
            page.opened_windows()[0].url,
            "https://www.facebook.com/sharer/sharer.php?u=https%3A%2F%2Fx.test%2Fb"
        );
        assert!(!share.on_click(page.body()));
    }

    #[test]
    fn test_unwired_button_is_ignored() {
        let (share, page, _) = service();
        share.wire_buttons();
        let button = page.append_to_body(Element::new("a").with_attr("data-share", "telegram"));
        assert!(!share.on_click(button));
        assert!(page.opened_windows().is_empty());
    }
}
