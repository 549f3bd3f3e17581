//! End-to-end tests driving a whole page through [`PageRuntime`].

use crate::clipboard::CopyOutcome;
use crate::config::PageConfig;
use crate::events::names;
use crate::lazy_images::IntersectionEntry;
use crate::notify::Severity;
use crate::page::{Element, ElementId, Page, Selector, Viewport};
use crate::runtime::{DomEvent, PageRuntime};
use crate::scheduler::TokioScheduler;
use crate::testing::{RecordingClipboard, RecordingSuggestionSource, RejectingClipboard, TestPage};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn runtime(t: &TestPage) -> PageRuntime {
    PageRuntime::builder(t.page.clone(), t.clock.clone())
        .events(t.events.clone())
        .build()
}

fn article_page() -> (TestPage, ElementId, ElementId) {
    let t = TestPage::at("https://news.uz/yangilik/toshkent-metro", "Toshkent metrosi");
    t.page.set_viewport(Viewport::new(4000.0, 1000.0));
    let share = t.page.append_to_body(Element::new("a").with_attr("href", "#").with_attr("data-share", "telegram"));
    let comments = t.page.append_to_body(Element::new("section").with_id("izohlar").at_offset(2500.0));
    (t, share, comments)
}

#[test]
fn test_article_page_features() {
    let (t, share, _) = article_page();
    let mut rt = runtime(&t);

    let features = rt.boot();
    assert!(features.article && !features.admin && !features.home);
    assert!(t.page.get_element_by_id("reading-progress").is_some());

    assert!(rt.dispatch(&DomEvent::Click { target: share }));
    let windows = t.page.opened_windows();
    assert_eq!(windows.len(), 1);
    assert_eq!(
        windows[0].url,
        "https://t.me/share/url?url=https%3A%2F%2Fnews.uz%2Fyangilik%2Ftoshkent-metro&text=Toshkent%20metrosi"
    );

    t.page.scroll_to(750.0, crate::page::ScrollBehavior::Auto);
    rt.dispatch(&DomEvent::Scroll);
    t.advance_ms(10);
    let bar = rt.progress().unwrap().bar();
    assert_eq!(t.page.get(bar).unwrap().style["width"], "25%");
}

#[test]
fn test_share_buttons_only_on_article_pages() {
    let t = TestPage::at("https://news.uz/", "Bosh sahifa");
    let share = t.page.append_to_body(Element::new("button").with_attr("data-share", "facebook"));
    let mut rt = runtime(&t);

    assert!(rt.boot().home);
    assert!(!rt.dispatch(&DomEvent::Click { target: share }));
    assert!(t.page.opened_windows().is_empty());
    assert!(rt.progress().is_none());
    assert_eq!(t.events.count(names::PAGE_INITIALIZED), 1);
}

#[test]
fn test_admin_form_and_tooltips() {
    let t = TestPage::at("https://news.uz/admin/yangilik/qoshish", "Admin");
    let form = t.page.append_to_body(Element::new("form").with_class("admin-form"));
    let button = t
        .page
        .insert(form, Element::new("button").with_attr("type", "submit").with_content("Saqlash"))
        .unwrap();
    t.page.append_to_body(
        Element::new("a")
            .with_attr("data-bs-toggle", "tooltip")
            .with_attr("title", "Yordam"),
    );
    let mut rt = runtime(&t);

    let features = rt.boot();
    assert!(features.admin && features.article);
    assert_eq!(rt.tooltips().len(), 1);

    rt.dispatch(&DomEvent::Submit { form });
    assert!(t.page.get(button).unwrap().disabled);
    t.advance_ms(5000);
    let restored = t.page.get(button).unwrap();
    assert!(!restored.disabled);
    assert_eq!(restored.content, "Saqlash");
}

#[test]
fn test_anchor_click_scrolls() {
    let (t, _, comments) = article_page();
    let anchor = t.page.append_to_body(Element::new("a").with_attr("href", "#izohlar"));
    let mut rt = runtime(&t);
    rt.boot();

    assert!(rt.dispatch(&DomEvent::Click { target: anchor }));
    assert_eq!(
        t.page.viewport().scroll_top,
        t.page.get(comments).unwrap().offset_top
    );
}

#[test]
fn test_content_loaded_components() {
    let start = Utc.with_ymd_and_hms(2024, 5, 9, 4, 0, 0).unwrap();
    let t = TestPage::at("https://news.uz/kategoriya/sport", "Sport");
    let clock = Arc::new(crate::scheduler::ManualScheduler::starting_at(start));
    let time = t.page.append_to_body(Element::new("span").with_id("tashkent-time"));
    let container = t.page.append_to_body(Element::new("div").with_class("search-container"));
    let form = t.page.insert(container, Element::new("form").with_attr("action", "/search")).unwrap();
    let input = t.page.insert(form, Element::new("input").with_attr("name", "q")).unwrap();
    let img = t
        .page
        .append_to_body(Element::new("img").with_class("lazy").with_attr("data-src", "/img/1.jpg"));

    let source = Arc::new(RecordingSuggestionSource::new());
    let mut rt = PageRuntime::builder(t.page.clone(), clock.clone())
        .suggestions(source.clone())
        .build();
    assert!(rt.boot().is_empty());

    assert_eq!(t.page.get(time).unwrap().content, "Pay, 9-may, 09:00:00");
    clock.advance(Duration::from_secs(2));
    assert_eq!(t.page.get(time).unwrap().content, "Pay, 9-may, 09:00:02");

    t.page.update(input, |el| el.value = "futbol".to_string());
    rt.dispatch(&DomEvent::Input { target: input });
    clock.advance(Duration::from_millis(300));
    assert_eq!(source.queries(), vec!["futbol".to_string()]);

    rt.dispatch(&DomEvent::Intersection {
        entries: vec![IntersectionEntry::visible(img)],
    });
    assert_eq!(t.page.get(img).unwrap().attr("src").as_deref(), Some("/img/1.jpg"));

    rt.shutdown();
    let frozen = t.page.get(time).unwrap().content;
    clock.advance(Duration::from_secs(5));
    assert_eq!(t.page.get(time).unwrap().content, frozen);
}

#[test]
fn test_repeated_content_loaded_leaves_one_clock() {
    let t = TestPage::new();
    let time = t.page.append_to_body(Element::new("span").with_id("tashkent-time"));
    let form = t.page.append_to_body(Element::new("form").with_attr("action", "/search"));
    let input = t.page.insert(form, Element::new("input").with_attr("name", "q")).unwrap();
    let source = Arc::new(RecordingSuggestionSource::new());
    let mut rt = PageRuntime::builder(t.page.clone(), t.clock.clone())
        .suggestions(source.clone())
        .build();

    rt.on_content_loaded();
    t.page.update(input, |el| el.value = "kino".to_string());
    rt.dispatch(&DomEvent::Input { target: input });
    rt.on_content_loaded();
    assert_eq!(t.clock.pending_count(), 1);
    t.advance_ms(300);
    assert!(source.queries().is_empty());

    drop(rt);
    assert_eq!(t.clock.pending_count(), 0);
    let frozen = t.page.get(time).unwrap().content;
    t.advance_ms(10_000);
    assert_eq!(t.page.get(time).unwrap().content, frozen);
}

#[test]
fn test_close_button_dismisses_banner() {
    let t = TestPage::new();
    let rt = runtime(&t);
    let id = rt.show_notification("Xabar", Severity::Info);
    let banner = rt.notifier().get(id).unwrap().element;
    let close = t.page.children(banner)[0];

    rt.dispatch(&DomEvent::Click { target: close });
    assert!(!t.page.contains(banner));
    t.advance_ms(3000);
    assert_eq!(t.events.count(names::NOTIFICATION_REMOVED), 1);
}

#[test]
fn test_copy_through_runtime() {
    let t = TestPage::new();
    let clipboard = Arc::new(RecordingClipboard::new());
    let rt = PageRuntime::builder(t.page.clone(), t.clock.clone())
        .clipboard(clipboard.clone())
        .build();

    let outcome = tokio_test::block_on(rt.copy_to_clipboard("https://news.uz/yangilik/1"));
    assert_eq!(outcome, CopyOutcome::Clipboard);
    assert_eq!(clipboard.writes().len(), 1);
    assert_eq!(rt.notifier().visible_count(), 1);
}

#[test]
fn test_rejected_clipboard_uses_fallback_through_runtime() {
    let t = TestPage::new();
    let rt = PageRuntime::builder(t.page.clone(), t.clock.clone())
        .clipboard(Arc::new(RejectingClipboard::default()))
        .build();

    let outcome = tokio_test::block_on(rt.copy_to_clipboard("matn"));
    assert_eq!(outcome, CopyOutcome::Fallback);
    let alert = t.page.query_selector(&Selector::class("alert-success")).unwrap();
    assert_eq!(t.page.get(alert).unwrap().content, "Matn nusxa olindi!");
}

#[test]
fn test_public_formatting_surface() {
    let t = TestPage::new();
    let rt = runtime(&t);
    assert_eq!(rt.format_number(1234.5), "1 234,5");
    assert_eq!(rt.format_currency(1_500_000.0), "1 500 000 so'm");
    let date = Utc.with_ymd_and_hms(2024, 1, 15, 7, 30, 0).unwrap();
    assert_eq!(rt.format_uzbek_date(date), "15-yanvar, 2024-yil, 12:30");
    assert!(rt.share_to_social("vk", None, None).is_none());
}

#[test]
fn test_custom_config_reaches_components() {
    let config = PageConfig::from_json_str(r#"{"notifications": {"ttl_ms": 500}}"#).unwrap();
    let t = TestPage::with_config("http://localhost/", "", config.clone());
    let rt = PageRuntime::builder(t.page.clone(), t.clock.clone())
        .config(config)
        .build();

    rt.show_notification("Tez", Severity::Info);
    t.advance_ms(500);
    assert_eq!(rt.notifier().visible_count(), 0);
}

#[tokio::test]
async fn test_run_consumes_event_stream() {
    let (t, share, _) = article_page();
    let mut rt = runtime(&t);
    rt.boot();

    let events = futures::stream::iter(vec![
        DomEvent::Scroll,
        DomEvent::Click { target: share },
        DomEvent::Click { target: share },
    ]);
    assert_eq!(rt.run(events).await, 3);
    assert_eq!(t.page.opened_windows().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_notification_lifecycle_on_tokio_timers() {
    let page = Arc::new(Page::default());
    let scheduler = Arc::new(TokioScheduler::new());
    let rt = PageRuntime::builder(page.clone(), scheduler.clone()).build();

    let first = rt.show_notification("Birinchi", Severity::Info);
    let first_banner = rt.notifier().get(first).unwrap().element;
    tokio::time::sleep(Duration::from_millis(1000)).await;
    let second = rt.show_notification("Ikkinchi", Severity::Error);
    let second_banner = rt.notifier().get(second).unwrap().element;
    assert_eq!(rt.notifier().visible_count(), 2);

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert!(!page.contains(first_banner));
    assert!(rt.notifier().get(first).is_none());
    assert!(page.contains(second_banner));

    assert!(rt.notifier().dismiss(second));
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(rt.notifier().visible_count(), 0);
    assert_eq!(scheduler.pending_count(), 0);
}
