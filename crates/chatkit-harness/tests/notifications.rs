//! Flash relay error paths and the visibility health check.

use std::time::Duration;

use chatkit_components::{Env, Page, UiEvent};
use chatkit_dom::{Document, Fragment, NodeId};
use chatkit_runtime::{
    FakeClipboard, FakeFlashEndpoint, FakeHealthProbe, FlashError, HealthError,
};
use chatkit_harness::CSRF_TOKEN;

/// Minimal page: csrf meta, flash container, relay on body, one copy
/// button, the app shell.
fn notification_doc() -> (Document, NodeId) {
    let mut doc = Document::new();
    let body = doc.body();
    let meta = doc.create_element("meta");
    doc.set_attr(meta, "name", "csrf-token");
    doc.set_attr(meta, "content", CSRF_TOKEN);
    doc.append_child(body, meta);
    let container = doc.append_fragment(body, &Fragment::new("div").id("flash_messages"));
    doc.append_fragment(body, &Fragment::new("div").controller("app"));
    doc.append_fragment(
        body,
        &Fragment::new("button")
            .id("copy-1")
            .controller("clipboard")
            .data("clipboard-text", "secret"),
    );
    doc.set_data(body, "controller", "flash");
    (doc, container)
}

fn banner_text(page: &Page, container: NodeId) -> String {
    let banner = page.doc().first_child(container).expect("banner appended");
    page.doc().deep_text(banner)
}

#[test]
fn endpoint_failure_renders_a_local_banner() {
    let (doc, container) = notification_doc();
    let mut endpoint = FakeFlashEndpoint::new();
    endpoint.enqueue(Err(FlashError::Http(500)));
    let mut page = Page::with_services(
        doc,
        Env::default(),
        FakeClipboard::new(),
        endpoint,
        FakeHealthProbe::new(),
    );
    page.attach_all();

    let button = page.doc().element_by_id("copy-1").unwrap();
    page.dispatch(UiEvent::Click { target: button });

    assert_eq!(page.flash_endpoint().requests.len(), 1);
    let text = banner_text(&page, container);
    assert!(
        text.contains("An error occurred: HTTP error! Status: 500"),
        "{text}"
    );
}

#[test]
fn fallback_banner_auto_dismisses() {
    let (doc, container) = notification_doc();
    let mut endpoint = FakeFlashEndpoint::new();
    endpoint.enqueue(Err(FlashError::Transport("offline".into())));
    let mut page = Page::with_services(
        doc,
        Env::default(),
        FakeClipboard::new(),
        endpoint,
        FakeHealthProbe::new(),
    );
    page.attach_all();

    let button = page.doc().element_by_id("copy-1").unwrap();
    page.dispatch(UiEvent::Click { target: button });
    let banner = page.doc().first_child(container).unwrap();

    page.advance(Duration::from_millis(7999));
    assert!(page.doc().alive(banner));
    page.advance(Duration::from_millis(1));
    assert!(!page.doc().alive(banner));
}

#[test]
fn test_environment_shortens_the_banner_delay() {
    let (mut doc, container) = notification_doc();
    let body = doc.body();
    let meta = doc.create_element("meta");
    doc.set_attr(meta, "name", "environment");
    doc.set_attr(meta, "content", "test");
    doc.append_child(body, meta);

    let mut endpoint = FakeFlashEndpoint::new();
    endpoint.enqueue(Err(FlashError::Transport("offline".into())));
    let mut page = Page::with_services(
        doc,
        Env::default(),
        FakeClipboard::new(),
        endpoint,
        FakeHealthProbe::new(),
    );
    page.attach_all();

    let button = page.doc().element_by_id("copy-1").unwrap();
    page.dispatch(UiEvent::Click { target: button });
    let banner = page.doc().first_child(container).unwrap();

    page.advance(Duration::from_millis(500));
    assert!(!page.doc().alive(banner));
}

#[test]
fn becoming_visible_checks_server_health() {
    let (doc, container) = notification_doc();
    let mut page = Page::with_services(
        doc,
        Env::default(),
        FakeClipboard::new(),
        FakeFlashEndpoint::new(),
        FakeHealthProbe::failing(HealthError::Transport("connection refused".into())),
    );
    page.attach_all();

    page.dispatch(UiEvent::VisibilityChanged { visible: false });
    assert_eq!(page.health().checks, 0);

    page.dispatch(UiEvent::VisibilityChanged { visible: true });
    assert_eq!(page.health().checks, 1);
    let text = banner_text(&page, container);
    assert!(
        text.contains("Server unreachable: health check request failed: connection refused"),
        "{text}"
    );
}

#[test]
fn healthy_server_stays_quiet() {
    let (doc, container) = notification_doc();
    let mut page = Page::with_services(
        doc,
        Env::default(),
        FakeClipboard::new(),
        FakeFlashEndpoint::new(),
        FakeHealthProbe::new(),
    );
    page.attach_all();

    page.dispatch(UiEvent::VisibilityChanged { visible: true });
    assert_eq!(page.health().checks, 1);
    assert!(page.doc().first_child(container).is_none());
}
