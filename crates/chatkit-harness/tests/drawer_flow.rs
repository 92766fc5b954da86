//! Drawer open/close choreography and its focus handoff with the
//! chat list.

use chatkit_components::UiEvent;
use chatkit_dom::NodeId;
use chatkit_harness::chat_page;
use chatkit_runtime::FocusRecord;

const CHATS: &[(u64, &str)] = &[(1, "First"), (2, "Second")];

fn parts(page: &chatkit_components::Page) -> (NodeId, NodeId, NodeId) {
    let drawer = page.doc().element_by_id("drawer").unwrap();
    let button = page.doc().element_by_id("drawer-button").unwrap();
    let dialog = page.doc().target(drawer, "dialog").unwrap();
    (drawer, button, dialog)
}

fn open_drawer(page: &mut chatkit_components::Page) {
    let (_, button, _) = parts(page);
    page.dispatch(UiEvent::Click { target: button });
    page.tick();
}

#[test]
fn open_is_deferred_one_frame() {
    let mut page = chat_page(CHATS, Some(1));
    let (_, button, dialog) = parts(&page);

    page.dispatch(UiEvent::Click { target: button });
    assert!(page.doc().attr(dialog, "open").is_none());

    page.tick();
    assert!(page.doc().attr(dialog, "open").is_some());
    assert_eq!(page.doc().attr(dialog, "aria-hidden"), Some("false"));
    let body = page.doc().body();
    assert!(page.doc().has_class(body, "overflow-hidden"));
}

#[test]
fn opening_restores_focus_into_the_list() {
    let mut page = chat_page(CHATS, Some(1));
    // Nothing stored yet: fall back to the active chat's link.
    open_drawer(&mut page);

    let active = page.doc().element_by_id("chat_1").unwrap();
    let link = page.doc().target(active, "linkToChat").unwrap();
    assert_eq!(page.doc().active_element(), Some(link));
}

#[test]
fn close_stores_focus_before_returning_it_to_the_trigger() {
    let mut page = chat_page(CHATS, Some(1));
    open_drawer(&mut page);

    let item = page.doc().element_by_id("chat_2").unwrap();
    let edit = page.doc().target(item, "editChatLink").unwrap();
    page.doc_mut().focus(edit);

    let (drawer, button, dialog) = parts(&page);
    let close = page.doc().target(drawer, "closeButton").unwrap();
    page.dispatch(UiEvent::Click { target: close });
    // Close is animated: still open until transitions settle.
    assert!(page.doc().attr(dialog, "open").is_some());
    assert!(page.doc().attr(dialog, "closing").is_some());

    page.tick();
    assert!(page.doc().attr(dialog, "open").is_none());
    assert!(page.doc().attr(dialog, "closing").is_none());
    assert_eq!(page.doc().active_element(), Some(button));
    let body = page.doc().body();
    assert!(!page.doc().has_class(body, "overflow-hidden"));

    // The list captured the focus position before the refocus.
    assert_eq!(
        page.focus_store().get(),
        Some(FocusRecord::new("chat_2", "editChatLink"))
    );
}

#[test]
fn close_waits_for_inflight_transitions() {
    let mut page = chat_page(CHATS, Some(1));
    open_drawer(&mut page);
    let (drawer, _, dialog) = parts(&page);

    page.begin_transition(dialog);
    let close = page.doc().target(drawer, "closeButton").unwrap();
    page.dispatch(UiEvent::Click { target: close });

    page.tick();
    assert!(page.doc().attr(dialog, "open").is_some());

    page.end_transition(dialog);
    page.tick();
    assert!(page.doc().attr(dialog, "open").is_none());
}

#[test]
fn reopening_restores_the_stored_position() {
    let mut page = chat_page(CHATS, Some(1));
    open_drawer(&mut page);

    let item = page.doc().element_by_id("chat_2").unwrap();
    let edit = page.doc().target(item, "editChatLink").unwrap();
    page.doc_mut().focus(edit);

    let (drawer, _, _) = parts(&page);
    let close = page.doc().target(drawer, "closeButton").unwrap();
    page.dispatch(UiEvent::Click { target: close });
    page.tick();

    open_drawer(&mut page);
    assert_eq!(page.doc().active_element(), Some(edit));
}

#[test]
fn dialog_cancel_runs_the_animated_close() {
    let mut page = chat_page(CHATS, Some(1));
    open_drawer(&mut page);
    let (_, button, dialog) = parts(&page);

    page.dispatch(UiEvent::DialogCancel { target: dialog });
    // Prevented the native instant close.
    assert!(page.doc().attr(dialog, "open").is_some());
    assert!(page.doc().attr(dialog, "closing").is_some());

    page.tick();
    assert!(page.doc().attr(dialog, "open").is_none());
    assert_eq!(page.doc().active_element(), Some(button));
}

#[test]
fn backdrop_click_closes_but_content_clicks_do_not() {
    let mut page = chat_page(CHATS, Some(1));
    open_drawer(&mut page);
    let (_, _, dialog) = parts(&page);

    let item = page.doc().element_by_id("chat_1").unwrap();
    let link = page.doc().target(item, "linkToChat").unwrap();
    page.dispatch(UiEvent::Click { target: link });
    page.tick();
    assert!(page.doc().attr(dialog, "open").is_some());

    page.dispatch(UiEvent::Click { target: dialog });
    page.tick();
    assert!(page.doc().attr(dialog, "open").is_none());
}

#[test]
fn duplicate_close_requests_coalesce() {
    let mut page = chat_page(CHATS, Some(1));
    open_drawer(&mut page);
    let (drawer, button, dialog) = parts(&page);

    let close = page.doc().target(drawer, "closeButton").unwrap();
    page.dispatch(UiEvent::Click { target: close });
    page.dispatch(UiEvent::Click { target: close });
    page.dispatch(UiEvent::DialogCancel { target: dialog });

    page.tick();
    assert!(page.doc().attr(dialog, "open").is_none());
    assert_eq!(page.doc().active_element(), Some(button));
    // A settled close leaves no stray wait behind.
    page.tick();
    assert!(page.doc().attr(dialog, "closing").is_none());
}
