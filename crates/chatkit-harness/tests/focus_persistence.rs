//! Keyboard position surviving fragment replacement, page loads, and
//! bad stored data.

use chatkit_components::{Key, Modifiers, Page, UiEvent};
use chatkit_dom::StreamMessage;
use chatkit_harness::{FakeServer, chat_doc, chat_page, new_chat_form};
use chatkit_runtime::{FocusRecord, FocusStore, MemoryFocusStore, SessionFile};

const CHATS: &[(u64, &str)] = &[(1, "First"), (2, "Second"), (3, "Third")];

#[test]
fn tab_keyup_records_the_focused_control() {
    let mut page = chat_page(CHATS, Some(1));
    let item = page.doc().element_by_id("chat_2").unwrap();
    let edit = page.doc().target(item, "editChatLink").unwrap();
    page.doc_mut().focus(edit);

    page.dispatch(UiEvent::KeyUp {
        key: Key::Tab,
        modifiers: Modifiers::NONE,
        target: edit,
    });

    assert_eq!(
        page.focus_store().get(),
        Some(FocusRecord::new("chat_2", "editChatLink"))
    );
}

#[test]
fn focus_outside_the_list_is_not_recorded() {
    let mut page = chat_page(CHATS, Some(1));
    let button = page.doc().element_by_id("user-menu-button").unwrap();
    page.doc_mut().focus(button);

    page.dispatch(UiEvent::KeyUp {
        key: Key::Tab,
        modifiers: Modifiers::NONE,
        target: button,
    });

    // The menu button lives outside the chat list.
    assert_eq!(page.focus_store().get(), None);
}

#[test]
fn malformed_stored_data_falls_back_to_the_active_chat() {
    let (doc, env) = chat_doc(CHATS, Some(2));
    let mut page = Page::new(doc, env);
    let mut store = MemoryFocusStore::new();
    store.set_raw("{definitely not json");
    page.set_focus_store(Box::new(store));
    page.attach_all();

    let button = page.doc().element_by_id("drawer-button").unwrap();
    page.dispatch(UiEvent::Click { target: button });
    page.tick();

    let active = page.doc().element_by_id("chat_2").unwrap();
    let link = page.doc().target(active, "linkToChat").unwrap();
    assert_eq!(page.doc().active_element(), Some(link));
}

#[test]
fn stale_record_falls_back_to_the_active_chat() {
    let (doc, env) = chat_doc(CHATS, Some(1));
    let mut page = Page::new(doc, env);
    let mut store = MemoryFocusStore::new();
    store.set(&FocusRecord::new("chat_999", "editChatLink"));
    page.set_focus_store(Box::new(store));
    page.attach_all();

    let button = page.doc().element_by_id("drawer-button").unwrap();
    page.dispatch(UiEvent::Click { target: button });
    page.tick();

    let active = page.doc().element_by_id("chat_1").unwrap();
    let link = page.doc().target(active, "linkToChat").unwrap();
    assert_eq!(page.doc().active_element(), Some(link));
}

#[test]
fn session_file_carries_focus_across_page_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat-focus.json");

    {
        let (doc, env) = chat_doc(CHATS, Some(1));
        let mut page = Page::new(doc, env);
        page.set_focus_store(Box::new(SessionFile::new(&path)));
        page.attach_all();

        let item = page.doc().element_by_id("chat_3").unwrap();
        let edit = page.doc().target(item, "editChatLink").unwrap();
        page.doc_mut().focus(edit);
        page.dispatch(UiEvent::KeyUp {
            key: Key::Tab,
            modifiers: Modifiers::NONE,
            target: edit,
        });
    }

    // A fresh page (new element identities, same markup).
    let (doc, env) = chat_doc(CHATS, Some(1));
    let mut page = Page::new(doc, env);
    page.set_focus_store(Box::new(SessionFile::new(&path)));
    page.attach_all();

    let button = page.doc().element_by_id("drawer-button").unwrap();
    page.dispatch(UiEvent::Click { target: button });
    page.tick();

    let item = page.doc().element_by_id("chat_3").unwrap();
    let edit = page.doc().target(item, "editChatLink").unwrap();
    assert_eq!(page.doc().active_element(), Some(edit));
}

#[test]
fn deleting_a_chat_moves_focus_to_the_next_row() {
    let mut page = chat_page(CHATS, Some(1));
    let mut server = FakeServer::new(CHATS);

    let item = page.doc().element_by_id("chat_1").unwrap();
    let delete = page.doc().target(item, "deleteChat").unwrap();
    page.dispatch(UiEvent::Click { target: delete });
    server.respond(&mut page);

    assert!(page.doc().element_by_id("chat_1").is_none());
    let next = page.doc().element_by_id("chat_2").unwrap();
    let link = page.doc().target(next, "linkToChat").unwrap();
    assert_eq!(page.doc().active_element(), Some(link));
}

#[test]
fn highlight_follows_the_location_path() {
    let page = chat_page(CHATS, Some(2));

    let active = page.doc().element_by_id("chat_2").unwrap();
    assert!(page.doc().has_class(active, "active-chat"));
    let link = page.doc().target(active, "linkToChat").unwrap();
    assert_eq!(page.doc().attr(link, "aria-current"), Some("page"));

    let other = page.doc().element_by_id("chat_1").unwrap();
    assert!(!page.doc().has_class(other, "active-chat"));
}

#[test]
fn index_path_highlights_nothing() {
    let page = chat_page(CHATS, None);
    for id in ["chat_1", "chat_2", "chat_3"] {
        let item = page.doc().element_by_id(id).unwrap();
        assert!(!page.doc().has_class(item, "active-chat"));
    }
}

#[test]
fn highlight_recompute_leaves_every_row_byte_identical() {
    let mut page = chat_page(CHATS, Some(2));

    let snapshot = |page: &Page| {
        CHATS
            .iter()
            .map(|(id, _)| {
                let item = page.doc().element_by_id(&format!("chat_{id}")).unwrap();
                let classes = page.doc().element(item).unwrap().classes.clone();
                let link = page.doc().target(item, "linkToChat").unwrap();
                let current = page.doc().attr(link, "aria-current").map(str::to_string);
                (classes, current)
            })
            .collect::<Vec<_>>()
    };
    let before = snapshot(&page);

    // Swapping an unrelated fragment makes every surviving controller
    // recompute its derived state.
    let swap = StreamMessage::new().replace("chats_new_form_new", new_chat_form());
    page.apply_stream(&swap);
    assert_eq!(snapshot(&page), before);
    page.apply_stream(&swap);
    assert_eq!(snapshot(&page), before);
}
