#![forbid(unsafe_code)]

//! Canonical page markup.
//!
//! Mirrors what the server renders: ids and target names here are the
//! contract the controllers navigate by, so tests and controllers meet
//! on the same structure.

use chatkit_dom::{Document, Fragment};
use chatkit_components::{Env, Page};

/// Token planted in the page's `csrf-token` meta entry.
pub const CSRF_TOKEN: &str = "test-csrf-token";

/// One chat row: detail link, rename link, delete button.
#[must_use]
pub fn chat_item(id: u64, name: &str) -> Fragment {
    Fragment::new("div")
        .id(&format!("chat_{id}"))
        .target("chatItem")
        .class("chat-item")
        .child(
            Fragment::new("a")
                .target("linkToChat")
                .attr("href", &format!("/chats/{id}"))
                .text(name),
        )
        .child(Fragment::new("a").target("editChatLink").text("Rename"))
        .child(Fragment::new("button").target("deleteChat").text("Delete"))
}

/// The same row mid-rename: the links swapped for the edit form.
#[must_use]
pub fn edit_item(id: u64, name: &str) -> Fragment {
    Fragment::new("div")
        .id(&format!("chat_{id}"))
        .target("chatItem")
        .class("chat-item")
        .child(
            Fragment::new("form")
                .controller("chat-edit")
                .data("current-value", name)
                .data("chat-id", &id.to_string())
                .child(Fragment::new("input").target("chatNameInput").value(name))
                .child(
                    Fragment::new("button")
                        .target("submitEditFormButton")
                        .text("Save"),
                )
                .child(
                    Fragment::new("button")
                        .target("cancelEditButton")
                        .text("Cancel"),
                ),
        )
}

/// The list container the chat-list controller attaches to.
#[must_use]
pub fn chat_list(chats: &[(u64, &str)]) -> Fragment {
    let mut items = Fragment::new("div").class("chat-items");
    for (id, name) in chats {
        items = items.child(chat_item(*id, name));
    }
    Fragment::new("div")
        .id("chats")
        .controller("chat-list")
        .child(items)
        .child(new_chat_form())
}

#[must_use]
pub fn new_chat_form() -> Fragment {
    Fragment::new("form")
        .id("chats_new_form_new")
        .child(Fragment::new("input").attr("name", "chat[name]"))
        .child(Fragment::new("button").text("New chat"))
}

/// A popup menu with two items.
#[must_use]
pub fn dropdown() -> Fragment {
    Fragment::new("div")
        .id("user-menu")
        .controller("dropdown")
        .child(
            Fragment::new("button")
                .id("user-menu-button")
                .target("menuButton")
                .attr("aria-expanded", "false"),
        )
        .child(
            Fragment::new("ul")
                .target("menu")
                .attr("hidden", "")
                .class("hidden")
                .child(Fragment::new("a").target("menuItem").text("Profile"))
                .child(Fragment::new("a").target("menuItem").text("Sign out")),
        )
}

fn meta(name: &str, content: &str) -> Fragment {
    Fragment::new("meta").attr("name", name).attr("content", content)
}

/// The full chat page document, controllers not yet attached.
///
/// `current` highlights that chat as active via the location path.
#[must_use]
pub fn chat_doc(chats: &[(u64, &str)], current: Option<u64>) -> (Document, Env) {
    let mut doc = Document::new();
    let body = doc.body();
    doc.append_fragment(body, &meta("csrf-token", CSRF_TOKEN));
    doc.append_fragment(body, &meta("environment", "test"));
    doc.append_fragment(body, &Fragment::new("div").id("flash_messages"));
    doc.append_fragment(body, &Fragment::new("div").id("app").controller("app"));

    let drawer = Fragment::new("div")
        .id("drawer")
        .controller("drawer")
        .child(
            Fragment::new("button")
                .id("drawer-button")
                .target("drawerButton")
                .text("Menu"),
        )
        .child(
            Fragment::new("dialog")
                .target("dialog")
                .child(Fragment::new("button").target("closeButton").text("Close"))
                .child(chat_list(chats))
                .child(dropdown()),
        );
    doc.append_fragment(body, &drawer);

    // Relay scopes to the whole page so any copy button reaches it.
    doc.set_data(body, "controller", "flash");

    let env = Env {
        page_path: match current {
            Some(id) => format!("/chats/{id}"),
            None => "/chats".to_string(),
        },
    };
    (doc, env)
}

/// [`chat_doc`] plus controller attachment, ready to drive.
#[must_use]
pub fn chat_page(chats: &[(u64, &str)], current: Option<u64>) -> Page {
    let (doc, env) = chat_doc(chats, current);
    let mut page = Page::new(doc, env);
    page.attach_all();
    page
}
