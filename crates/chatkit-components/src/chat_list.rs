#![forbid(unsafe_code)]

//! Chat list orchestration.
//!
//! Owns everything about the list that no single row can: which row is
//! highlighted as the current chat, mutual exclusion while one row is
//! being renamed, focus restoration after a rename or a drawer
//! open/close, and keeping keyboard position across fragment
//! replacement via the session focus store.
//!
//! The rename flow spans two server round trips (swap the link for a
//! form, then swap the form back) and the controller instance survives
//! both; the `editing` flag plus the shift-tab latch carry intent from
//! the click to the moment the fresh link connects.

use std::time::Duration;

use chatkit_dom::NodeId;
use chatkit_runtime::{FocusRecord, Signal, SubscriptionId, TimerId, Wakeup};

use crate::context::Context;
use crate::controller::Controller;
use crate::diagnostics::Diagnostics;
use crate::event::{EventKind, Key, UiEvent};
use crate::listeners::{ListenerId, ListenerScope};

/// Controls stay disabled briefly after a rename settles, absorbing
/// clicks aimed at the stale markup. Ordering, not timing: the page's
/// virtual clock decides when it elapses.
pub const EDIT_GRACE: Duration = Duration::from_millis(300);

/// Id of the new-chat form, disabled during a rename.
const NEW_CHAT_FORM: &str = "chats_new_form_new";

pub struct ChatList {
    diagnostics: Diagnostics,
    listeners: Vec<ListenerId>,
    subscription: Option<SubscriptionId>,
    editing: bool,
    finished_shift_tab: bool,
    grace_timer: Option<TimerId>,
}

impl ChatList {
    #[must_use]
    pub fn new() -> Self {
        Self {
            diagnostics: Diagnostics::new(true),
            listeners: Vec::new(),
            subscription: None,
            editing: false,
            finished_shift_tab: false,
            grace_timer: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────
    // Active-chat highlighting
    // ─────────────────────────────────────────────────────────────────

    /// Mark the row for the chat named by the location path, clear the
    /// mark everywhere else. A path without a chat id leaves the list
    /// untouched.
    fn highlight(&self, cx: &mut Context) {
        let path = cx.env.page_path.clone();
        let Some(rest) = path.strip_prefix("/chats/") else {
            return;
        };
        let id = rest.split('/').next().unwrap_or(rest);
        if id.is_empty() {
            return;
        }
        let wanted = format!("chat_{id}");
        for item in cx.doc.targets(cx.root, "chatItem") {
            let is_active = cx
                .doc
                .element(item)
                .is_some_and(|el| el.id.as_deref() == Some(wanted.as_str()));
            let link = cx.doc.target(item, "linkToChat");
            if is_active {
                cx.doc.add_class(item, "active-chat");
                if let Some(link) = link {
                    cx.doc.set_attr(link, "aria-current", "page");
                }
            } else {
                cx.doc.remove_class(item, "active-chat");
                if let Some(link) = link {
                    cx.doc.remove_attr(link, "aria-current");
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────
    // Mutual exclusion while renaming
    // ─────────────────────────────────────────────────────────────────

    fn set_controls_disabled(&self, disabled: bool, except: Option<NodeId>, cx: &mut Context) {
        for item in cx.doc.targets(cx.root, "chatItem") {
            if except == Some(item) {
                continue;
            }
            if disabled {
                cx.doc.add_class(item, "cursor-not-allowed");
            } else {
                cx.doc.remove_class(item, "cursor-not-allowed");
            }
            for name in ["linkToChat", "editChatLink", "deleteChat"] {
                for control in cx.doc.targets(item, name) {
                    if disabled {
                        cx.doc.set_attr(control, "aria-disabled", "true");
                    } else {
                        cx.doc.remove_attr(control, "aria-disabled");
                    }
                    let is_button = cx
                        .doc
                        .element(control)
                        .is_some_and(|el| el.tag == "button");
                    if is_button {
                        cx.doc.set_disabled(control, disabled);
                    }
                }
            }
        }
        if let Some(form) = cx.doc.element_by_id(NEW_CHAT_FORM) {
            let controls = cx
                .doc
                .find_all(form, |el| el.tag == "input" || el.tag == "button");
            for control in controls {
                cx.doc.set_disabled(control, disabled);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────
    // Focus persistence
    // ─────────────────────────────────────────────────────────────────

    /// Remember the focused control as (enclosing id, target name) so
    /// it survives the element being replaced wholesale.
    fn store_focus(&self, cx: &mut Context) {
        let Some(active) = cx.doc.active_element() else {
            return;
        };
        if !cx.doc.contains(cx.root, active) {
            return;
        }
        let Some(target_name) = cx.doc.data(active, "target").map(str::to_string) else {
            return;
        };
        let Some(enclosing) = cx.doc.closest(active, |el| el.id.is_some()) else {
            return;
        };
        let Some(fragment_id) = cx.doc.element(enclosing).and_then(|el| el.id.clone()) else {
            return;
        };
        cx.focus_store
            .set(&FocusRecord::new(&fragment_id, &target_name));
    }

    fn restore_focus(&self, cx: &mut Context) {
        if let Some(record) = cx.focus_store.get()
            && let Some(enclosing) = cx.doc.element_by_id(&record.fragment_id)
            && let Some(control) = cx.doc.target(enclosing, &record.target_name)
        {
            cx.doc.focus(control);
            return;
        }
        // Stale or absent record: land on the active chat's link.
        if let Some(item) = cx
            .doc
            .find(cx.root, |el| el.classes.contains("active-chat"))
            && let Some(link) = cx.doc.find(item, |el| el.tag == "a")
        {
            cx.doc.focus(link);
        }
    }

    // ─────────────────────────────────────────────────────────────────
    // Row actions
    // ─────────────────────────────────────────────────────────────────

    fn begin_edit(&mut self, link: NodeId, cx: &mut Context) {
        if self.editing {
            return;
        }
        self.editing = true;
        self.finished_shift_tab = false;
        let item = cx
            .doc
            .closest(link, |el| el.dataset.get("target").is_some_and(|t| t == "chatItem"));
        self.set_controls_disabled(true, item, cx);
        cx.activate(link);
    }

    fn delete_chat(&mut self, control: NodeId, cx: &mut Context) {
        // Park focus on the next row before this one disappears.
        if let Some(item) = cx
            .doc
            .closest(control, |el| el.dataset.get("target").is_some_and(|t| t == "chatItem"))
            && let Some(next) = cx.doc.next_sibling(item)
            && let Some(link) = cx.doc.target(next, "linkToChat")
        {
            cx.doc.focus(link);
        }
        cx.activate(control);
    }
}

impl Default for ChatList {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for ChatList {
    fn name(&self) -> &'static str {
        "chat-list"
    }

    fn attach(&mut self, cx: &mut Context) {
        self.diagnostics.connected(self.name(), cx.doc);
        let root = cx.root;
        self.listeners
            .push(cx.listen(ListenerScope::Element(root), EventKind::Click));
        self.listeners
            .push(cx.listen(ListenerScope::Element(root), EventKind::KeyUp));
        // Body scope: rename signals come from inside the list, drawer
        // signals from outside it.
        let body = cx.doc.body();
        self.subscription = Some(cx.subscribe(body));
        self.highlight(cx);
    }

    fn detach(&mut self, cx: &mut Context) {
        for listener in self.listeners.drain(..) {
            cx.unlisten(listener);
        }
        if let Some(subscription) = self.subscription.take() {
            cx.unsubscribe(subscription);
        }
        if let Some(timer) = self.grace_timer.take() {
            cx.clear_timeout(timer);
        }
    }

    fn on_event(&mut self, event: &UiEvent, cx: &mut Context) {
        match *event {
            UiEvent::KeyUp { key: Key::Tab, .. } => {
                // Focus has already moved when keyup fires.
                self.store_focus(cx);
            }
            UiEvent::Click { target } => {
                if let Some(link) = cx.doc.closest(target, |el| {
                    el.dataset.get("target").is_some_and(|t| t == "editChatLink")
                }) {
                    if !cx.doc.is_disabled(link) && cx.doc.attr(link, "aria-disabled").is_none() {
                        self.begin_edit(link, cx);
                    }
                    return;
                }
                if let Some(control) = cx.doc.closest(target, |el| {
                    el.dataset.get("target").is_some_and(|t| t == "deleteChat")
                }) && !cx.doc.is_disabled(control)
                {
                    self.delete_chat(control, cx);
                }
            }
            _ => {}
        }
    }

    fn on_signal(&mut self, signal: &Signal, cx: &mut Context) {
        match *signal {
            Signal::EditFinished { used_shift_tab } => {
                self.finished_shift_tab = used_shift_tab;
            }
            Signal::DrawerOpenChanged { open } => {
                if open {
                    self.restore_focus(cx);
                } else {
                    self.store_focus(cx);
                }
            }
            Signal::CopyFinished { .. } => {}
        }
    }

    fn on_wakeup(&mut self, wakeup: Wakeup, cx: &mut Context) {
        if let Wakeup::Timer(id) = wakeup
            && self.grace_timer == Some(id)
        {
            self.grace_timer = None;
            self.set_controls_disabled(false, None, cx);
        }
    }

    fn fragments_connected(&mut self, inserted: &[NodeId], cx: &mut Context) {
        let link = inserted.iter().copied().find_map(|n| {
            if !cx.doc.contains(cx.root, n) {
                return None;
            }
            let is_link = cx
                .doc
                .data(n, "target")
                .is_some_and(|t| t == "editChatLink");
            if is_link {
                Some(n)
            } else {
                cx.doc.target(n, "editChatLink")
            }
        });
        // New markup, recompute the highlight either way.
        self.highlight(cx);
        let Some(link) = link else {
            return;
        };
        if !self.editing {
            return;
        }
        self.editing = false;
        self.grace_timer = Some(cx.set_timeout(EDIT_GRACE));
        if self.finished_shift_tab {
            // Backward exit lands on the row's detail link.
            let detail = cx
                .doc
                .closest(link, |el| el.dataset.get("target").is_some_and(|t| t == "chatItem"))
                .and_then(|item| cx.doc.target(item, "linkToChat"));
            if let Some(detail) = detail {
                cx.doc.focus(detail);
            }
        } else {
            cx.doc.focus(link);
        }
        self.finished_shift_tab = false;
        self.store_focus(cx);
    }
}
