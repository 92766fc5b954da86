#![forbid(unsafe_code)]

//! Disclosure menu with roving keyboard focus.
//!
//! Open state lives in the button's `aria-expanded` attribute; there
//! is no shadow boolean to drift out of sync when the server replaces
//! the fragment. Arrow keys move focus through the menu items with
//! wraparound, Escape closes and returns focus to the button, and a
//! click anywhere outside the component closes the menu.

use chatkit_dom::NodeId;

use crate::context::Context;
use crate::controller::Controller;
use crate::diagnostics::Diagnostics;
use crate::event::{EventKind, Key, UiEvent};
use crate::listeners::{ListenerId, ListenerScope};

pub struct Dropdown {
    diagnostics: Diagnostics,
    listeners: Vec<ListenerId>,
}

impl Dropdown {
    #[must_use]
    pub fn new() -> Self {
        Self {
            diagnostics: Diagnostics::new(true),
            listeners: Vec::new(),
        }
    }

    fn button(&self, cx: &Context) -> Option<NodeId> {
        cx.doc.target(cx.root, "menuButton")
    }

    fn is_open(&self, cx: &Context) -> bool {
        self.button(cx)
            .and_then(|b| cx.doc.attr(b, "aria-expanded").map(str::to_string))
            .is_some_and(|v| v == "true")
    }

    fn open(&self, cx: &mut Context) {
        let Some(button) = self.button(cx) else {
            return;
        };
        if let Some(menu) = cx.doc.target(cx.root, "menu") {
            cx.doc.remove_attr(menu, "hidden");
            cx.doc.remove_class(menu, "hidden");
        }
        cx.doc.set_attr(button, "aria-expanded", "true");
        let items = cx.doc.targets(cx.root, "menuItem");
        if let Some(first) = items.first() {
            cx.doc.focus(*first);
        }
    }

    fn close(&self, cx: &mut Context) {
        let Some(button) = self.button(cx) else {
            return;
        };
        if let Some(menu) = cx.doc.target(cx.root, "menu") {
            cx.doc.set_attr(menu, "hidden", "");
            cx.doc.add_class(menu, "hidden");
        }
        cx.doc.set_attr(button, "aria-expanded", "false");
        cx.doc.focus(button);
    }

    fn toggle(&self, cx: &mut Context) {
        if self.is_open(cx) {
            self.close(cx);
        } else {
            self.open(cx);
        }
    }

    /// Index of the currently focused menu item, if any.
    fn focused_index(&self, cx: &Context, items: &[NodeId]) -> Option<usize> {
        let active = cx.doc.active_element()?;
        items.iter().position(|i| *i == active)
    }

    fn focus_next(&self, cx: &mut Context) {
        let items = cx.doc.targets(cx.root, "menuItem");
        if items.is_empty() {
            return;
        }
        let next = match self.focused_index(cx, &items) {
            Some(i) if i + 1 >= items.len() => 0,
            Some(i) => i + 1,
            None => 0,
        };
        cx.doc.focus(items[next]);
    }

    fn focus_previous(&self, cx: &mut Context) {
        let items = cx.doc.targets(cx.root, "menuItem");
        if items.is_empty() {
            return;
        }
        let previous = match self.focused_index(cx, &items) {
            Some(0) | None => items.len() - 1,
            Some(i) => i - 1,
        };
        cx.doc.focus(items[previous]);
    }
}

impl Default for Dropdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for Dropdown {
    fn name(&self) -> &'static str {
        "dropdown"
    }

    fn attach(&mut self, cx: &mut Context) {
        self.diagnostics.connected(self.name(), cx.doc);
        let root = cx.root;
        self.listeners
            .push(cx.listen(ListenerScope::Element(root), EventKind::Click));
        self.listeners
            .push(cx.listen(ListenerScope::Element(root), EventKind::KeyDown));
        // Outside clicks close the menu.
        self.listeners
            .push(cx.listen(ListenerScope::Document, EventKind::Click));
    }

    fn detach(&mut self, cx: &mut Context) {
        for listener in self.listeners.drain(..) {
            cx.unlisten(listener);
        }
    }

    fn on_event(&mut self, event: &UiEvent, cx: &mut Context) {
        match *event {
            UiEvent::Click { target } => {
                if cx.doc.contains(cx.root, target) {
                    if let Some(button) = self.button(cx)
                        && cx.doc.contains(button, target)
                    {
                        self.toggle(cx);
                    }
                } else if self.is_open(cx) {
                    self.close(cx);
                }
            }
            UiEvent::KeyDown { key, target, .. } => {
                if !cx.doc.contains(cx.root, target) {
                    return;
                }
                match key {
                    Key::Escape => {
                        if self.is_open(cx) {
                            self.close(cx);
                        }
                    }
                    Key::ArrowDown | Key::ArrowRight => {
                        if self.is_open(cx) {
                            cx.prevent_default();
                            self.focus_next(cx);
                        }
                    }
                    Key::ArrowUp | Key::ArrowLeft => {
                        if self.is_open(cx) {
                            cx.prevent_default();
                            self.focus_previous(cx);
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }
}
