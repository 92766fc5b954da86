#![forbid(unsafe_code)]

//! Modal drawer with an animated close.
//!
//! Opening is deferred one frame so the dialog's entry transition
//! starts from its hidden state. Closing is a two-phase sequence: mark
//! the dialog `closing`, wait for every in-flight transition on it to
//! finish, then announce [`Signal::DrawerOpenChanged`] *before* the
//! dialog is hidden and focus returns to the trigger button, so
//! subscribers still see the open-state document when they run.
//!
//! Re-entrant closes are coalesced: a second close request while the
//! transition wait is pending does nothing.

use chatkit_runtime::{FrameId, Signal, WaitId, Wakeup};

use crate::context::{Context, PostOp};
use crate::controller::Controller;
use crate::diagnostics::Diagnostics;
use crate::event::{EventKind, Key, UiEvent};
use crate::listeners::{ListenerId, ListenerScope};

pub struct Drawer {
    diagnostics: Diagnostics,
    listeners: Vec<ListenerId>,
    open_frame: Option<FrameId>,
    close_wait: Option<WaitId>,
}

impl Drawer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            diagnostics: Diagnostics::new(true),
            listeners: Vec::new(),
            open_frame: None,
            close_wait: None,
        }
    }

    fn is_open(&self, cx: &Context) -> bool {
        cx.doc
            .target(cx.root, "dialog")
            .is_some_and(|d| cx.doc.attr(d, "open").is_some())
    }

    fn open(&mut self, cx: &mut Context) {
        if self.is_open(cx) || self.open_frame.is_some() {
            return;
        }
        self.open_frame = Some(cx.request_frame());
    }

    fn finish_open(&mut self, cx: &mut Context) {
        let Some(dialog) = cx.doc.target(cx.root, "dialog") else {
            return;
        };
        cx.doc.set_attr(dialog, "open", "");
        cx.doc.set_attr(dialog, "aria-hidden", "false");
        let body = cx.doc.body();
        cx.doc.add_class(body, "overflow-hidden");
        let origin = cx.root;
        cx.emit(origin, Signal::DrawerOpenChanged { open: true });
    }

    fn close(&mut self, cx: &mut Context) {
        if self.close_wait.is_some() || !self.is_open(cx) {
            return;
        }
        let Some(dialog) = cx.doc.target(cx.root, "dialog") else {
            return;
        };
        cx.doc.set_attr(dialog, "closing", "");
        self.close_wait = Some(cx.wait_transitions(dialog));
    }

    fn finish_close(&mut self, cx: &mut Context) {
        let Some(dialog) = cx.doc.target(cx.root, "dialog") else {
            return;
        };
        cx.doc.remove_attr(dialog, "closing");
        cx.doc.set_attr(dialog, "aria-hidden", "true");
        let origin = cx.root;
        cx.emit_cancelable(origin, Signal::DrawerOpenChanged { open: false });
        // Hide and refocus only after subscribers have run.
        cx.after_signals(PostOp::RemoveAttr(dialog, "open".to_string()));
        if let Some(button) = cx.doc.target(cx.root, "drawerButton") {
            cx.after_signals(PostOp::Focus(button));
        }
        let body = cx.doc.body();
        cx.after_signals(PostOp::RemoveClass(body, "overflow-hidden".to_string()));
    }
}

impl Default for Drawer {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for Drawer {
    fn name(&self) -> &'static str {
        "drawer"
    }

    fn attach(&mut self, cx: &mut Context) {
        self.diagnostics.connected(self.name(), cx.doc);
        let root = cx.root;
        self.listeners
            .push(cx.listen(ListenerScope::Element(root), EventKind::Click));
        self.listeners
            .push(cx.listen(ListenerScope::Element(root), EventKind::KeyDown));
        self.listeners
            .push(cx.listen(ListenerScope::Element(root), EventKind::DialogCancel));
    }

    fn detach(&mut self, cx: &mut Context) {
        for listener in self.listeners.drain(..) {
            cx.unlisten(listener);
        }
        self.open_frame = None;
        self.close_wait = None;
    }

    fn on_event(&mut self, event: &UiEvent, cx: &mut Context) {
        match *event {
            UiEvent::Click { target } => {
                if let Some(button) = cx.doc.target(cx.root, "drawerButton")
                    && cx.doc.contains(button, target)
                {
                    self.open(cx);
                    return;
                }
                if let Some(close) = cx.doc.target(cx.root, "closeButton")
                    && cx.doc.contains(close, target)
                {
                    self.close(cx);
                    return;
                }
                // A click on the dialog element itself is the backdrop.
                if cx.doc.target(cx.root, "dialog") == Some(target) {
                    self.close(cx);
                }
            }
            UiEvent::KeyDown { key: Key::Escape, target, .. } => {
                if self.is_open(cx) && cx.doc.contains(cx.root, target) {
                    self.close(cx);
                }
            }
            UiEvent::DialogCancel { target } => {
                if cx.doc.target(cx.root, "dialog") == Some(target) {
                    // Run the animated close instead of the instant
                    // native dismissal.
                    cx.prevent_default();
                    self.close(cx);
                }
            }
            _ => {}
        }
    }

    fn on_wakeup(&mut self, wakeup: Wakeup, cx: &mut Context) {
        match wakeup {
            Wakeup::Frame(id) if self.open_frame == Some(id) => {
                self.open_frame = None;
                self.finish_open(cx);
            }
            Wakeup::TransitionsEnded { wait, .. } if self.close_wait == Some(wait) => {
                self.close_wait = None;
                self.finish_close(cx);
            }
            _ => {}
        }
    }
}
