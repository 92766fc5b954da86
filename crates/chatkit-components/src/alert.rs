#![forbid(unsafe_code)]

//! Dismissable notification banners.
//!
//! An alert announces its message to assistive technology when it
//! appears, auto-dismisses after a configured delay, and dismisses
//! immediately when its close button is clicked. Dismissal removes the
//! whole banner element, which destroys this controller with it.

use std::time::Duration;

use chatkit_dom::NodeId;
use chatkit_runtime::{TimerId, Wakeup};

use crate::context::Context;
use crate::controller::Controller;
use crate::diagnostics::Diagnostics;
use crate::event::{EventKind, UiEvent};
use crate::listeners::{ListenerId, ListenerScope};

/// How long the screen-reader announcement node stays in the document.
const ANNOUNCE_LINGER: Duration = Duration::from_millis(1000);

pub struct Alert {
    diagnostics: Diagnostics,
    dismiss_timer: Option<TimerId>,
    click_listener: Option<ListenerId>,
}

impl Alert {
    #[must_use]
    pub fn new() -> Self {
        Self {
            diagnostics: Diagnostics::new(true),
            dismiss_timer: None,
            click_listener: None,
        }
    }

    /// Mirror the message into a transient `aria-live` node so screen
    /// readers announce banners inserted after page load. The node
    /// hangs off the body, not the banner, so dismissal cannot cut an
    /// in-flight announcement short.
    fn announce(&self, cx: &mut Context) {
        let Some(message) = cx.doc.target(cx.root, "message") else {
            return;
        };
        let text = cx.doc.deep_text(message);
        let live = cx.doc.create_element("div");
        cx.doc.add_class(live, "sr-only");
        cx.doc.set_attr(live, "aria-live", "polite");
        cx.doc.set_text(live, &text);
        let body = cx.doc.body();
        cx.doc.append_child(body, live);
        cx.remove_later(live, ANNOUNCE_LINGER);
    }

    fn schedule_dismiss(&mut self, cx: &mut Context) {
        match cx.doc.data(cx.root, "delay-ms").map(str::parse::<i64>) {
            Some(Ok(ms)) if ms > 0 => {
                let delay = Duration::from_millis(ms as u64);
                self.dismiss_timer = Some(cx.set_timeout(delay));
            }
            parsed => {
                // A missing or invalid delay disables auto-dismiss
                // instead of guessing a default.
                if self.diagnostics.enabled(cx.doc) {
                    tracing::warn!(
                        ?parsed,
                        "alert delay-ms missing or invalid, not auto-dismissing"
                    );
                }
            }
        }
    }

    fn dismiss(&mut self, cx: &mut Context) {
        let root = cx.root;
        cx.doc.remove(root);
    }
}

impl Default for Alert {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for Alert {
    fn name(&self) -> &'static str {
        "alert"
    }

    fn attach(&mut self, cx: &mut Context) {
        self.diagnostics.connected(self.name(), cx.doc);
        self.click_listener = Some(cx.listen(ListenerScope::Element(cx.root), EventKind::Click));
        self.announce(cx);
        self.schedule_dismiss(cx);
    }

    fn detach(&mut self, cx: &mut Context) {
        if let Some(timer) = self.dismiss_timer.take() {
            cx.clear_timeout(timer);
        }
        if let Some(listener) = self.click_listener.take() {
            cx.unlisten(listener);
        }
    }

    fn on_event(&mut self, event: &UiEvent, cx: &mut Context) {
        if let UiEvent::Click { target } = *event
            && let Some(close) = cx.doc.target(cx.root, "closeButton")
            && cx.doc.contains(close, target)
        {
            self.dismiss(cx);
        }
    }

    fn on_wakeup(&mut self, wakeup: Wakeup, cx: &mut Context) {
        if let Wakeup::Timer(id) = wakeup
            && self.dismiss_timer == Some(id)
        {
            self.dismiss_timer = None;
            self.dismiss(cx);
        }
    }

    fn fragments_connected(&mut self, inserted: &[NodeId], cx: &mut Context) {
        // A replaced message target gets re-announced.
        let Some(message) = cx.doc.target(cx.root, "message") else {
            return;
        };
        if inserted.iter().any(|n| cx.doc.contains(*n, message)) {
            self.announce(cx);
        }
    }
}
