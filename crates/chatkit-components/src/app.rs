#![forbid(unsafe_code)]

//! Application shell.
//!
//! Checks server reachability whenever the page becomes visible again,
//! so a user returning to a long-backgrounded tab learns immediately
//! that their session went away instead of on their next click.

use chatkit_dom::StreamMessage;
use chatkit_runtime::FlashKind;

use crate::context::Context;
use crate::controller::Controller;
use crate::diagnostics::Diagnostics;
use crate::event::{EventKind, UiEvent};
use crate::flash::{FLASH_CONTAINER, alert_fragment, fallback_delay_ms};
use crate::listeners::{ListenerId, ListenerScope};

pub struct AppShell {
    diagnostics: Diagnostics,
    visibility_listener: Option<ListenerId>,
}

impl AppShell {
    #[must_use]
    pub fn new() -> Self {
        Self {
            diagnostics: Diagnostics::new(false),
            visibility_listener: None,
        }
    }
}

impl Default for AppShell {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for AppShell {
    fn name(&self) -> &'static str {
        "app"
    }

    fn attach(&mut self, cx: &mut Context) {
        self.diagnostics.connected(self.name(), cx.doc);
        self.visibility_listener =
            Some(cx.listen(ListenerScope::Document, EventKind::Visibility));
    }

    fn detach(&mut self, cx: &mut Context) {
        if let Some(listener) = self.visibility_listener.take() {
            cx.unlisten(listener);
        }
    }

    fn on_event(&mut self, event: &UiEvent, cx: &mut Context) {
        let UiEvent::VisibilityChanged { visible: true } = *event else {
            return;
        };
        if let Err(err) = cx.health.check() {
            tracing::warn!(%err, "health check failed on visibility change");
            let stamp = cx.scheduler.now().as_millis();
            let delay = fallback_delay_ms(cx.doc);
            let banner = alert_fragment(
                FlashKind::Alert,
                &format!("Server unreachable: {err}"),
                stamp,
                delay,
            );
            cx.apply_stream(StreamMessage::new().append(FLASH_CONTAINER, banner));
        }
    }
}
