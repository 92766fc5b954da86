#![forbid(unsafe_code)]

//! Flash notification relay.
//!
//! Sits on an ancestor of clipboard buttons (typically `body`) and
//! turns [`Signal::CopyFinished`] into a user-visible notification.
//! The preferred path asks the server to render the flash so the
//! markup matches every other banner on the site; when the CSRF token
//! is missing or the request fails, a locally rendered banner of the
//! same shape is appended instead, so the user always sees *something*.

use chatkit_dom::{Fragment, StreamMessage};
use chatkit_runtime::{FlashKind, FlashPayload, Signal, SubscriptionId};

use crate::context::Context;
use crate::controller::Controller;
use crate::diagnostics::Diagnostics;

/// Id of the shared notification container.
pub const FLASH_CONTAINER: &str = "flash_messages";

/// Auto-dismiss delay handed to locally rendered banners.
const FALLBACK_DELAY_MS: u64 = 8000;

/// Short delay under test so dismissal is cheap to exercise.
const FALLBACK_DELAY_TEST_MS: u64 = 500;

/// The banner delay for a document, from its `environment` meta entry.
#[must_use]
pub fn fallback_delay_ms(doc: &chatkit_dom::Document) -> u64 {
    if doc.meta_content("environment").is_some_and(|env| env == "test") {
        FALLBACK_DELAY_TEST_MS
    } else {
        FALLBACK_DELAY_MS
    }
}

/// Build a banner matching the server-rendered flash partial.
///
/// `stamp` disambiguates ids when several banners land in the same
/// container; callers pass the current virtual time in milliseconds.
#[must_use]
pub fn alert_fragment(kind: FlashKind, message: &str, stamp: u128, delay_ms: u64) -> Fragment {
    let colors = match kind {
        FlashKind::Success => "bg-green-100 text-green-700",
        FlashKind::Alert => "bg-red-100 text-red-700",
        FlashKind::Notice => "bg-blue-100 text-blue-700",
        FlashKind::Warning => "bg-amber-100 text-amber-700",
    };
    Fragment::new("div")
        .id(&format!("alert-{}-{stamp}", kind.as_str()))
        .classes("alert transition-opacity duration-300")
        .classes(colors)
        .attr("role", "alert")
        .controller("alert")
        .data("delay-ms", &delay_ms.to_string())
        .child(Fragment::new("span").target("message").text(message))
        .child(
            Fragment::new("button")
                .target("closeButton")
                .attr("aria-label", "Close")
                .text("\u{d7}"),
        )
}

pub struct FlashRelay {
    diagnostics: Diagnostics,
    subscription: Option<SubscriptionId>,
}

impl FlashRelay {
    #[must_use]
    pub fn new() -> Self {
        Self {
            diagnostics: Diagnostics::new(false),
            subscription: None,
        }
    }

    /// Append a locally rendered banner, bypassing the server.
    fn fallback(&self, kind: FlashKind, message: &str, cx: &mut Context) {
        let stamp = cx.scheduler.now().as_millis();
        let delay = fallback_delay_ms(cx.doc);
        let fragment = alert_fragment(kind, message, stamp, delay);
        cx.apply_stream(StreamMessage::new().append(FLASH_CONTAINER, fragment));
    }

    /// Ask the server to render the flash; fall back locally when the
    /// CSRF token is absent or the request fails.
    fn send_flash(&self, payload: &FlashPayload, cx: &mut Context) {
        let token = cx.doc.meta_content("csrf-token").unwrap_or_default();
        if token.is_empty() {
            tracing::error!("csrf token missing, rendering flash locally");
            self.fallback(FlashKind::Alert, "CSRF token missing", cx);
            return;
        }
        match cx.flash_endpoint.post(&token, payload) {
            Ok(stream) => cx.apply_stream(stream),
            Err(err) => {
                tracing::error!(%err, "flash request failed, rendering locally");
                self.fallback(FlashKind::Alert, &format!("An error occurred: {err}"), cx);
            }
        }
    }
}

impl Default for FlashRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for FlashRelay {
    fn name(&self) -> &'static str {
        "flash"
    }

    fn attach(&mut self, cx: &mut Context) {
        self.diagnostics.connected(self.name(), cx.doc);
        let root = cx.root;
        self.subscription = Some(cx.subscribe(root));
    }

    fn detach(&mut self, cx: &mut Context) {
        if let Some(subscription) = self.subscription.take() {
            cx.unsubscribe(subscription);
        }
    }

    fn on_signal(&mut self, signal: &Signal, cx: &mut Context) {
        let Signal::CopyFinished { content, error } = signal else {
            return;
        };
        match error {
            Some(err) => {
                let message = format!("Failed to copy \"{content}\": {err}");
                self.fallback(FlashKind::Alert, &message, cx);
            }
            None => {
                let message = format!("{content} - copied to the clipboard");
                self.send_flash(&FlashPayload::new(FlashKind::Success, &message), cx);
            }
        }
    }
}
