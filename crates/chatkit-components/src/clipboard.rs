#![forbid(unsafe_code)]

//! Copy-to-clipboard buttons.
//!
//! The button carries the text to copy in `data-clipboard-text`. The
//! outcome of the write is broadcast as a [`Signal::CopyFinished`] so
//! the flash relay (or anything else listening above this element) can
//! surface it to the user. This controller renders nothing itself.

use chatkit_runtime::Signal;

use crate::context::Context;
use crate::controller::Controller;
use crate::diagnostics::Diagnostics;
use crate::event::{EventKind, UiEvent};
use crate::listeners::{ListenerId, ListenerScope};

pub struct ClipboardButton {
    diagnostics: Diagnostics,
    click_listener: Option<ListenerId>,
}

impl ClipboardButton {
    #[must_use]
    pub fn new() -> Self {
        Self {
            diagnostics: Diagnostics::new(false),
            click_listener: None,
        }
    }
}

impl Default for ClipboardButton {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for ClipboardButton {
    fn name(&self) -> &'static str {
        "clipboard"
    }

    fn attach(&mut self, cx: &mut Context) {
        self.diagnostics.connected(self.name(), cx.doc);
        self.click_listener = Some(cx.listen(ListenerScope::Element(cx.root), EventKind::Click));
    }

    fn detach(&mut self, cx: &mut Context) {
        if let Some(listener) = self.click_listener.take() {
            cx.unlisten(listener);
        }
    }

    fn on_event(&mut self, event: &UiEvent, cx: &mut Context) {
        let UiEvent::Click { target } = *event else {
            return;
        };
        let Some(button) = cx
            .doc
            .closest(target, |el| el.dataset.contains_key("clipboard-text"))
        else {
            return;
        };
        let Some(content) = cx.doc.data(button, "clipboard-text").map(str::to_string) else {
            return;
        };
        let error = cx.clipboard.write_text(&content).err().map(|e| e.to_string());
        let origin = cx.root;
        cx.emit(
            origin,
            Signal::CopyFinished {
                content,
                error,
            },
        );
    }
}
