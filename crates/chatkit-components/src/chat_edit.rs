#![forbid(unsafe_code)]

//! Inline chat rename form.
//!
//! The form replaces the chat row's link for the duration of one edit
//! session. Several gestures can end the session (Enter, Tab, blur,
//! Escape, the explicit buttons) and they overlap: pressing Enter
//! submits the form, which blurs the input, which would submit again.
//! A three-state phase guard makes the first terminal gesture win and
//! every later one a no-op.
//!
//! An unchanged value submits nothing; the session ends through the
//! cancel path so the server never sees a no-op rename. Escape also
//! cancels, but without raising the finished signal.

use chatkit_dom::NodeId;
use chatkit_runtime::Signal;

use crate::context::Context;
use crate::controller::Controller;
use crate::diagnostics::Diagnostics;
use crate::event::{EventKind, Key, UiEvent};
use crate::listeners::{ListenerId, ListenerScope};

/// Where an edit session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    Editing,
    Canceled,
    Submitted,
}

pub struct ChatEdit {
    diagnostics: Diagnostics,
    listeners: Vec<ListenerId>,
    phase: EditPhase,
}

impl ChatEdit {
    #[must_use]
    pub fn new() -> Self {
        Self {
            diagnostics: Diagnostics::new(true),
            listeners: Vec::new(),
            phase: EditPhase::Editing,
        }
    }

    #[must_use]
    pub fn phase(&self) -> EditPhase {
        self.phase
    }

    fn input(&self, cx: &Context) -> Option<NodeId> {
        cx.doc.target(cx.root, "chatNameInput")
    }

    /// End the session without submitting. The cancel button is a
    /// server-backed control that re-renders the plain link. No
    /// finished signal here; Escape abandons the session silently.
    fn cancel(&mut self, cx: &mut Context) {
        if self.phase != EditPhase::Editing {
            return;
        }
        self.phase = EditPhase::Canceled;
        if let Some(cancel) = cx.doc.target(cx.root, "cancelEditButton") {
            cx.activate(cancel);
        }
    }

    fn submit(&mut self, used_shift_tab: bool, cx: &mut Context) {
        if self.phase != EditPhase::Editing {
            return;
        }
        let unchanged = self.input(cx).is_some_and(|input| {
            let current = cx.doc.data(cx.root, "current-value").unwrap_or_default();
            cx.doc.value(input) == Some(current)
        });
        if unchanged {
            // A no-op rename ends through the cancel path but still
            // counts as a finished edit.
            self.cancel(cx);
        } else {
            self.phase = EditPhase::Submitted;
            let form = cx.root;
            cx.submit_form(form);
        }
        let origin = cx.root;
        cx.emit(origin, Signal::EditFinished { used_shift_tab });
    }
}

impl Default for ChatEdit {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for ChatEdit {
    fn name(&self) -> &'static str {
        "chat-edit"
    }

    fn attach(&mut self, cx: &mut Context) {
        self.diagnostics.connected(self.name(), cx.doc);
        let root = cx.root;
        self.listeners
            .push(cx.listen(ListenerScope::Element(root), EventKind::KeyDown));
        self.listeners
            .push(cx.listen(ListenerScope::Element(root), EventKind::Click));
        self.listeners
            .push(cx.listen(ListenerScope::Element(root), EventKind::Blur));
        // Focus the input with the caret at the end of the value.
        if let Some(input) = self.input(cx) {
            let end = cx.doc.value(input).map_or(0, |v| v.chars().count());
            cx.doc.set_selection_range(input, end, end);
            cx.doc.focus(input);
        }
    }

    fn detach(&mut self, cx: &mut Context) {
        for listener in self.listeners.drain(..) {
            cx.unlisten(listener);
        }
    }

    fn on_event(&mut self, event: &UiEvent, cx: &mut Context) {
        match *event {
            UiEvent::KeyDown { key, modifiers, .. } => match key {
                Key::Escape => self.cancel(cx),
                Key::Enter => {
                    cx.prevent_default();
                    self.submit(false, cx);
                }
                Key::Tab => {
                    // Focus still moves; we only latch the direction.
                    self.submit(modifiers.shift, cx);
                }
                _ => {}
            },
            UiEvent::Blur { target } => {
                if self.input(cx) == Some(target) {
                    self.submit(false, cx);
                }
            }
            UiEvent::Click { target } => {
                if let Some(button) = cx.doc.target(cx.root, "submitEditFormButton")
                    && cx.doc.contains(button, target)
                {
                    self.submit(false, cx);
                }
            }
            _ => {}
        }
    }
}
