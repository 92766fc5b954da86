#![forbid(unsafe_code)]

//! Event listener registry.
//!
//! Every listener a controller registers on attach must be removed on
//! detach — including document-level listeners (the dropdown's
//! outside-click, the page-visibility health check), which outlive any
//! one fragment and are the primary leak risk. Registration and removal
//! are explicit paired calls, and [`Listeners::count`] exposes the
//! total so a test can attach and detach N times and assert the count
//! returns to baseline.

use chatkit_dom::{Document, NodeId};

use crate::controller::ControllerId;
use crate::event::{EventKind, UiEvent};

/// Where a listener applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerScope {
    /// Fires for matching events anywhere in the document.
    Document,
    /// Fires only for events targeted at or inside the element.
    Element(NodeId),
}

/// Handle for removing a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

#[derive(Debug)]
struct Entry {
    id: ListenerId,
    owner: ControllerId,
    scope: ListenerScope,
    kind: EventKind,
}

/// The page-wide listener table.
#[derive(Debug, Default)]
pub struct Listeners {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Listeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, owner: ControllerId, scope: ListenerScope, kind: EventKind) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.entries.push(Entry {
            id,
            owner,
            scope,
            kind,
        });
        id
    }

    pub fn remove(&mut self, id: ListenerId) {
        self.entries.retain(|e| e.id != id);
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Controllers with at least one listener matching the event, in
    /// registration order, each at most once.
    #[must_use]
    pub fn matching(&self, doc: &Document, event: &UiEvent) -> Vec<ControllerId> {
        let kind = event.kind();
        let mut out: Vec<ControllerId> = Vec::new();
        for entry in &self.entries {
            if entry.kind != kind {
                continue;
            }
            let hit = match entry.scope {
                ListenerScope::Document => true,
                ListenerScope::Element(scope) => event
                    .target()
                    .is_some_and(|t| doc.alive(scope) && doc.contains(scope, t)),
            };
            if hit && !out.contains(&entry.owner) {
                out.push(entry.owner);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatkit_dom::Fragment;

    #[test]
    fn element_scope_requires_containment() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = doc.append_fragment(body, &Fragment::new("div").id("root"));
        let inside = doc.append_fragment(root, &Fragment::new("button"));
        let outside = doc.append_fragment(body, &Fragment::new("button"));

        let mut listeners = Listeners::new();
        listeners.add(ControllerId(1), ListenerScope::Element(root), EventKind::Click);
        listeners.add(ControllerId(2), ListenerScope::Document, EventKind::Click);

        let hit = listeners.matching(&doc, &UiEvent::Click { target: inside });
        assert_eq!(hit, vec![ControllerId(1), ControllerId(2)]);

        let hit = listeners.matching(&doc, &UiEvent::Click { target: outside });
        assert_eq!(hit, vec![ControllerId(2)]);
    }

    #[test]
    fn each_controller_delivered_once() {
        let doc = Document::new();
        let body = doc.body();
        let mut listeners = Listeners::new();
        listeners.add(ControllerId(1), ListenerScope::Document, EventKind::Click);
        listeners.add(ControllerId(1), ListenerScope::Element(body), EventKind::Click);

        let hit = listeners.matching(&doc, &UiEvent::Click { target: body });
        assert_eq!(hit, vec![ControllerId(1)]);
    }

    #[test]
    fn remove_restores_baseline() {
        let mut listeners = Listeners::new();
        for _ in 0..5 {
            let id = listeners.add(
                ControllerId(1),
                ListenerScope::Document,
                EventKind::Visibility,
            );
            listeners.remove(id);
        }
        assert_eq!(listeners.count(), 0);
    }
}
