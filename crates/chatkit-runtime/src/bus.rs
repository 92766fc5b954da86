#![forbid(unsafe_code)]

//! Typed signal bus for cross-controller coordination.
//!
//! Controllers never hold references to each other: any of them can be
//! destroyed and recreated by a fragment replacement at an arbitrary
//! time. Instead they dispatch [`Signal`]s from an origin element, and
//! subscribers scoped to an ancestor of that origin receive them —
//! the bubbling custom-event model, with payload shapes checked
//! statically by the `Signal` discriminated union.
//!
//! Subscriptions are explicit subscribe/unsubscribe pairs tied to a
//! controller's attach/detach; [`SignalBus::subscription_count`] exists
//! so a test can attach and detach N times and assert the count
//! returns to baseline.

use chatkit_dom::{Document, NodeId};

/// A cross-controller message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// An inline rename session reached its terminal submit.
    EditFinished { used_shift_tab: bool },
    /// The drawer finished opening (`true`) or closing (`false`).
    DrawerOpenChanged { open: bool },
    /// A clipboard write settled; `error` carries the failure message.
    CopyFinished {
        content: String,
        error: Option<String>,
    },
}

/// Handle for removing a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

#[derive(Debug)]
struct Entry<T> {
    id: SubscriptionId,
    scope: NodeId,
    token: T,
}

/// Scoped pub/sub registry.
///
/// `T` identifies the subscriber (the page uses its controller ids).
#[derive(Debug)]
pub struct SignalBus<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for SignalBus<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T: Copy> SignalBus<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` to receive signals whose origin lies within
    /// `scope` (inclusive).
    pub fn subscribe(&mut self, scope: NodeId, token: T) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push(Entry { id, scope, token });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.entries.retain(|e| e.id != id);
    }

    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.entries.len()
    }

    /// Subscribers whose scope contains `origin`, in subscription order.
    ///
    /// Subscriptions whose scope element has since been removed are
    /// skipped (their owner just has not detached yet this cycle).
    #[must_use]
    pub fn recipients(&self, doc: &Document, origin: NodeId) -> Vec<T> {
        self.entries
            .iter()
            .filter(|e| doc.alive(e.scope) && doc.contains(e.scope, origin))
            .map(|e| e.token)
            .collect()
    }
}
