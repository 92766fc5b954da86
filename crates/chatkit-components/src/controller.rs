#![forbid(unsafe_code)]

//! The shared controller lifecycle.
//!
//! A controller instance is ephemeral: its identity is the element it
//! is attached to, it is created when that element appears and
//! destroyed when a server-driven replacement removes it. Everything a
//! controller registers in [`Controller::attach`] (listeners, signal
//! subscriptions, timers) must be released in [`Controller::detach`].

use chatkit_dom::NodeId;
use chatkit_runtime::{Signal, Wakeup};

use crate::context::Context;
use crate::event::UiEvent;

/// Identifies a live controller instance within a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerId(pub u64);

/// Attach/detach lifecycle plus event hooks.
///
/// Default hook implementations do nothing, so controllers implement
/// only the surfaces they use.
pub trait Controller {
    /// Stable name, used for the `data-controller` marker and logging.
    fn name(&self) -> &'static str;

    fn attach(&mut self, cx: &mut Context);

    fn detach(&mut self, cx: &mut Context);

    fn on_event(&mut self, event: &UiEvent, cx: &mut Context) {
        let _ = (event, cx);
    }

    fn on_signal(&mut self, signal: &Signal, cx: &mut Context) {
        let _ = (signal, cx);
    }

    fn on_wakeup(&mut self, wakeup: Wakeup, cx: &mut Context) {
        let _ = (wakeup, cx);
    }

    /// Called after a stream application inserted new subtrees, with
    /// the roots of those subtrees. Controllers that react to targets
    /// (re)connecting inside their root filter the list themselves.
    fn fragments_connected(&mut self, inserted: &[NodeId], cx: &mut Context) {
        let _ = (inserted, cx);
    }
}
