#![forbid(unsafe_code)]

//! The capability bundle handed to a controller for one hook call.
//!
//! [`Context`] borrows the page's document, runtime, and services, and
//! collects deferred work in an [`Outbox`]: signals to dispatch, server
//! requests to issue, streams to apply, and operations to run after
//! signal delivery. Deferral keeps hook calls non-reentrant — a
//! controller never runs inside another controller's borrow.

use std::time::Duration;

use chatkit_dom::{Document, NodeId, StreamMessage};
use chatkit_runtime::{
    Clipboard, FlashEndpoint, FocusStore, FrameId, HealthProbe, Scheduler, Signal, SignalBus,
    SubscriptionId, TimerId, WaitId,
};

use crate::controller::ControllerId;
use crate::event::EventKind;
use crate::listeners::{ListenerId, ListenerScope, Listeners};

/// Page-level environment a controller may read.
#[derive(Debug, Clone)]
pub struct Env {
    /// Current location path, e.g. `/chats/42`.
    pub page_path: String,
}

impl Default for Env {
    fn default() -> Self {
        Self {
            page_path: "/chats".to_string(),
        }
    }
}

/// A server round trip a controller initiated.
///
/// The backend is an external collaborator; the page records requests
/// and the host (or test harness) answers them with stream messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingRequest {
    /// Submit the form rooted at the element.
    SubmitForm { form: NodeId },
    /// Programmatically activate a server-backed control (a cancel
    /// button, an edit link, a delete button).
    Activate { control: NodeId },
}

/// Document operations deferred until after signal delivery.
///
/// The drawer's close sequence emits its `closed` signal *before*
/// hiding the dialog and moving focus, so subscribers observe the
/// document as it was at emission time.
#[derive(Debug, Clone)]
pub enum PostOp {
    Focus(NodeId),
    RemoveAttr(NodeId, String),
    SetAttr(NodeId, String, String),
    RemoveClass(NodeId, String),
}

#[derive(Debug)]
pub(crate) struct Emitted {
    pub origin: NodeId,
    pub signal: Signal,
    pub cancelable: bool,
}

/// Deferred work collected during one hook call.
#[derive(Debug, Default)]
pub struct Outbox {
    pub(crate) signals: Vec<Emitted>,
    pub(crate) requests: Vec<PendingRequest>,
    pub(crate) streams: Vec<StreamMessage>,
    pub(crate) post: Vec<PostOp>,
    pub(crate) timer_routes: Vec<(TimerId, ControllerId)>,
    pub(crate) frame_routes: Vec<(FrameId, ControllerId)>,
    pub(crate) wait_routes: Vec<(WaitId, ControllerId)>,
    pub(crate) deferred_removals: Vec<(NodeId, Duration)>,
    pub(crate) default_prevented: bool,
    pub(crate) signal_canceled: bool,
}

impl Outbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Everything a controller can reach during a hook call.
pub struct Context<'a> {
    pub controller: ControllerId,
    /// The controller's root element.
    pub root: NodeId,
    pub doc: &'a mut Document,
    pub scheduler: &'a mut Scheduler,
    pub bus: &'a mut SignalBus<ControllerId>,
    pub listeners: &'a mut Listeners,
    pub focus_store: &'a mut dyn FocusStore,
    pub clipboard: &'a mut dyn Clipboard,
    pub flash_endpoint: &'a mut dyn FlashEndpoint,
    pub health: &'a mut dyn HealthProbe,
    pub env: &'a Env,
    pub out: &'a mut Outbox,
}

impl Context<'_> {
    // ─────────────────────────────────────────────────────────────────
    // Listener and subscription registration
    // ─────────────────────────────────────────────────────────────────

    pub fn listen(&mut self, scope: ListenerScope, kind: EventKind) -> ListenerId {
        self.listeners.add(self.controller, scope, kind)
    }

    pub fn unlisten(&mut self, id: ListenerId) {
        self.listeners.remove(id);
    }

    pub fn subscribe(&mut self, scope: NodeId) -> SubscriptionId {
        self.bus.subscribe(scope, self.controller)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.bus.unsubscribe(id);
    }

    // ─────────────────────────────────────────────────────────────────
    // Scheduling (wakeups route back to this controller)
    // ─────────────────────────────────────────────────────────────────

    pub fn set_timeout(&mut self, delay: Duration) -> TimerId {
        let id = self.scheduler.set_timeout(delay);
        self.out.timer_routes.push((id, self.controller));
        id
    }

    pub fn clear_timeout(&mut self, id: TimerId) {
        self.scheduler.clear_timeout(id);
    }

    pub fn request_frame(&mut self) -> FrameId {
        let id = self.scheduler.request_frame();
        self.out.frame_routes.push((id, self.controller));
        id
    }

    pub fn wait_transitions(&mut self, node: NodeId) -> WaitId {
        let id = self.scheduler.wait_transitions(node);
        self.out.wait_routes.push((id, self.controller));
        id
    }

    /// Remove `node` after `delay`, owned by the page rather than this
    /// controller — the removal still happens if the controller is
    /// destroyed first.
    pub fn remove_later(&mut self, node: NodeId, delay: Duration) {
        self.out.deferred_removals.push((node, delay));
    }

    // ─────────────────────────────────────────────────────────────────
    // Coordination
    // ─────────────────────────────────────────────────────────────────

    /// Dispatch a signal from `origin` after this hook returns.
    pub fn emit(&mut self, origin: NodeId, signal: Signal) {
        self.out.signals.push(Emitted {
            origin,
            signal,
            cancelable: false,
        });
    }

    /// Like [`emit`](Self::emit), but subscribers may mark the signal
    /// canceled. Cancellation is observable (and logged by the page);
    /// the emitter takes no corrective action.
    pub fn emit_cancelable(&mut self, origin: NodeId, signal: Signal) {
        self.out.signals.push(Emitted {
            origin,
            signal,
            cancelable: true,
        });
    }

    /// From within `on_signal`: mark the current cancelable signal
    /// canceled.
    pub fn cancel_signal(&mut self) {
        self.out.signal_canceled = true;
    }

    /// Suppress the page's default handling of the current event.
    pub fn prevent_default(&mut self) {
        self.out.default_prevented = true;
    }

    // ─────────────────────────────────────────────────────────────────
    // Server round trips and streams
    // ─────────────────────────────────────────────────────────────────

    pub fn submit_form(&mut self, form: NodeId) {
        self.out.requests.push(PendingRequest::SubmitForm { form });
    }

    pub fn activate(&mut self, control: NodeId) {
        self.out.requests.push(PendingRequest::Activate { control });
    }

    /// Apply a stream message (local fallback rendering, or a response
    /// the controller already holds) after this hook returns.
    pub fn apply_stream(&mut self, message: StreamMessage) {
        self.out.streams.push(message);
    }

    /// Run a document operation after signal delivery completes.
    pub fn after_signals(&mut self, op: PostOp) {
        self.out.post.push(op);
    }
}
