#![forbid(unsafe_code)]

//! ChatKit public facade crate.
//!
//! Re-exports the common types from the internal crates and offers a
//! lightweight prelude for driving a page in hosts and tests.

// --- Document re-exports ----------------------------------------------------

pub use chatkit_dom::{
    Document, Element, Fragment, NodeId, StreamAction, StreamMessage, StreamOutcome,
};

// --- Runtime re-exports -----------------------------------------------------

pub use chatkit_runtime::{
    Clipboard, ClipboardError, FakeClipboard, FakeFlashEndpoint, FakeHealthProbe, FlashEndpoint,
    FlashError, FlashKind, FlashPayload, FocusRecord, FocusStore, FrameId, HealthError,
    HealthProbe, MemoryFocusStore, Scheduler, SessionFile, Signal, SignalBus, SubscriptionId,
    TimerId, WaitId, Wakeup,
};

// --- Component re-exports ---------------------------------------------------

pub use chatkit_components::{
    Alert, AppShell, ChatEdit, ChatList, ClipboardButton, Context, Controller, ControllerId,
    Diagnostics, Drawer, Dropdown, EditPhase, Env, EventKind, FlashRelay, Key, ListenerId,
    ListenerScope, Modifiers, Page, PendingRequest, UiEvent,
};

// --- Prelude -----------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Document, Env, EventKind, FocusRecord, FocusStore, Fragment, Key, Modifiers, NodeId,
        Page, PendingRequest, Signal, StreamMessage, UiEvent, Wakeup,
    };
}
