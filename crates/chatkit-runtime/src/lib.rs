#![forbid(unsafe_code)]

//! Deterministic single-threaded runtime for ChatKit.
//!
//! Execution is cooperative: nothing blocks, nothing preempts. Work
//! suspends only at the explicit asynchronous boundaries the scheduler
//! models (timers, animation frames, visual-transition completion) and
//! resumes as [`Wakeup`] values the page routes back to controllers.
//!
//! The other pieces here are the cross-controller coordination seams:
//! the typed [`SignalBus`] (controllers never hold references to each
//! other, because any of them may be destroyed by a fragment
//! replacement at any time), the [`FocusStore`] (the only state that
//! survives a full page navigation), and the host service traits for
//! clipboard and flash-endpoint access with in-memory fakes for tests.

pub mod bus;
pub mod focus_store;
pub mod scheduler;
pub mod services;

pub use bus::{Signal, SignalBus, SubscriptionId};
pub use focus_store::{FocusRecord, FocusStore, MemoryFocusStore, SessionFile};
pub use scheduler::{FrameId, Scheduler, TimerId, WaitId, Wakeup};
pub use services::{
    Clipboard, ClipboardError, FakeClipboard, FakeFlashEndpoint, FakeHealthProbe, FlashEndpoint,
    FlashError, FlashKind, FlashPayload, HealthError, HealthProbe,
};
