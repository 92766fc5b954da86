#![forbid(unsafe_code)]

//! The ChatKit interaction controllers.
//!
//! Eight controllers cooperate on top of the headless document:
//!
//! - [`Alert`]: self-dismissing accessible notification.
//! - [`FlashRelay`]: turns client-side copy results into server-rendered
//!   notifications, with a local fallback renderer.
//! - [`ClipboardButton`]: copies a button's payload and reports the outcome.
//! - [`Dropdown`]: popup menu with roving keyboard focus.
//! - [`Drawer`]: modal dialog with animated open/close.
//! - [`ChatEdit`]: one inline rename form's lifecycle.
//! - [`ChatList`]: active-item highlighting, focus restoration, and
//!   reaction to finished edits.
//! - [`AppShell`]: page-visibility health check.
//!
//! Controllers share a composition-based lifecycle (attach / detach /
//! event hooks on the [`Controller`] trait) rather than inheritance;
//! the [`Page`] owns the document, the runtime, and the controller
//! registry, and keeps them consistent across server-driven fragment
//! replacements.

pub mod alert;
pub mod app;
pub mod chat_edit;
pub mod chat_list;
pub mod clipboard;
pub mod context;
pub mod controller;
pub mod diagnostics;
pub mod drawer;
pub mod dropdown;
pub mod event;
pub mod flash;
pub mod listeners;
pub mod page;

pub use alert::Alert;
pub use app::AppShell;
pub use chat_edit::{ChatEdit, EditPhase};
pub use chat_list::{ChatList, EDIT_GRACE};
pub use clipboard::ClipboardButton;
pub use context::{Context, Env, Outbox, PendingRequest, PostOp};
pub use controller::{Controller, ControllerId};
pub use diagnostics::Diagnostics;
pub use drawer::Drawer;
pub use dropdown::Dropdown;
pub use event::{EventKind, Key, Modifiers, UiEvent};
pub use flash::{FLASH_CONTAINER, FlashRelay, alert_fragment, fallback_delay_ms};
pub use listeners::{ListenerId, ListenerScope, Listeners};
pub use page::Page;
