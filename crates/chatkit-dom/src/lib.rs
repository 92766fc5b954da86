#![forbid(unsafe_code)]

//! Headless document model for ChatKit.
//!
//! This crate provides the shared mutable substrate every controller
//! operates on: an arena of elements with ids, classes, attributes,
//! data attributes, focus tracking, and application of server-driven
//! fragment-replacement messages ("streams").
//!
//! There is no rendering and no browser. The markup the server would
//! produce is described with [`Fragment`] builders; everything a
//! controller reads or toggles (classes, ARIA attributes, disabled
//! state, focus) lives on [`Document`].
//!
//! # Design Invariants
//!
//! 1. **Generational handles**: a [`NodeId`] held across a fragment
//!    replacement goes stale instead of dangling; every accessor
//!    returns `Option` and stale handles read as absent.
//! 2. **Last-write-wins**: stream application replaces whole subtrees
//!    keyed by element id; there is no merge.
//! 3. **Soft misses**: a stream action targeting an id that no longer
//!    exists is a logged no-op, never an error.

pub mod document;
pub mod fragment;
pub mod stream;

pub use document::{Document, Element, NodeId};
pub use fragment::Fragment;
pub use stream::{StreamAction, StreamMessage, StreamOutcome};
