#![forbid(unsafe_code)]

//! Test harness for the ChatKit interaction layer.
//!
//! Provides canonical page markup (the chat list, the rename form, the
//! drawer, the notification container) and a [`FakeServer`] that
//! answers the requests controllers issue with the stream messages a
//! real backend would render. Integration tests drive a [`Page`]
//! through user gestures and assert on the document afterwards.

pub mod builders;
pub mod server;

pub use builders::{
    CSRF_TOKEN, chat_doc, chat_item, chat_list, chat_page, dropdown, edit_item, new_chat_form,
};
pub use server::FakeServer;
