#![forbid(unsafe_code)]

//! A backend stand-in that answers controller-initiated requests.
//!
//! Controllers never mutate other fragments directly; they activate a
//! server-backed control or submit a form, and the server responds
//! with a stream message. [`FakeServer`] plays that role: it keeps the
//! chat table, interprets the pending requests a [`Page`] accumulated,
//! and applies the stream a real backend would render.

use chatkit_dom::{NodeId, StreamMessage};
use chatkit_runtime::{Clipboard, FlashEndpoint, HealthProbe};
use chatkit_components::{Page, PendingRequest};

use crate::builders::{chat_item, edit_item};

pub struct FakeServer {
    chats: Vec<(u64, String)>,
}

impl FakeServer {
    #[must_use]
    pub fn new(chats: &[(u64, &str)]) -> Self {
        Self {
            chats: chats
                .iter()
                .map(|(id, name)| (*id, (*name).to_string()))
                .collect(),
        }
    }

    #[must_use]
    pub fn chat_name(&self, id: u64) -> Option<&str> {
        self.chats
            .iter()
            .find(|(cid, _)| *cid == id)
            .map(|(_, name)| name.as_str())
    }

    /// Drain the page's pending requests and apply each response.
    pub fn respond<C, F, H>(&mut self, page: &mut Page<C, F, H>)
    where
        C: Clipboard,
        F: FlashEndpoint,
        H: HealthProbe,
    {
        let requests = page.take_requests();
        for request in requests {
            tracing::debug!(?request, "serving request");
            match request {
                PendingRequest::Activate { control } => self.activate(control, page),
                PendingRequest::SubmitForm { form } => self.submit(form, page),
            }
        }
    }

    fn activate<C, F, H>(&mut self, control: NodeId, page: &mut Page<C, F, H>)
    where
        C: Clipboard,
        F: FlashEndpoint,
        H: HealthProbe,
    {
        let Some(target) = page.doc().data(control, "target").map(str::to_string) else {
            return;
        };
        match target.as_str() {
            "editChatLink" => {
                let Some(id) = enclosing_chat_id(page, control) else {
                    return;
                };
                let Some(name) = self.chat_name(id).map(str::to_string) else {
                    return;
                };
                let stream =
                    StreamMessage::new().replace(&format!("chat_{id}"), edit_item(id, &name));
                page.apply_stream(&stream);
            }
            "cancelEditButton" => {
                let Some(id) = form_chat_id(page, control) else {
                    return;
                };
                let Some(name) = self.chat_name(id).map(str::to_string) else {
                    return;
                };
                let stream =
                    StreamMessage::new().replace(&format!("chat_{id}"), chat_item(id, &name));
                page.apply_stream(&stream);
            }
            "deleteChat" => {
                let Some(id) = enclosing_chat_id(page, control) else {
                    return;
                };
                self.chats.retain(|(cid, _)| *cid != id);
                let stream = StreamMessage::new().remove(&format!("chat_{id}"));
                page.apply_stream(&stream);
            }
            _ => {}
        }
    }

    fn submit<C, F, H>(&mut self, form: NodeId, page: &mut Page<C, F, H>)
    where
        C: Clipboard,
        F: FlashEndpoint,
        H: HealthProbe,
    {
        let Some(id) = form_chat_id(page, form) else {
            return;
        };
        let Some(input) = page.doc().target(form, "chatNameInput") else {
            return;
        };
        let new_name = page.doc().value(input).unwrap_or_default().to_string();
        if let Some(entry) = self.chats.iter_mut().find(|(cid, _)| *cid == id) {
            entry.1 = new_name.clone();
        }
        let stream = StreamMessage::new().replace(&format!("chat_{id}"), chat_item(id, &new_name));
        page.apply_stream(&stream);
    }
}

/// Chat id from the enclosing `chat_<id>` element.
fn enclosing_chat_id<C, F, H>(page: &Page<C, F, H>, node: NodeId) -> Option<u64>
where
    C: Clipboard,
    F: FlashEndpoint,
    H: HealthProbe,
{
    let item = page.doc().closest(node, |el| {
        el.id.as_deref().is_some_and(|id| id.starts_with("chat_"))
    })?;
    let id = page.doc().element(item)?.id.clone()?;
    id.strip_prefix("chat_")?.parse().ok()
}

/// Chat id carried on (or above) the rename form.
fn form_chat_id<C, F, H>(page: &Page<C, F, H>, node: NodeId) -> Option<u64>
where
    C: Clipboard,
    F: FlashEndpoint,
    H: HealthProbe,
{
    let carrier = page
        .doc()
        .closest(node, |el| el.dataset.contains_key("chat-id"))?;
    page.doc().data(carrier, "chat-id")?.parse().ok()
}
