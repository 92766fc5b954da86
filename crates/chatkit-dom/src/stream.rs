#![forbid(unsafe_code)]

//! Out-of-band fragment-replacement messages.
//!
//! The server answers form submissions and navigations with a
//! [`StreamMessage`]: a list of actions keyed by element id that
//! replace, update, append to, or remove fragments in place. Applying
//! a message is last-write-wins against whatever the document currently
//! holds; an action whose target id no longer exists is a logged no-op,
//! because the server may reference fragments the client has since
//! dropped.
//!
//! The [`StreamOutcome`] reports which roots were removed and which
//! subtrees were inserted, so the page can destroy controllers whose
//! root elements were replaced and attach controllers for new ones.

use crate::document::{Document, NodeId};
use crate::fragment::Fragment;

/// One fragment operation, keyed by element id.
#[derive(Debug, Clone)]
pub enum StreamAction {
    /// Swap the target element for a freshly built fragment, in place.
    Replace { target: String, fragment: Fragment },
    /// Replace the target's content (children and text), keeping the
    /// target element itself.
    Update { target: String, fragment: Fragment },
    /// Instantiate the fragment as the target's last child.
    Append { target: String, fragment: Fragment },
    /// Remove the target subtree.
    Remove { target: String },
}

impl StreamAction {
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Replace { target, .. }
            | Self::Update { target, .. }
            | Self::Append { target, .. }
            | Self::Remove { target } => target,
        }
    }
}

/// A server response: zero or more actions applied in order.
#[derive(Debug, Clone, Default)]
pub struct StreamMessage {
    pub actions: Vec<StreamAction>,
}

impl StreamMessage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn replace(mut self, target: &str, fragment: Fragment) -> Self {
        self.actions.push(StreamAction::Replace {
            target: target.to_string(),
            fragment,
        });
        self
    }

    #[must_use]
    pub fn update(mut self, target: &str, fragment: Fragment) -> Self {
        self.actions.push(StreamAction::Update {
            target: target.to_string(),
            fragment,
        });
        self
    }

    #[must_use]
    pub fn append(mut self, target: &str, fragment: Fragment) -> Self {
        self.actions.push(StreamAction::Append {
            target: target.to_string(),
            fragment,
        });
        self
    }

    #[must_use]
    pub fn remove(mut self, target: &str) -> Self {
        self.actions.push(StreamAction::Remove {
            target: target.to_string(),
        });
        self
    }
}

/// What a message application did to the tree.
#[derive(Debug, Default)]
pub struct StreamOutcome {
    /// Roots that were removed (stale handles, with the id they had).
    pub removed: Vec<(String, NodeId)>,
    /// Roots of freshly inserted subtrees.
    pub inserted: Vec<NodeId>,
}

impl StreamMessage {
    /// Apply every action in order against the document.
    pub fn apply(&self, doc: &mut Document) -> StreamOutcome {
        let mut outcome = StreamOutcome::default();
        for action in &self.actions {
            match action {
                StreamAction::Replace { target, fragment } => {
                    let Some(old) = doc.element_by_id(target) else {
                        tracing::debug!(target = %target, "stream replace: target missing, skipping");
                        continue;
                    };
                    let Some(parent) = doc.parent(old) else {
                        tracing::debug!(target = %target, "stream replace: target has no parent, skipping");
                        continue;
                    };
                    let index = doc
                        .children(parent)
                        .iter()
                        .position(|c| *c == old)
                        .unwrap_or(0);
                    let new = doc.instantiate(fragment);
                    doc.insert_child(parent, index, new);
                    doc.remove(old);
                    outcome.removed.push((target.clone(), old));
                    outcome.inserted.push(new);
                }
                StreamAction::Update { target, fragment } => {
                    let Some(node) = doc.element_by_id(target) else {
                        tracing::debug!(target = %target, "stream update: target missing, skipping");
                        continue;
                    };
                    for child in doc.children(node) {
                        outcome.removed.push((target.clone(), child));
                        doc.remove(child);
                    }
                    let text = fragment.text.clone();
                    doc.set_text(node, &text);
                    for child in &fragment.children {
                        let new = doc.instantiate(child);
                        doc.append_child(node, new);
                        outcome.inserted.push(new);
                    }
                }
                StreamAction::Append { target, fragment } => {
                    let Some(node) = doc.element_by_id(target) else {
                        tracing::debug!(target = %target, "stream append: target missing, skipping");
                        continue;
                    };
                    let new = doc.append_fragment(node, fragment);
                    outcome.inserted.push(new);
                }
                StreamAction::Remove { target } => {
                    let Some(node) = doc.element_by_id(target) else {
                        tracing::debug!(target = %target, "stream remove: target missing, skipping");
                        continue;
                    };
                    outcome.removed.push((target.clone(), node));
                    doc.remove(node);
                }
            }
        }
        outcome
    }
}
