#![forbid(unsafe_code)]

//! Arena-based element tree with focus tracking.
//!
//! The [`Document`] owns every element in a slot arena. Handles are
//! generational: removing a subtree bumps the generation of each freed
//! slot, so a [`NodeId`] captured before a server-driven replacement
//! simply stops resolving afterwards.

use std::collections::{BTreeMap, BTreeSet};

use crate::fragment::Fragment;

/// Generational handle to an element in a [`Document`].
///
/// Stale handles (element removed, slot reused) resolve to `None`
/// everywhere; they never panic and never alias a new element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// One element in the tree.
///
/// Classes and attributes use ordered maps so that recomputing derived
/// state (e.g. active-item highlighting) twice yields byte-identical
/// output when serialized for comparison.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: BTreeSet<String>,
    pub attrs: BTreeMap<String, String>,
    pub dataset: BTreeMap<String, String>,
    /// Own text content (not including descendants).
    pub text: String,
    /// Current value, for form controls.
    pub value: String,
    /// Caret selection range on a form control, if one was set.
    pub selection: Option<(usize, usize)>,
    pub disabled: bool,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

/// The element arena.
///
/// A fresh document consists of a single `body` root.
#[derive(Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    body: NodeId,
    focused: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            body: NodeId {
                index: 0,
                generation: 0,
            },
            focused: None,
        };
        let body = doc.alloc(Element {
            tag: "body".to_string(),
            ..Element::default()
        });
        doc.body = body;
        doc
    }

    /// The root element. Always alive.
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.body
    }

    // ─────────────────────────────────────────────────────────────────
    // Allocation and tree surgery
    // ─────────────────────────────────────────────────────────────────

    fn alloc(&mut self, element: Element) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.element = Some(element);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                element: Some(element),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Element {
            tag: tag.to_string(),
            ..Element::default()
        })
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// A stale handle on either side is a no-op.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.alive(parent) || !self.alive(child) {
            return;
        }
        self.detach(child);
        if let Some(el) = self.element_mut(child) {
            el.parent = Some(parent);
        }
        if let Some(el) = self.element_mut(parent) {
            el.children.push(child);
        }
    }

    /// Insert `child` under `parent` at `index` (clamped to the end).
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if !self.alive(parent) || !self.alive(child) {
            return;
        }
        self.detach(child);
        if let Some(el) = self.element_mut(child) {
            el.parent = Some(parent);
        }
        if let Some(el) = self.element_mut(parent) {
            let at = index.min(el.children.len());
            el.children.insert(at, child);
        }
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.element(node).and_then(|el| el.parent);
        if let Some(parent) = parent
            && let Some(el) = self.element_mut(parent)
        {
            el.children.retain(|c| *c != node);
        }
        if let Some(el) = self.element_mut(node) {
            el.parent = None;
        }
    }

    /// Remove a subtree, freeing every element in it.
    ///
    /// Clears focus if the focused element was inside. Removing an
    /// already-removed node is a no-op, which makes dismissal paths
    /// (timer vs. close button) naturally idempotent.
    pub fn remove(&mut self, node: NodeId) {
        if !self.alive(node) {
            return;
        }
        if let Some(focused) = self.focused
            && (focused == node || self.contains(node, focused))
        {
            self.focused = None;
        }
        self.detach(node);
        self.free_subtree(node);
    }

    fn free_subtree(&mut self, node: NodeId) {
        let children = self
            .element(node)
            .map(|el| el.children.clone())
            .unwrap_or_default();
        for child in children {
            self.free_subtree(child);
        }
        let slot = &mut self.slots[node.index as usize];
        slot.element = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(node.index);
    }

    // ─────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn alive(&self, node: NodeId) -> bool {
        self.slots
            .get(node.index as usize)
            .is_some_and(|slot| slot.generation == node.generation && slot.element.is_some())
    }

    #[must_use]
    pub fn element(&self, node: NodeId) -> Option<&Element> {
        let slot = self.slots.get(node.index as usize)?;
        if slot.generation != node.generation {
            return None;
        }
        slot.element.as_ref()
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        let slot = self.slots.get_mut(node.index as usize)?;
        if slot.generation != node.generation {
            return None;
        }
        slot.element.as_mut()
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.element(node)?.parent
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.element(node)
            .map(|el| el.children.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.element(node)?.children.first().copied()
    }

    /// The element immediately after `node` under the same parent.
    #[must_use]
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = &self.element(parent)?.children;
        let at = siblings.iter().position(|c| *c == node)?;
        siblings.get(at + 1).copied()
    }

    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.tag.as_str())
    }

    #[must_use]
    pub fn id_of(&self, node: NodeId) -> Option<&str> {
        self.element(node)?.id.as_deref()
    }

    // ─────────────────────────────────────────────────────────────────
    // Classes, attributes, data
    // ─────────────────────────────────────────────────────────────────

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element_mut(node) {
            el.classes.insert(class.to_string());
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element_mut(node) {
            el.classes.remove(class);
        }
    }

    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|el| el.classes.contains(class))
    }

    #[must_use]
    pub fn attr<'a>(&'a self, node: NodeId, name: &str) -> Option<&'a str> {
        self.element(node)?.attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(node) {
            el.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.element_mut(node) {
            el.attrs.remove(name);
        }
    }

    #[must_use]
    pub fn data<'a>(&'a self, node: NodeId, name: &str) -> Option<&'a str> {
        self.element(node)?.dataset.get(name).map(String::as_str)
    }

    pub fn set_data(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(node) {
            el.dataset.insert(name.to_string(), value.to_string());
        }
    }

    #[must_use]
    pub fn text<'a>(&'a self, node: NodeId) -> Option<&'a str> {
        self.element(node).map(|el| el.text.as_str())
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(el) = self.element_mut(node) {
            el.text = text.to_string();
        }
    }

    /// Concatenated text of the node and all descendants, in tree order.
    #[must_use]
    pub fn deep_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        for n in self.descendants(node) {
            if let Some(el) = self.element(n) {
                out.push_str(&el.text);
            }
        }
        out
    }

    #[must_use]
    pub fn value<'a>(&'a self, node: NodeId) -> Option<&'a str> {
        self.element(node).map(|el| el.value.as_str())
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(el) = self.element_mut(node) {
            el.value = value.to_string();
        }
    }

    pub fn set_selection_range(&mut self, node: NodeId, start: usize, end: usize) {
        if let Some(el) = self.element_mut(node) {
            el.selection = Some((start, end));
        }
    }

    #[must_use]
    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|el| el.disabled)
    }

    pub fn set_disabled(&mut self, node: NodeId, disabled: bool) {
        if let Some(el) = self.element_mut(node) {
            el.disabled = disabled;
        }
    }

    // ─────────────────────────────────────────────────────────────────
    // Focus
    // ─────────────────────────────────────────────────────────────────

    /// Move focus to `node`.
    ///
    /// Dead or disabled elements cannot take focus; the call is a no-op
    /// and the previous focus is kept.
    pub fn focus(&mut self, node: NodeId) {
        if self.alive(node) && !self.is_disabled(node) {
            self.focused = Some(node);
        }
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    #[must_use]
    pub fn active_element(&self) -> Option<NodeId> {
        self.focused.filter(|n| self.alive(*n))
    }

    // ─────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────

    /// Preorder traversal of `root` and everything beneath it.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if !self.alive(node) {
                continue;
            }
            out.push(node);
            let children = self
                .element(node)
                .map(|el| el.children.clone())
                .unwrap_or_default();
            for child in children.into_iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// First element under `root` (inclusive) matching `pred`.
    pub fn find(&self, root: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|n| self.element(*n).is_some_and(&pred))
    }

    pub fn find_all(&self, root: NodeId, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|n| self.element(*n).is_some_and(&pred))
            .collect()
    }

    /// First element under `root` whose `data-target` is `name`.
    #[must_use]
    pub fn target(&self, root: NodeId, name: &str) -> Option<NodeId> {
        self.find(root, |el| el.dataset.get("target").is_some_and(|t| t == name))
    }

    /// All elements under `root` whose `data-target` is `name`, in tree order.
    #[must_use]
    pub fn targets(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.find_all(root, |el| el.dataset.get("target").is_some_and(|t| t == name))
    }

    /// Anywhere in the document: the element with the given id.
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find(self.body, |el| el.id.as_deref() == Some(id))
    }

    /// Nearest ancestor of `node` (inclusive) matching `pred`.
    pub fn closest(&self, node: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(n) = current {
            if self.element(n).is_some_and(&pred) {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }

    /// Whether `node` is `ancestor` or lies beneath it.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Read a `<meta name=... content=...>` entry.
    #[must_use]
    pub fn meta_content(&self, name: &str) -> Option<String> {
        let node = self.find(self.body, |el| {
            el.tag == "meta" && el.attrs.get("name").is_some_and(|n| n == name)
        })?;
        self.attr(node, "content").map(str::to_string)
    }

    // ─────────────────────────────────────────────────────────────────
    // Fragment instantiation
    // ─────────────────────────────────────────────────────────────────

    /// Build a detached element tree from a [`Fragment`] description.
    pub fn instantiate(&mut self, fragment: &Fragment) -> NodeId {
        let node = self.alloc(fragment.to_element());
        for child in &fragment.children {
            let child_node = self.instantiate(child);
            self.append_child(node, child_node);
        }
        node
    }

    /// Instantiate a fragment as the last child of `parent`.
    pub fn append_fragment(&mut self, parent: NodeId, fragment: &Fragment) -> NodeId {
        let node = self.instantiate(fragment);
        self.append_child(parent, node);
        node
    }
}
