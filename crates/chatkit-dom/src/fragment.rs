#![forbid(unsafe_code)]

//! Declarative element-tree descriptions.
//!
//! A [`Fragment`] stands in for the HTML a server template would render:
//! the markup is an external contract this layer consumes, so fragments
//! are built in code (by the harness or by a fallback renderer) and
//! instantiated into a [`Document`](crate::Document).

use std::collections::{BTreeMap, BTreeSet};

use crate::document::Element;

/// A detached element tree description.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub dataset: Vec<(String, String)>,
    pub text: String,
    pub value: Option<String>,
    pub disabled: bool,
    pub children: Vec<Fragment>,
}

impl Fragment {
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Add multiple space-separated classes at once.
    #[must_use]
    pub fn classes(mut self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            self.classes.push(class.to_string());
        }
        self
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn data(mut self, name: &str, value: &str) -> Self {
        self.dataset.push((name.to_string(), value.to_string()));
        self
    }

    /// Shorthand for the `data-target` marker controllers query by.
    #[must_use]
    pub fn target(self, name: &str) -> Self {
        self.data("target", name)
    }

    /// Shorthand for the `data-controller` marker the page attaches by.
    #[must_use]
    pub fn controller(self, name: &str) -> Self {
        self.data("controller", name)
    }

    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    #[must_use]
    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub fn child(mut self, child: Fragment) -> Self {
        self.children.push(child);
        self
    }

    pub(crate) fn to_element(&self) -> Element {
        Element {
            tag: self.tag.clone(),
            id: self.id.clone(),
            classes: self.classes.iter().cloned().collect::<BTreeSet<_>>(),
            attrs: self
                .attrs
                .iter()
                .cloned()
                .collect::<BTreeMap<String, String>>(),
            dataset: self
                .dataset
                .iter()
                .cloned()
                .collect::<BTreeMap<String, String>>(),
            text: self.text.clone(),
            value: self.value.clone().unwrap_or_default(),
            selection: None,
            disabled: self.disabled,
            children: Vec::new(),
            parent: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    #[test]
    fn instantiate_builds_the_tree() {
        let frag = Fragment::new("div")
            .id("chat_1")
            .class("chat-item")
            .target("chatItem")
            .child(Fragment::new("a").target("linkToChat").text("First chat"))
            .child(Fragment::new("button").target("deleteChat").disabled(true));

        let mut doc = Document::new();
        let body = doc.body();
        let root = doc.append_fragment(body, &frag);

        assert_eq!(doc.id_of(root), Some("chat_1"));
        assert!(doc.has_class(root, "chat-item"));
        assert_eq!(doc.children(root).len(), 2);

        let link = doc.target(root, "linkToChat").unwrap();
        assert_eq!(doc.text(link), Some("First chat"));

        let button = doc.target(root, "deleteChat").unwrap();
        assert!(doc.is_disabled(button));
    }

    #[test]
    fn classes_shorthand_splits_on_whitespace() {
        let frag = Fragment::new("div").classes("alert bg-red-100 text-red-700");
        let mut doc = Document::new();
        let body = doc.body();
        let node = doc.append_fragment(body, &frag);
        assert!(doc.has_class(node, "alert"));
        assert!(doc.has_class(node, "text-red-700"));
    }
}
