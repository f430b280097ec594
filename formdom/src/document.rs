use std::collections::HashMap;
use std::time::Duration;

use log::trace;
use thiserror::Error;

use crate::element::Element;
use crate::popover::{Align, Placement, Popover};
use crate::selector::Selector;

/// Handle to a live node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Structural change recorded by the document, drained by extensions that
/// attach behavior to matching nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Attached(NodeId),
    Detached(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("{0} is not part of the document")]
    UnknownNode(NodeId),
    #[error("the document root cannot be removed")]
    RemoveRoot,
}

#[derive(Debug)]
struct Node {
    tag: String,
    attrs: HashMap<String, String>,
    value: String,
    checked: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    popover: Option<Popover>,
}

/// An in-memory element tree.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Option<Node>>,
    root: NodeId,
    ids: HashMap<String, NodeId>,
    mutations: Vec<Mutation>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let body = Node {
            tag: "body".to_string(),
            attrs: HashMap::new(),
            value: String::new(),
            checked: false,
            parent: None,
            children: Vec::new(),
            popover: None,
        };
        Self {
            nodes: vec![Some(body)],
            root: NodeId(0),
            ids: HashMap::new(),
            mutations: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    // -------------------------------------------------------------------------
    // Tree mutation
    // -------------------------------------------------------------------------

    /// Append an element subtree to the document root.
    pub fn mount(&mut self, element: Element) -> NodeId {
        let root = self.root;
        self.insert(root, element)
    }

    /// Append an element subtree under `parent`.
    pub fn append(&mut self, parent: NodeId, element: Element) -> Result<NodeId, DomError> {
        if !self.contains(parent) {
            return Err(DomError::UnknownNode(parent));
        }
        Ok(self.insert(parent, element))
    }

    fn insert(&mut self, parent: NodeId, element: Element) -> NodeId {
        let Element {
            id,
            tag,
            mut attrs,
            value,
            checked,
            children,
        } = element;

        attrs.insert("id".to_string(), id.clone());

        let node_id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node {
            tag,
            attrs,
            value,
            checked,
            parent: Some(parent),
            children: Vec::new(),
            popover: None,
        }));
        if let Some(parent) = self.node_mut(parent) {
            parent.children.push(node_id);
        }
        self.ids.insert(id, node_id);
        self.mutations.push(Mutation::Attached(node_id));
        trace!("attached {node_id}");

        for child in children {
            self.insert(node_id, child);
        }

        node_id
    }

    /// Remove a node and its subtree.
    pub fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        if node == self.root {
            return Err(DomError::RemoveRoot);
        }
        let parent = self
            .node(node)
            .ok_or(DomError::UnknownNode(node))?
            .parent;

        if let Some(parent) = parent.and_then(|p| self.node_mut(p)) {
            parent.children.retain(|&child| child != node);
        }

        let mut subtree = vec![node];
        subtree.extend(self.descendants(node));
        for id in subtree {
            if let Some(removed) = self.nodes.get_mut(id.0).and_then(Option::take) {
                if let Some(dom_id) = removed.attrs.get("id") {
                    self.ids.remove(dom_id);
                }
                self.mutations.push(Mutation::Detached(id));
                trace!("detached {id}");
            }
        }

        Ok(())
    }

    /// Drain the pending attach/detach records.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    // -------------------------------------------------------------------------
    // Node access
    // -------------------------------------------------------------------------

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(|n| n.tag.as_str())
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)
            .and_then(|n| n.attrs.get(&name.to_ascii_lowercase()))
            .map(String::as_str)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        if let Some(n) = self.node_mut(node) {
            n.attrs.insert(name.to_ascii_lowercase(), value.into());
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(n) = self.node_mut(node) {
            n.attrs.remove(&name.to_ascii_lowercase());
        }
    }

    pub fn value(&self, node: NodeId) -> &str {
        self.node(node).map_or("", |n| n.value.as_str())
    }

    pub fn set_value(&mut self, node: NodeId, value: impl Into<String>) {
        if let Some(n) = self.node_mut(node) {
            n.value = value.into();
        }
    }

    pub fn checked(&self, node: NodeId) -> bool {
        self.node(node).is_some_and(|n| n.checked)
    }

    /// Set the checked state. Checking a radio button unchecks the other
    /// radios of its group (same name within the same form).
    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        let is_radio = |doc: &Self, id: NodeId| {
            doc.attr(id, "type")
                .is_some_and(|t| t.eq_ignore_ascii_case("radio"))
        };

        if checked && is_radio(self, node) {
            if let Some(name) = self.attr(node, "name").map(str::to_string) {
                let scope = self.form_of(node).unwrap_or(self.root);
                let group: Vec<NodeId> = self
                    .descendants(scope)
                    .into_iter()
                    .filter(|&id| {
                        id != node
                            && is_radio(self, id)
                            && self.attr(id, "name") == Some(name.as_str())
                    })
                    .collect();
                for id in group {
                    if let Some(n) = self.node_mut(id) {
                        n.checked = false;
                    }
                }
            }
        }

        if let Some(n) = self.node_mut(node) {
            n.checked = checked;
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// All descendants in document order, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    // -------------------------------------------------------------------------
    // Selectors
    // -------------------------------------------------------------------------

    pub fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        self.node(node).is_some_and(|n| {
            selector.matches_with(&n.tag, |name| n.attrs.get(name).map(String::as_str))
        })
    }

    /// Nearest inclusive ancestor matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.matches(id, selector) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    /// Descendants of `node` matching `selector`, in document order.
    pub fn query_all(&self, node: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(node)
            .into_iter()
            .filter(|&id| self.matches(id, selector))
            .collect()
    }

    pub fn query(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(node)
            .into_iter()
            .find(|&id| self.matches(id, selector))
    }

    /// The closest enclosing `<form>`, if any.
    pub fn form_of(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if self.tag(id) == Some("form") {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    // -------------------------------------------------------------------------
    // Popovers
    // -------------------------------------------------------------------------

    pub fn popover(&self, node: NodeId) -> Option<&Popover> {
        self.node(node).and_then(|n| n.popover.as_ref())
    }

    pub fn show_popover(
        &mut self,
        node: NodeId,
        content: &str,
        placement: Placement,
        align: Align,
        delay: Duration,
    ) {
        if let Some(n) = self.node_mut(node) {
            let popover = n
                .popover
                .get_or_insert_with(|| Popover::new(content, placement, align));
            popover.content = content.to_string();
            popover.placement = placement;
            popover.align = align;
            popover.delay = delay;
            popover.visible = true;
        }
    }

    pub fn hide_popover(&mut self, node: NodeId) {
        if let Some(popover) = self.node_mut(node).and_then(|n| n.popover.as_mut()) {
            popover.visible = false;
        }
    }

    pub fn popover_visible(&self, node: NodeId) -> bool {
        self.popover(node).is_some_and(|p| p.visible)
    }
}
