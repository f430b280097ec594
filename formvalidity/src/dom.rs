//! The DOM collaborator contract.
//!
//! The engine never owns the element tree. Everything it needs from the host
//! (attribute access, tree walks, attach/detach notifications and the popover
//! primitive) goes through [`Dom`], which `formdom::Document` implements.

use std::sync::LazyLock;
use std::time::Duration;

use formdom::{Align, Document, Mutation, NodeId, Placement, Selector};

static FORM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("form").expect("form selector must parse"));

/// Host DOM operations consumed by the validity engine.
pub trait Dom {
    fn root(&self) -> NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Descendants in document order, excluding `node`.
    fn descendants(&self, node: NodeId) -> Vec<NodeId>;

    /// Lowercase tag name, `None` for nodes that no longer exist.
    fn tag(&self, node: NodeId) -> Option<&str>;

    fn attr(&self, node: NodeId, name: &str) -> Option<&str>;

    /// Set (`Some`) or remove (`None`) an attribute.
    fn set_attr(&mut self, node: NodeId, name: &str, value: Option<&str>);

    fn value(&self, node: NodeId) -> &str;

    fn set_value(&mut self, node: NodeId, value: &str);

    fn checked(&self, node: NodeId) -> bool;

    fn matches(&self, node: NodeId, selector: &Selector) -> bool;

    /// Drain attach/detach records accumulated since the last call.
    fn take_mutations(&mut self) -> Vec<Mutation>;

    fn show_popover(
        &mut self,
        node: NodeId,
        content: &str,
        placement: Placement,
        align: Align,
        delay: Duration,
    );

    fn hide_popover(&mut self, node: NodeId);

    fn popover_visible(&self, node: NodeId) -> bool;

    fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    /// Nearest inclusive ancestor matching `selector`.
    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.matches(id, selector) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }
}

/// The nearest ancestor `<form>` of `node`.
pub fn enclosing_form(dom: &dyn Dom, node: NodeId) -> Option<NodeId> {
    dom.parent(node).and_then(|parent| dom.closest(parent, &FORM))
}

/// Non-empty `name` attribute of `node`.
pub fn field_name(dom: &dyn Dom, node: NodeId) -> Option<&str> {
    dom.attr(node, "name").filter(|name| !name.is_empty())
}

/// Descendants of `node` carrying a non-empty `name`, in document order.
pub fn named_descendants(dom: &dyn Dom, node: NodeId) -> Vec<NodeId> {
    dom.descendants(node)
        .into_iter()
        .filter(|&id| field_name(dom, id).is_some())
        .collect()
}

impl Dom for Document {
    fn root(&self) -> NodeId {
        Document::root(self)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Document::parent(self, node)
    }

    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        Document::descendants(self, node)
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        Document::tag(self, node)
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        Document::attr(self, node, name)
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: Option<&str>) {
        match value {
            Some(value) => Document::set_attr(self, node, name, value),
            None => Document::remove_attr(self, node, name),
        }
    }

    fn value(&self, node: NodeId) -> &str {
        Document::value(self, node)
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        Document::set_value(self, node, value);
    }

    fn checked(&self, node: NodeId) -> bool {
        Document::checked(self, node)
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        Document::matches(self, node, selector)
    }

    fn take_mutations(&mut self) -> Vec<Mutation> {
        Document::take_mutations(self)
    }

    fn show_popover(
        &mut self,
        node: NodeId,
        content: &str,
        placement: Placement,
        align: Align,
        delay: Duration,
    ) {
        Document::show_popover(self, node, content, placement, align, delay);
    }

    fn hide_popover(&mut self, node: NodeId) {
        Document::hide_popover(self, node);
    }

    fn popover_visible(&self, node: NodeId) -> bool {
        Document::popover_visible(self, node)
    }
}
