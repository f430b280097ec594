//! Behavior attachment.
//!
//! An extension pairs a predicate with the behavior attached to matching
//! nodes when they enter the document. The first matching extension wins.

use std::fmt;

use formdom::NodeId;

use crate::control::ControlKind;
use crate::dom::{Dom, field_name};

/// Behavior attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Behavior {
    Field,
    Form,
}

#[derive(Clone, Copy)]
pub struct Extension {
    pub name: &'static str,
    pub behavior: Behavior,
    pub predicate: fn(&dyn Dom, NodeId) -> bool,
}

impl Extension {
    pub const fn new(
        name: &'static str,
        behavior: Behavior,
        predicate: fn(&dyn Dom, NodeId) -> bool,
    ) -> Self {
        Self {
            name,
            behavior,
            predicate,
        }
    }

    pub fn applies(&self, dom: &dyn Dom, node: NodeId) -> bool {
        (self.predicate)(dom, node)
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name)
            .field("behavior", &self.behavior)
            .finish_non_exhaustive()
    }
}

fn is_form(dom: &dyn Dom, node: NodeId) -> bool {
    dom.tag(node) == Some("form")
}

fn is_named_control(dom: &dyn Dom, node: NodeId) -> bool {
    field_name(dom, node).is_some()
        && ControlKind::classify(dom, node).is_some_and(ControlKind::contributes)
}

/// `form` elements get form behavior, named contributing controls get
/// field behavior.
pub fn default_extensions() -> Vec<Extension> {
    vec![
        Extension::new("form", Behavior::Form, is_form),
        Extension::new("named-control", Behavior::Field, is_named_control),
    ]
}

/// Behavior of the first extension matching `node`.
pub fn classify(extensions: &[Extension], dom: &dyn Dom, node: NodeId) -> Option<Behavior> {
    extensions
        .iter()
        .find(|ext| ext.applies(dom, node))
        .map(|ext| ext.behavior)
}
