//! Per-form aggregation.

use std::collections::HashSet;

use formdom::NodeId;

use crate::control::ControlKind;
use crate::dom::{Dom, field_name, named_descendants};
use crate::overrides::FormOverride;

/// Errors of one named field inside an [`Aggregate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    pub name: String,
    /// `None` for names injected by a form override with no matching control.
    pub node: Option<NodeId>,
    pub errors: Vec<String>,
}

/// Form-level validity: per-name errors plus the total error count.
///
/// Only fields with at least one error are listed, in document order, then
/// override-only names. Form-level override messages count toward
/// [`Aggregate::len`] but are not tied to a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    form: Vec<String>,
    fields: Vec<FieldErrors>,
    length: usize,
}

impl Aggregate {
    /// Total number of error messages.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Check if the form passed validation.
    pub fn is_valid(&self) -> bool {
        self.length == 0
    }

    /// Check if the form failed validation.
    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// Errors for a field name, if it has any.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.errors.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn fields(&self) -> &[FieldErrors] {
        &self.fields
    }

    /// Names with errors, in aggregation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|entry| entry.name.as_str())
    }

    /// Form-level messages not tied to a field.
    pub fn form_errors(&self) -> &[String] {
        &self.form
    }

    /// First message, form-level ones first.
    pub fn first_error(&self) -> Option<&str> {
        self.form
            .iter()
            .chain(self.fields.iter().flat_map(|entry| entry.errors.iter()))
            .map(String::as_str)
            .next()
    }

    fn push(&mut self, name: String, node: Option<NodeId>, errors: Vec<String>) {
        self.length += errors.len();
        if !errors.is_empty() {
            self.fields.push(FieldErrors { name, node, errors });
        }
    }
}

/// Validity state attached to a form.
#[derive(Debug, Clone)]
pub struct FormValidity {
    override_errors: Option<FormOverride>,
    last_valid: bool,
}

impl Default for FormValidity {
    fn default() -> Self {
        Self::new()
    }
}

impl FormValidity {
    pub fn new() -> Self {
        Self {
            override_errors: None,
            last_valid: true,
        }
    }

    pub fn override_errors(&self) -> Option<&FormOverride> {
        self.override_errors.as_ref()
    }

    pub fn set_override(&mut self, errors: Option<FormOverride>) {
        self.override_errors = errors;
    }

    /// Outcome of the last submit check.
    pub fn last_valid(&self) -> bool {
        self.last_valid
    }

    pub(crate) fn set_last_valid(&mut self, valid: bool) -> bool {
        std::mem::replace(&mut self.last_valid, valid)
    }
}

/// Aggregate the named controls of `form`.
///
/// `field_errors` computes a control's own errors; it is skipped for names
/// the override supplies. The first control wins for duplicate names.
pub fn compute_aggregate<F>(
    dom: &dyn Dom,
    form: NodeId,
    override_errors: Option<&FormOverride>,
    mut field_errors: F,
) -> Aggregate
where
    F: FnMut(NodeId) -> Vec<String>,
{
    let mut aggregate = Aggregate::default();
    if dom.has_attr(form, "novalidate") {
        return aggregate;
    }

    let mut injected = override_errors
        .map(|o| o.resolve(dom, form))
        .unwrap_or_default();
    aggregate.length = injected.form.len();
    aggregate.form = std::mem::take(&mut injected.form);

    let mut seen = HashSet::new();
    for node in named_descendants(dom, form) {
        if !ControlKind::classify(dom, node).is_some_and(ControlKind::contributes) {
            continue;
        }
        let Some(name) = field_name(dom, node) else {
            continue;
        };
        if !seen.insert(name.to_string()) {
            continue;
        }

        let errors = match injected.fields.remove(name) {
            Some(errors) => errors,
            None => field_errors(node),
        };
        aggregate.push(name.to_string(), Some(node), errors);
    }

    for (name, errors) in injected.fields {
        aggregate.push(name, None, errors);
    }
    aggregate
}
