//! Per-control validity.
//!
//! A field's errors are recomputed from the live DOM on every request. The
//! only state kept between requests is the override, the last reported
//! errors and the mirrored `aria-invalid` flag.

use std::sync::Arc;

use formdom::NodeId;
use log::trace;
use regex::Regex;

use crate::config::{Messages, OverrideMode};
use crate::control::{ControlKind, control_type};
use crate::dom::{Dom, enclosing_form, field_name};
use crate::overrides::FieldOverride;
use crate::patterns::PatternRegistry;
use crate::registry::ValidatorRegistry;

/// Two-state validity as observed by the last report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityState {
    Valid,
    Invalid,
}

impl ValidityState {
    pub fn of(errors: &[String]) -> Self {
        if errors.is_empty() {
            Self::Valid
        } else {
            Self::Invalid
        }
    }
}

/// The state change caused by one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ValidityState,
    pub to: ValidityState,
}

impl Transition {
    /// Whether validity flipped.
    pub fn is_edge(&self) -> bool {
        self.from != self.to
    }
}

/// Validity state attached to a single control.
#[derive(Debug, Clone)]
pub struct FieldValidity {
    kind: ControlKind,
    override_errors: Option<FieldOverride>,
    last_errors: Vec<String>,
    aria_invalid: Option<bool>,
}

impl FieldValidity {
    pub fn new(kind: ControlKind) -> Self {
        Self {
            kind,
            override_errors: None,
            last_errors: Vec::new(),
            aria_invalid: None,
        }
    }

    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    pub fn override_errors(&self) -> Option<&FieldOverride> {
        self.override_errors.as_ref()
    }

    /// Replace the override. Does not recompute or notify.
    pub fn set_override(&mut self, errors: Option<FieldOverride>) {
        self.override_errors = errors;
    }

    /// Errors observed by the last report.
    pub fn last_errors(&self) -> &[String] {
        &self.last_errors
    }

    /// `None` until the field has been reported once (or after a reset).
    pub fn aria_invalid(&self) -> Option<bool> {
        self.aria_invalid
    }

    pub fn state(&self) -> ValidityState {
        ValidityState::of(&self.last_errors)
    }

    pub(crate) fn record(&mut self, errors: &[String]) -> Transition {
        let from = self.state();
        self.last_errors = errors.to_vec();
        self.aria_invalid = Some(!errors.is_empty());
        Transition {
            from,
            to: self.state(),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.last_errors.clear();
        self.aria_invalid = None;
    }
}

/// Everything a field computation reads besides the DOM.
#[derive(Debug, Clone, Copy)]
pub struct Rules<'a> {
    pub patterns: &'a PatternRegistry,
    pub messages: &'a Messages,
    pub validators: &'a ValidatorRegistry,
    pub mode: OverrideMode,
}

/// `novalidate` on the control or on its enclosing form.
pub fn is_novalidate(dom: &dyn Dom, node: NodeId) -> bool {
    dom.has_attr(node, "novalidate")
        || enclosing_form(dom, node).is_some_and(|form| dom.has_attr(form, "novalidate"))
}

/// Compute the current errors of a control.
///
/// Order: override, custom validators, then the built-in check. A
/// non-empty override short-circuits unless `rules.mode` is
/// [`OverrideMode::Merge`].
pub fn compute_errors(
    dom: &dyn Dom,
    node: NodeId,
    kind: ControlKind,
    override_errors: Option<&FieldOverride>,
    rules: &Rules<'_>,
) -> Vec<String> {
    if is_novalidate(dom, node) {
        return Vec::new();
    }

    let mut errors = override_errors
        .map(|o| o.resolve(dom, node))
        .unwrap_or_default();
    if !errors.is_empty() && rules.mode == OverrideMode::Replace {
        return errors;
    }

    errors.extend(rules.validators.check(dom, node));
    errors.extend(builtin_error(dom, node, kind, rules));
    errors
}

fn builtin_error(
    dom: &dyn Dom,
    node: NodeId,
    kind: ControlKind,
    rules: &Rules<'_>,
) -> Option<String> {
    let required = dom.has_attr(node, "required");

    match kind {
        ControlKind::Select | ControlKind::Excluded => None,
        ControlKind::Checkbox => {
            (required && !dom.checked(node)).then(|| rules.messages.required.clone())
        }
        ControlKind::Radio => {
            (required && !radio_group_checked(dom, node)).then(|| rules.messages.required.clone())
        }
        ControlKind::TextLike => text_error(dom, node, required, rules),
    }
}

/// Whether any radio sharing `node`'s name within its form is checked.
fn radio_group_checked(dom: &dyn Dom, node: NodeId) -> bool {
    let Some(name) = field_name(dom, node) else {
        return dom.checked(node);
    };
    let scope = enclosing_form(dom, node).unwrap_or_else(|| dom.root());

    dom.descendants(scope).into_iter().any(|id| {
        dom.checked(id)
            && field_name(dom, id) == Some(name)
            && ControlKind::classify(dom, id) == Some(ControlKind::Radio)
    })
}

fn text_error(dom: &dyn Dom, node: NodeId, required: bool, rules: &Rules<'_>) -> Option<String> {
    let value = dom.value(node);
    let mut rule: Option<(Arc<Regex>, String)> = None;

    if !value.is_empty() {
        if let Some(source) = dom.attr(node, "pattern").filter(|p| !p.is_empty()) {
            // Malformed sources are logged once by the registry and skipped.
            if let Ok(regex) = rules.patterns.custom(source) {
                let message = dom
                    .attr(node, "title")
                    .filter(|t| !t.is_empty())
                    .unwrap_or(rules.messages.pattern.as_str());
                rule = Some((regex, message.to_string()));
            }
        } else {
            let input_type = control_type(dom, node).unwrap_or_default();
            if let Some(message) = rules.messages.mismatch(&input_type) {
                rule = PatternRegistry::builtin(&input_type).map(|regex| (regex, message.to_string()));
            }
        }
    }

    if required && rule.is_none() {
        rule = PatternRegistry::builtin("required")
            .map(|regex| (regex, rules.messages.required.clone()));
    }

    let (regex, message) = rule?;
    if regex.is_match(value) {
        None
    } else {
        trace!("{node} fails {}", regex.as_str());
        Some(message)
    }
}
