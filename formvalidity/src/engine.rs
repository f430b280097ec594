//! The validation engine.
//!
//! [`Validation`] owns the validity side tables, the listeners and the
//! tooltip layer. The host feeds it attach/detach mutations through
//! [`Validation::sync`] and DOM events through [`Validation::handle_event`].

use std::collections::HashMap;
use std::sync::Arc;

use formdom::{Event, Mutation, NodeId};
use log::{debug, info, trace};
use serde_json::Value;

use crate::config::{NotifyPolicy, ValidityConfig};
use crate::control::ControlKind;
use crate::dom::{Dom, enclosing_form, field_name, named_descendants};
use crate::error::ConfigError;
use crate::extension::{Behavior, Extension, classify, default_extensions};
use crate::field::{FieldValidity, Rules, ValidityState, compute_errors, is_novalidate};
use crate::form::{Aggregate, FormValidity, compute_aggregate};
use crate::notify::{Failure, Flow, ListenerId, Listeners, Notification};
use crate::overrides::{FieldOverride, FormOverride};
use crate::patterns::PatternRegistry;
use crate::registry::ValidatorRegistry;
use crate::tooltip::TooltipLayer;

pub struct Validation {
    config: ValidityConfig,
    patterns: Arc<PatternRegistry>,
    validators: ValidatorRegistry,
    extensions: Vec<Extension>,
    fields: HashMap<NodeId, FieldValidity>,
    forms: HashMap<NodeId, FormValidity>,
    listeners: Listeners,
    tooltips: TooltipLayer,
}

impl Default for Validation {
    fn default() -> Self {
        Self::new(ValidityConfig::default())
    }
}

impl Validation {
    pub fn new(config: ValidityConfig) -> Self {
        let tooltips = TooltipLayer::new(config.tooltip.clone());
        Self {
            config,
            patterns: PatternRegistry::shared(),
            validators: ValidatorRegistry::new(),
            extensions: default_extensions(),
            fields: HashMap::new(),
            forms: HashMap::new(),
            listeners: Listeners::new(),
            tooltips,
        }
    }

    /// Use a dedicated pattern cache instead of the process-wide one.
    pub fn with_patterns(mut self, patterns: Arc<PatternRegistry>) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn with_validators(mut self, validators: ValidatorRegistry) -> Self {
        self.validators = validators;
        self
    }

    /// Add an extension ahead of the existing ones.
    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.extensions.insert(0, extension);
        self
    }

    pub fn config(&self) -> &ValidityConfig {
        &self.config
    }

    pub fn patterns(&self) -> &Arc<PatternRegistry> {
        &self.patterns
    }

    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    pub fn register_validator<F>(&mut self, selector: &str, check: F) -> Result<(), ConfigError>
    where
        F: Fn(&dyn Dom, NodeId) -> Option<String> + Send + Sync + 'static,
    {
        self.validators.register(selector, check)
    }

    fn rules(&self) -> Rules<'_> {
        Rules {
            patterns: &self.patterns,
            messages: &self.config.messages,
            validators: &self.validators,
            mode: self.config.overrides,
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Apply pending attach/detach mutations from the DOM.
    pub fn sync(&mut self, dom: &mut dyn Dom) {
        for mutation in dom.take_mutations() {
            match mutation {
                Mutation::Attached(node) => {
                    self.attach(&*dom, node);
                }
                Mutation::Detached(node) => self.detach(node),
            }
        }
    }

    /// Attach validity state to `node` if an extension matches it.
    pub fn attach(&mut self, dom: &dyn Dom, node: NodeId) -> Option<Behavior> {
        let behavior = classify(&self.extensions, dom, node)?;
        match behavior {
            Behavior::Field => {
                let kind = ControlKind::classify(dom, node).unwrap_or(ControlKind::Excluded);
                self.fields
                    .entry(node)
                    .or_insert_with(|| FieldValidity::new(kind));
                trace!("attached field {node} ({kind:?})");
            }
            Behavior::Form => {
                self.forms.entry(node).or_default();
                trace!("attached form {node}");
            }
        }
        Some(behavior)
    }

    /// Drop all state and listeners bound to `node`.
    pub fn detach(&mut self, node: NodeId) {
        let field = self.fields.remove(&node).is_some();
        let form = self.forms.remove(&node).is_some();
        if field || form {
            self.listeners.remove_target(node);
            trace!("detached {node}");
        }
    }

    pub fn field(&self, node: NodeId) -> Option<&FieldValidity> {
        self.fields.get(&node)
    }

    pub fn form(&self, node: NodeId) -> Option<&FormValidity> {
        self.forms.get(&node)
    }

    // -------------------------------------------------------------------------
    // Fields
    // -------------------------------------------------------------------------

    /// Store an override for an attached field. Nothing is recomputed.
    pub fn set_field_errors(
        &mut self,
        node: NodeId,
        errors: impl Into<FieldOverride>,
    ) -> Result<(), ConfigError> {
        self.field_state(node)?.set_override(Some(errors.into()));
        Ok(())
    }

    /// Dynamic variant of [`set_field_errors`](Self::set_field_errors);
    /// `null` clears the override.
    pub fn set_field_errors_json(&mut self, node: NodeId, value: Value) -> Result<(), ConfigError> {
        let errors = FieldOverride::from_json(value)?;
        self.field_state(node)?.set_override(errors);
        Ok(())
    }

    pub fn clear_field_errors(&mut self, node: NodeId) -> Result<(), ConfigError> {
        self.field_state(node)?.set_override(None);
        Ok(())
    }

    fn field_state(&mut self, node: NodeId) -> Result<&mut FieldValidity, ConfigError> {
        self.fields
            .get_mut(&node)
            .ok_or(ConfigError::NotAttached {
                scope: "field",
                node,
            })
    }

    /// Current errors of a control, recomputed from the live DOM.
    ///
    /// Controls without attached state are classified on the fly; nodes that
    /// are not controls have no errors.
    pub fn field_errors(&self, dom: &dyn Dom, node: NodeId) -> Vec<String> {
        let (kind, override_errors) = match self.fields.get(&node) {
            Some(state) => (state.kind(), state.override_errors()),
            None => match ControlKind::classify(dom, node) {
                Some(kind) => (kind, None),
                None => return Vec::new(),
            },
        };
        compute_errors(dom, node, kind, override_errors, &self.rules())
    }

    /// Compute, mirror into `aria-invalid` and notify on state change.
    pub fn report_field(&mut self, dom: &mut dyn Dom, node: NodeId) -> Vec<String> {
        if is_novalidate(&*dom, node) {
            return Vec::new();
        }

        let errors = self.field_errors(&*dom, node);
        let invalid = !errors.is_empty();
        dom.set_attr(node, "aria-invalid", Some(if invalid { "true" } else { "false" }));

        let Some(state) = self.fields.get_mut(&node) else {
            return errors;
        };
        let transition = state.record(&errors);
        debug!("{node} reported {transition:?}");

        let notification = match transition.to {
            ValidityState::Invalid
                if transition.is_edge() || self.config.notify == NotifyPolicy::EveryInvalidCheck =>
            {
                Some(Notification::Fail {
                    target: node,
                    failure: Failure::Field(errors.clone()),
                    batch: false,
                })
            }
            ValidityState::Valid if transition.is_edge() => Some(Notification::Ok { target: node }),
            _ => None,
        };
        if let Some(notification) = notification {
            self.notify(dom, notification);
        }
        errors
    }

    // -------------------------------------------------------------------------
    // Forms
    // -------------------------------------------------------------------------

    pub fn set_form_errors(
        &mut self,
        form: NodeId,
        errors: impl Into<FormOverride>,
    ) -> Result<(), ConfigError> {
        self.form_state(form)?.set_override(Some(errors.into()));
        Ok(())
    }

    /// Dynamic variant of [`set_form_errors`](Self::set_form_errors);
    /// `null` clears the override.
    pub fn set_form_errors_json(&mut self, form: NodeId, value: Value) -> Result<(), ConfigError> {
        let errors = FormOverride::from_json(value)?;
        self.form_state(form)?.set_override(errors);
        Ok(())
    }

    pub fn clear_form_errors(&mut self, form: NodeId) -> Result<(), ConfigError> {
        self.form_state(form)?.set_override(None);
        Ok(())
    }

    fn form_state(&mut self, form: NodeId) -> Result<&mut FormValidity, ConfigError> {
        self.forms.get_mut(&form).ok_or(ConfigError::NotAttached {
            scope: "form",
            node: form,
        })
    }

    /// Aggregate the errors of every named control in `form`.
    pub fn form_errors(&self, dom: &dyn Dom, form: NodeId) -> Aggregate {
        let override_errors = self.forms.get(&form).and_then(FormValidity::override_errors);
        compute_aggregate(dom, form, override_errors, |node| self.field_errors(dom, node))
    }

    /// Decide whether `form` may be submitted, notifying on failure and on
    /// recovery from a failed attempt.
    pub fn submit_gate(&mut self, dom: &mut dyn Dom, form: NodeId) -> bool {
        let aggregate = self.form_errors(&*dom, form);
        let valid = aggregate.is_valid();
        let was_valid = match self.forms.get_mut(&form) {
            Some(state) => state.set_last_valid(valid),
            None => true,
        };

        if valid {
            debug!("{form} submit allowed");
            if !was_valid {
                self.notify(dom, Notification::Ok { target: form });
            }
        } else {
            info!("{form} submit blocked with {} error(s)", aggregate.len());
            self.notify(
                dom,
                Notification::Fail {
                    target: form,
                    failure: Failure::Form(aggregate),
                    batch: false,
                },
            );
        }
        valid
    }

    /// Forget reported state for every named control of `form`.
    pub fn reset_form(&mut self, dom: &mut dyn Dom, form: NodeId) {
        for node in named_descendants(&*dom, form) {
            dom.set_attr(node, "aria-invalid", None);
            dom.hide_popover(node);
            if let Some(state) = self.fields.get_mut(&node) {
                state.clear();
            }
        }
        if let Some(state) = self.forms.get_mut(&form) {
            state.set_last_valid(true);
        }
        debug!("{form} reset");
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Route a DOM event to the behavior attached to its target.
    ///
    /// Returns [`Flow::Cancel`] when the event's default action must not
    /// proceed (a blocked submit).
    pub fn handle_event(&mut self, dom: &mut dyn Dom, event: &Event) -> Flow {
        trace!("event {event}");
        match *event {
            Event::Submit { target } if self.forms.contains_key(&target) => {
                if self.submit_gate(dom, target) {
                    Flow::Continue
                } else {
                    Flow::Cancel
                }
            }
            Event::Reset { target } if self.forms.contains_key(&target) => {
                self.reset_form(dom, target);
                Flow::Continue
            }
            Event::Input { target } => {
                if self.fields.get(&target).is_some_and(|f| !f.kind().is_checkable()) {
                    self.live_input(dom, target);
                }
                Flow::Continue
            }
            Event::Change { target } if self.fields.contains_key(&target) => {
                self.report_field(dom, target);
                Flow::Continue
            }
            Event::Click { target } => {
                match self.fields.get(&target).map(FieldValidity::kind) {
                    Some(kind) if kind.is_checkable() => self.report_checkable(dom, target, kind),
                    _ => {}
                }
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    /// Apply `maxlength` (counted in `char`s, so one astral-plane character
    /// counts once) and re-report fields that already carry `aria-invalid`.
    fn live_input(&mut self, dom: &mut dyn Dom, node: NodeId) {
        let limit = dom
            .attr(node, "maxlength")
            .and_then(|max| max.trim().parse::<usize>().ok());
        if let Some(limit) = limit {
            let value = dom.value(node);
            if value.chars().count() > limit {
                let truncated: String = value.chars().take(limit).collect();
                trace!("{node} truncated to {limit} chars");
                dom.set_value(node, &truncated);
            }
        }

        if self
            .fields
            .get(&node)
            .is_some_and(|state| state.aria_invalid().is_some())
        {
            self.report_field(dom, node);
        }
    }

    /// Report a clicked checkbox or radio. For radios, previously reported
    /// members of the same group are re-reported too, since checking one
    /// satisfies them all.
    fn report_checkable(&mut self, dom: &mut dyn Dom, node: NodeId, kind: ControlKind) {
        self.report_field(dom, node);
        if kind != ControlKind::Radio {
            return;
        }
        let Some(name) = field_name(&*dom, node).map(str::to_string) else {
            return;
        };

        let scope = enclosing_form(&*dom, node).unwrap_or_else(|| dom.root());
        let siblings: Vec<NodeId> = named_descendants(&*dom, scope)
            .into_iter()
            .filter(|&id| id != node && field_name(&*dom, id) == Some(name.as_str()))
            .filter(|id| {
                self.fields
                    .get(id)
                    .is_some_and(|state| state.aria_invalid().is_some())
            })
            .collect();
        for sibling in siblings {
            self.report_field(dom, sibling);
        }
    }

    // -------------------------------------------------------------------------
    // Notifications
    // -------------------------------------------------------------------------

    /// Listen for notifications on `target`, or on every target when `None`.
    pub fn on<F>(&mut self, target: Option<NodeId>, handler: F) -> ListenerId
    where
        F: FnMut(&Notification) -> Flow + Send + 'static,
    {
        self.listeners.add(target, handler)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Dispatch to listeners, then to the tooltip layer unless cancelled.
    pub fn notify(&mut self, dom: &mut dyn Dom, notification: Notification) -> Flow {
        debug!("notify {notification}");
        let flow = self.listeners.dispatch(&notification);
        if flow == Flow::Continue {
            self.display(dom, notification);
        }
        flow
    }

    fn display(&mut self, dom: &mut dyn Dom, notification: Notification) {
        match notification {
            Notification::Ok { target } if self.forms.contains_key(&target) => {
                self.clear_fields(dom, target);
            }
            Notification::Ok { target } => self.tooltips.hide(dom, target),
            Notification::Fail {
                target,
                failure: Failure::Field(errors),
                batch,
            } => self.tooltips.show(dom, target, &errors, batch),
            Notification::Fail {
                target,
                failure: Failure::Form(aggregate),
                ..
            } => self.fan_out(dom, target, &aggregate),
        }
    }

    /// Re-dispatch a form failure to each invalid field as a batch.
    fn fan_out(&mut self, dom: &mut dyn Dom, form: NodeId, aggregate: &Aggregate) {
        self.tooltips.begin_batch();
        for entry in aggregate.fields() {
            let node = entry.node.or_else(|| {
                named_descendants(&*dom, form)
                    .into_iter()
                    .find(|&id| field_name(&*dom, id) == Some(entry.name.as_str()))
            });
            let Some(node) = node else {
                trace!("no control named '{}' in {form}", entry.name);
                continue;
            };

            dom.set_attr(node, "aria-invalid", Some("true"));
            if let Some(state) = self.fields.get_mut(&node) {
                state.record(&entry.errors);
            }
            self.notify(
                dom,
                Notification::Fail {
                    target: node,
                    failure: Failure::Field(entry.errors.clone()),
                    batch: true,
                },
            );
        }
    }

    /// After a recovered submit, settle fields still marked invalid.
    fn clear_fields(&mut self, dom: &mut dyn Dom, form: NodeId) {
        for node in named_descendants(&*dom, form) {
            let Some(state) = self.fields.get_mut(&node) else {
                continue;
            };
            if state.state() == ValidityState::Invalid {
                state.record(&[]);
                dom.set_attr(node, "aria-invalid", Some("false"));
                self.tooltips.hide(dom, node);
            }
        }
    }
}

impl std::fmt::Debug for Validation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validation")
            .field("config", &self.config)
            .field("fields", &self.fields.len())
            .field("forms", &self.forms.len())
            .field("listeners", &self.listeners)
            .field("validators", &self.validators)
            .finish_non_exhaustive()
    }
}
