//! Externally injected error state.
//!
//! An override either carries static errors or a closure that computes them
//! from the live DOM when validity is requested. A non-empty override wins
//! over the built-in checks.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use formdom::NodeId;
use serde_json::Value;

use crate::dom::Dom;
use crate::error::ConfigError;

type ComputeField = dyn Fn(&dyn Dom, NodeId) -> Vec<String> + Send + Sync;
type ComputeForm = dyn Fn(&dyn Dom, NodeId) -> OverrideErrors + Send + Sync;

fn json_kind(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
    .to_string()
}

fn json_messages(value: Value) -> Option<Vec<String>> {
    match value {
        Value::String(message) => Some(vec![message]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(message) => Some(message),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

// ============================================================================
// Field overrides
// ============================================================================

/// Override for a single control.
#[derive(Clone)]
pub enum FieldOverride {
    Errors(Vec<String>),
    /// Called with the DOM and the field node on every computation.
    Computed(Arc<ComputeField>),
}

impl FieldOverride {
    pub fn errors<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Errors(errors.into_iter().map(Into::into).collect())
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&dyn Dom, NodeId) -> Vec<String> + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// Build from a loosely typed value: `null` clears, a string becomes a
    /// one-element list, an array must hold only strings.
    pub fn from_json(value: Value) -> Result<Option<Self>, ConfigError> {
        if value.is_null() {
            return Ok(None);
        }
        let found = json_kind(&value);
        json_messages(value)
            .map(|errors| Some(Self::Errors(errors)))
            .ok_or(ConfigError::InvalidOverride {
                scope: "field",
                expected: "a string, an array of strings or null",
                found,
            })
    }

    pub(crate) fn resolve(&self, dom: &dyn Dom, node: NodeId) -> Vec<String> {
        match self {
            Self::Errors(errors) => errors.clone(),
            Self::Computed(compute) => compute(dom, node),
        }
    }
}

impl fmt::Debug for FieldOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Errors(errors) => f.debug_tuple("Errors").field(errors).finish(),
            Self::Computed(_) => write!(f, "Computed(...)"),
        }
    }
}

impl From<&str> for FieldOverride {
    fn from(message: &str) -> Self {
        Self::Errors(vec![message.to_string()])
    }
}

impl From<String> for FieldOverride {
    fn from(message: String) -> Self {
        Self::Errors(vec![message])
    }
}

impl From<Vec<String>> for FieldOverride {
    fn from(errors: Vec<String>) -> Self {
        Self::Errors(errors)
    }
}

impl From<Vec<&str>> for FieldOverride {
    fn from(errors: Vec<&str>) -> Self {
        Self::errors(errors)
    }
}

// ============================================================================
// Form overrides
// ============================================================================

/// Errors injected at form level.
///
/// `form` holds messages not tied to any control; `fields` maps a field name
/// to the errors that replace that field's own computation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideErrors {
    pub form: Vec<String>,
    pub fields: BTreeMap<String, Vec<String>>,
}

impl OverrideErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            form: errors.into_iter().map(Into::into).collect(),
            fields: BTreeMap::new(),
        }
    }

    pub fn field<I, S>(mut self, name: impl Into<String>, errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .insert(name.into(), errors.into_iter().map(Into::into).collect());
        self
    }
}

/// Override for a whole form.
#[derive(Clone)]
pub enum FormOverride {
    Errors(OverrideErrors),
    /// Called with the DOM and the form node on every aggregation.
    Computed(Arc<ComputeForm>),
}

impl FormOverride {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&dyn Dom, NodeId) -> OverrideErrors + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// Build from a loosely typed value: `null` clears, a string or an array
    /// of strings becomes form-level errors, an object maps field names to a
    /// string or an array of strings.
    pub fn from_json(value: Value) -> Result<Option<Self>, ConfigError> {
        let invalid = |found: String| ConfigError::InvalidOverride {
            scope: "form",
            expected: "a string, an array of strings, an object of field errors or null",
            found,
        };

        match value {
            Value::Null => Ok(None),
            Value::Object(entries) => {
                let mut errors = OverrideErrors::new();
                for (name, value) in entries {
                    let found = format!("{} for field '{name}'", json_kind(&value));
                    let messages = json_messages(value).ok_or_else(|| invalid(found))?;
                    errors.fields.insert(name, messages);
                }
                Ok(Some(Self::Errors(errors)))
            }
            value => {
                let found = json_kind(&value);
                json_messages(value)
                    .map(|messages| Some(Self::Errors(OverrideErrors::form(messages))))
                    .ok_or_else(|| invalid(found))
            }
        }
    }

    pub(crate) fn resolve(&self, dom: &dyn Dom, node: NodeId) -> OverrideErrors {
        match self {
            Self::Errors(errors) => errors.clone(),
            Self::Computed(compute) => compute(dom, node),
        }
    }
}

impl fmt::Debug for FormOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Errors(errors) => f.debug_tuple("Errors").field(errors).finish(),
            Self::Computed(_) => write!(f, "Computed(...)"),
        }
    }
}

impl From<OverrideErrors> for FormOverride {
    fn from(errors: OverrideErrors) -> Self {
        Self::Errors(errors)
    }
}

impl From<&str> for FormOverride {
    fn from(message: &str) -> Self {
        Self::Errors(OverrideErrors::form([message]))
    }
}

impl From<String> for FormOverride {
    fn from(message: String) -> Self {
        Self::Errors(OverrideErrors::form([message]))
    }
}

impl From<Vec<String>> for FormOverride {
    fn from(errors: Vec<String>) -> Self {
        Self::Errors(OverrideErrors::form(errors))
    }
}

impl From<BTreeMap<String, Vec<String>>> for FormOverride {
    fn from(fields: BTreeMap<String, Vec<String>>) -> Self {
        Self::Errors(OverrideErrors {
            form: Vec::new(),
            fields,
        })
    }
}
