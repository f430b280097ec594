//! Custom validators.
//!
//! A custom validator is a selector-scoped check returning an optional
//! message. Validators can be registered at runtime or declared statically
//! with `inventory`:
//!
//! ```ignore
//! fn no_admin(dom: &dyn Dom, node: NodeId) -> Option<String> {
//!     (dom.value(node) == "admin").then(|| "reserved name".to_string())
//! }
//!
//! inventory::submit! {
//!     ValidatorRegistration::new("input[name=username]", no_admin)
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use formdom::{NodeId, Selector};
use log::debug;

use crate::dom::Dom;
use crate::error::ConfigError;

type Check = dyn Fn(&dyn Dom, NodeId) -> Option<String> + Send + Sync;

/// Static validator registration entry for inventory.
pub struct ValidatorRegistration {
    /// Selector the validator applies to.
    pub selector: &'static str,
    /// The check; `Some(message)` means invalid.
    pub check: fn(&dyn Dom, NodeId) -> Option<String>,
}

impl ValidatorRegistration {
    /// Create a new validator registration.
    pub const fn new(selector: &'static str, check: fn(&dyn Dom, NodeId) -> Option<String>) -> Self {
        Self { selector, check }
    }
}

inventory::collect!(ValidatorRegistration);

/// Get all statically registered validators.
pub fn registered_validators() -> impl Iterator<Item = &'static ValidatorRegistration> {
    inventory::iter::<ValidatorRegistration>()
}

struct Entry {
    selector: Selector,
    check: Arc<Check>,
}

/// Selector-keyed custom validators, at most one per selector.
#[derive(Default)]
pub struct ValidatorRegistry {
    entries: Vec<Entry>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every `inventory`-submitted validator.
    pub fn from_inventory() -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for registration in registered_validators() {
            registry.register(registration.selector, registration.check)?;
        }
        Ok(registry)
    }

    /// Register a validator for `selector`.
    ///
    /// Fails if the selector does not parse or already has a validator.
    pub fn register<F>(&mut self, selector: &str, check: F) -> Result<(), ConfigError>
    where
        F: Fn(&dyn Dom, NodeId) -> Option<String> + Send + Sync + 'static,
    {
        let selector = Selector::parse(selector)?;
        if self
            .entries
            .iter()
            .any(|entry| entry.selector.as_str() == selector.as_str())
        {
            return Err(ConfigError::DuplicateValidator(selector.to_string()));
        }

        debug!("registered validator for '{selector}'");
        self.entries.push(Entry {
            selector,
            check: Arc::new(check),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Messages from every validator whose selector matches `node`, in
    /// registration order.
    pub fn check(&self, dom: &dyn Dom, node: NodeId) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| dom.matches(node, &entry.selector))
            .filter_map(|entry| (entry.check)(dom, node))
            .collect()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| entry.selector.as_str()))
            .finish()
    }
}
