//! Prelude module for convenient imports.
//!
//! ```ignore
//! use formvalidity::prelude::*;
//! ```

// Engine and configuration
pub use crate::config::{Messages, NotifyPolicy, OverrideMode, ValidityConfig};
pub use crate::engine::Validation;
pub use crate::error::ConfigError;
pub use crate::error_display::ErrorDisplay;

// Results and notifications
pub use crate::form::Aggregate;
pub use crate::notify::{Flow, Notification};
pub use crate::overrides::{FieldOverride, FormOverride, OverrideErrors};
pub use crate::registry::{ValidatorRegistration, ValidatorRegistry};

// Host DOM
pub use crate::dom::Dom;
pub use formdom::{Document, Element, Event, NodeId};
