//! Form validity engine.
//!
//! Attaches validity state to form controls and forms of a host DOM,
//! computes per-field errors and per-form aggregates, emits `Ok`/`Fail`
//! notifications on state changes and drives error popovers.
//!
//! ```ignore
//! use formvalidity::prelude::*;
//!
//! let mut doc = Document::new();
//! let form = doc.mount(Element::form().child(Element::input("email").name("email").required()));
//!
//! let mut validation = Validation::default();
//! validation.sync(&mut doc);
//!
//! if validation.handle_event(&mut doc, &Event::Submit { target: form }).is_cancel() {
//!     // submission blocked, popovers are showing
//! }
//! ```

pub mod config;
pub mod control;
pub mod dom;
pub mod engine;
pub mod error;
pub mod error_display;
pub mod extension;
pub mod field;
pub mod form;
pub mod notify;
pub mod overrides;
pub mod patterns;
pub mod prelude;
pub mod registry;
pub mod tooltip;

pub use config::{Messages, NotifyPolicy, OverrideMode, TooltipConfig, ValidityConfig};
pub use control::ControlKind;
pub use dom::Dom;
pub use engine::Validation;
pub use error::{ConfigError, PatternError};
pub use error_display::ErrorDisplay;
pub use extension::{Behavior, Extension};
pub use field::FieldValidity;
pub use form::{Aggregate, FieldErrors, FormValidity};
pub use notify::{Failure, Flow, ListenerId, Notification};
pub use overrides::{FieldOverride, FormOverride, OverrideErrors};
pub use patterns::PatternRegistry;
pub use registry::{ValidatorRegistration, ValidatorRegistry};

// Re-exported for `inventory::submit!` in downstream crates.
pub use inventory;
