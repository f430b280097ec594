pub mod document;
pub mod element;
pub mod event;
pub mod popover;
pub mod selector;

pub use document::{Document, DomError, Mutation, NodeId};
pub use element::Element;
pub use event::Event;
pub use popover::{Align, Placement, Popover};
pub use selector::{Selector, SelectorError};
