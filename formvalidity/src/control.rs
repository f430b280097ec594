//! Control classification.

use formdom::NodeId;

use crate::dom::Dom;

/// Control types that never contribute validity to a form.
pub const EXCLUDED_TYPES: [&str; 7] = [
    "file", "image", "submit", "fieldset", "reset", "button", "hidden",
];

/// Effective control type of a node, following the HTML `type` property:
/// inputs default to `text`, selects report `select-one`/`select-multiple`,
/// buttons default to `submit`. `None` for nodes that are not controls.
pub fn control_type(dom: &dyn Dom, node: NodeId) -> Option<String> {
    let declared = || {
        dom.attr(node, "type")
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
    };

    match dom.tag(node)? {
        "input" => Some(declared().unwrap_or_else(|| "text".to_string())),
        "textarea" => Some("textarea".to_string()),
        "select" if dom.has_attr(node, "multiple") => Some("select-multiple".to_string()),
        "select" => Some("select-one".to_string()),
        "button" => Some(declared().unwrap_or_else(|| "submit".to_string())),
        "fieldset" => Some("fieldset".to_string()),
        _ => None,
    }
}

/// Category of a form control, fixed when validity state is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// Text-like inputs (text, number, email, url, tel, password, ...) and textareas.
    TextLike,
    Checkbox,
    Radio,
    /// `select-one` / `select-multiple`: only overrides and custom validators apply.
    Select,
    /// Buttons, file/hidden inputs, fieldsets: never aggregated, no built-in check.
    Excluded,
}

impl ControlKind {
    pub fn classify(dom: &dyn Dom, node: NodeId) -> Option<Self> {
        control_type(dom, node).map(|t| Self::from_type(&t))
    }

    pub fn from_type(control_type: &str) -> Self {
        match control_type {
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "select-one" | "select-multiple" => Self::Select,
            t if EXCLUDED_TYPES.contains(&t) => Self::Excluded,
            _ => Self::TextLike,
        }
    }

    /// Whether controls of this kind take part in form aggregation.
    pub fn contributes(self) -> bool {
        self != Self::Excluded
    }

    /// Checkboxes and radios revalidate on click rather than on input.
    pub fn is_checkable(self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }
}
