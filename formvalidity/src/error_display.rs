use formdom::{Align, Placement};
use serde::Deserialize;

/// Where to display validation errors for a control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorDisplay {
    /// Show the error in a popover below the control (default).
    #[default]
    Below,
    /// Show the error in a popover to the right of the control.
    Inline,
    /// Don't display error popovers - notifications still fire.
    None,
}

impl ErrorDisplay {
    /// Popover placement for this mode, `None` when popovers are disabled.
    pub fn placement(self) -> Option<(Placement, Align)> {
        match self {
            Self::Below => Some((Placement::Bottom, Align::Start)),
            Self::Inline => Some((Placement::Right, Align::Center)),
            Self::None => None,
        }
    }
}
