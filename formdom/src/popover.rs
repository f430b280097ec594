use std::time::Duration;

/// Side of the anchor a popover is placed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Placement {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

/// Alignment of the popover along the anchor edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
}

/// A floating element anchored to a node.
///
/// The document does not lay anything out; it only records what the host
/// was asked to display so callers (and tests) can observe it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Popover {
    pub content: String,
    pub placement: Placement,
    pub align: Align,
    pub visible: bool,
    /// Delay requested before the popover becomes visible.
    pub delay: Duration,
}

impl Popover {
    pub fn new(content: impl Into<String>, placement: Placement, align: Align) -> Self {
        Self {
            content: content.into(),
            placement,
            align,
            visible: false,
            delay: Duration::ZERO,
        }
    }
}
