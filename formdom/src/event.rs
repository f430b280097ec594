use crate::NodeId;

/// DOM events, each targeted at a live node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// Raw value edit (every keystroke)
    Input { target: NodeId },
    /// Committed value change
    Change { target: NodeId },
    /// Mouse click or keyboard activation
    Click { target: NodeId },
    /// Element gained focus
    Focus { target: NodeId },
    /// Element lost focus
    Blur { target: NodeId },
    /// Form submission request
    Submit { target: NodeId },
    /// Form reset request
    Reset { target: NodeId },
}

impl Event {
    pub fn target(&self) -> NodeId {
        match *self {
            Self::Input { target }
            | Self::Change { target }
            | Self::Click { target }
            | Self::Focus { target }
            | Self::Blur { target }
            | Self::Submit { target }
            | Self::Reset { target } => target,
        }
    }

    /// Event name as used by listeners and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Input { .. } => "input",
            Self::Change { .. } => "change",
            Self::Click { .. } => "click",
            Self::Focus { .. } => "focus",
            Self::Blur { .. } => "blur",
            Self::Submit { .. } => "submit",
            Self::Reset { .. } => "reset",
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name(), self.target())
    }
}
