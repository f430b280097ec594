//! Validity notifications.
//!
//! Listeners observe `Ok`/`Fail` notifications for a specific target or for
//! every target. Any listener returning [`Flow::Cancel`] suppresses the
//! default tooltip display for that notification.

use std::fmt;

use formdom::NodeId;
use log::trace;

use crate::form::Aggregate;

/// Errors carried by a `Fail` notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Field(Vec<String>),
    Form(Aggregate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The target became valid.
    Ok { target: NodeId },
    /// The target failed a check.
    Fail {
        target: NodeId,
        failure: Failure,
        /// Part of a submit revealing several fields at once.
        batch: bool,
    },
}

impl Notification {
    pub fn target(&self) -> NodeId {
        match self {
            Self::Ok { target } | Self::Fail { target, .. } => *target,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }

    /// Field errors of a field `Fail`.
    pub fn errors(&self) -> Option<&[String]> {
        match self {
            Self::Fail {
                failure: Failure::Field(errors),
                ..
            } => Some(errors),
            _ => None,
        }
    }

    /// Aggregate of a form `Fail`.
    pub fn aggregate(&self) -> Option<&Aggregate> {
        match self {
            Self::Fail {
                failure: Failure::Form(aggregate),
                ..
            } => Some(aggregate),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ok { .. } => "ok",
            Self::Fail { .. } => "fail",
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name(), self.target())
    }
}

/// Whether default handling continues after a listener or event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flow {
    #[default]
    Continue,
    Cancel,
}

impl Flow {
    pub fn is_cancel(self) -> bool {
        self == Self::Cancel
    }
}

/// Handle returned by [`Listeners::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Handler = Box<dyn FnMut(&Notification) -> Flow + Send>;

struct Listener {
    id: ListenerId,
    target: Option<NodeId>,
    handler: Handler,
}

#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<Listener>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen on `target`, or on every target when `None`.
    pub fn add<F>(&mut self, target: Option<NodeId>, handler: F) -> ListenerId
    where
        F: FnMut(&Notification) -> Flow + Send + 'static,
    {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.entries.push(Listener {
            id,
            target,
            handler: Box::new(handler),
        });
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|listener| listener.id != id);
        self.entries.len() != before
    }

    /// Drop listeners bound to a detached node.
    pub fn remove_target(&mut self, node: NodeId) {
        self.entries.retain(|listener| listener.target != Some(node));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every listener for the notification's target in registration
    /// order. All listeners run even after one cancels.
    pub fn dispatch(&mut self, notification: &Notification) -> Flow {
        let target = notification.target();
        let mut flow = Flow::Continue;
        for listener in &mut self.entries {
            if listener.target.is_some_and(|t| t != target) {
                continue;
            }
            if (listener.handler)(notification).is_cancel() {
                trace!("{notification} cancelled by listener {:?}", listener.id);
                flow = Flow::Cancel;
            }
        }
        flow
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.entries.len())
            .finish()
    }
}
