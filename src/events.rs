use crate::nav::Direction;
use crate::render::{ActionRef, InstanceId};

/// Why the widget is being redrawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Refresh,
    Navigate {
        direction: Direction,
        instance: InstanceId,
    },
}

impl Trigger {
    /// The trigger a tap on `action` causes. Launching the app is left to the
    /// host and does not redraw the widget.
    pub fn from_action(action: &ActionRef) -> Option<Trigger> {
        match *action {
            ActionRef::Navigate {
                instance,
                direction,
            } => Some(Trigger::Navigate {
                direction,
                instance,
            }),
            ActionRef::Launch => None,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            Trigger::Refresh => None,
            Trigger::Navigate { direction, .. } => Some(*direction),
        }
    }
}
