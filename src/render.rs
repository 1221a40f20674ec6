use derive_more::{Display, From};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::*;
use crate::month::MonthKey;
use crate::nav::Direction;

/// Identifies one placed widget.
#[derive(Clone, Copy, Debug, Display, From, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub u32);

/// What a tap on a control should do.
///
/// Values are compared structurally: the prev and next controls of one
/// instance, and the controls of two different instances, never compare
/// equal, and neither do their textual forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionRef {
    Navigate {
        instance: InstanceId,
        direction: Direction,
    },
    /// Opens the companion app. Shared by all instances.
    Launch,
}

const NAVIGATE_TAG: &str = "nav";
const LAUNCH_TAG: &str = "launch";

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionRef::Navigate {
                instance,
                direction,
            } => write!(f, "{}:{}:{}", NAVIGATE_TAG, direction, instance),
            ActionRef::Launch => write!(f, "{}", LAUNCH_TAG),
        }
    }
}

impl FromStr for ActionRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::new(ErrorKind::ActionParse, &format!("'{}'", s));

        let mut parts = s.split(':');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(LAUNCH_TAG), None, None, None) => Ok(ActionRef::Launch),
            (Some(NAVIGATE_TAG), Some(direction), Some(instance), None) => {
                Ok(ActionRef::Navigate {
                    direction: direction.parse()?,
                    instance: InstanceId(instance.parse::<u32>().map_err(|_| invalid())?),
                })
            }
            _ => Err(invalid()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Controls {
    pub prev: ActionRef,
    pub next: ActionRef,
}

/// Everything one widget instance needs to draw itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderDescriptor {
    pub label: String,
    /// `None` leaves the image view as it is.
    pub image_path: Option<String>,
    pub controls: Controls,
    pub root_action: ActionRef,
}

pub fn build(
    instance: InstanceId,
    month: &MonthKey,
    image_path: Option<&str>,
    label_format: &str,
) -> RenderDescriptor {
    RenderDescriptor {
        label: month.label(label_format),
        image_path: image_path.map(str::to_owned),
        controls: Controls {
            prev: ActionRef::Navigate {
                instance,
                direction: Direction::Prev,
            },
            next: ActionRef::Navigate {
                instance,
                direction: Direction::Next,
            },
        },
        root_action: ActionRef::Launch,
    }
}

/// Turns an [`ActionRef`] into whatever the host binds to a control.
pub trait Activation {
    type Token;

    fn pending(&mut self, action: &ActionRef) -> Self::Token;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::month::DEFAULT_LABEL_FORMAT;
    use std::collections::HashSet;

    #[test]
    fn descriptor_without_image() {
        let month: MonthKey = "2025-03".parse().unwrap();
        let descriptor = build(InstanceId(4), &month, None, DEFAULT_LABEL_FORMAT);

        assert_eq!(descriptor.label, "2025/03");
        assert_eq!(descriptor.image_path, None);
        assert_eq!(
            descriptor.controls.prev,
            ActionRef::Navigate {
                instance: InstanceId(4),
                direction: Direction::Prev
            }
        );
        assert_eq!(descriptor.root_action, ActionRef::Launch);
    }

    #[test]
    fn control_identities_are_disjoint() {
        let month: MonthKey = "2025-03".parse().unwrap();
        let mut seen = HashSet::new();

        // Instance ids that an offset based scheme would mix up.
        for id in [0, 1, 2, 10000, 10001, 20000] {
            let descriptor = build(InstanceId(id), &month, Some("a.png"), "%Y");
            assert!(seen.insert(descriptor.controls.prev.to_string()));
            assert!(seen.insert(descriptor.controls.next.to_string()));
        }
        assert!(!seen.contains(&ActionRef::Launch.to_string()));
    }

    #[test]
    fn action_ref_text() {
        let action = ActionRef::Navigate {
            instance: InstanceId(12),
            direction: Direction::Next,
        };
        assert_eq!(action.to_string(), "nav:next:12");
        assert_eq!("nav:next:12".parse::<ActionRef>().unwrap(), action);
        assert_eq!("launch".parse::<ActionRef>().unwrap(), ActionRef::Launch);

        for bad in ["", "nav", "nav:next", "nav:up:1", "nav:next:-1", "nav:next:1:2", "launch:1"] {
            assert!(bad.parse::<ActionRef>().is_err(), "'{}'", bad);
        }
    }

    struct Codes(Vec<ActionRef>);

    impl Activation for Codes {
        type Token = usize;

        fn pending(&mut self, action: &ActionRef) -> usize {
            match self.0.iter().position(|a| a == action) {
                Some(code) => code,
                None => {
                    self.0.push(*action);
                    self.0.len() - 1
                }
            }
        }
    }

    #[test]
    fn activation_tokens_are_stable() {
        let month: MonthKey = "2025-03".parse().unwrap();
        let mut codes = Codes(Vec::new());

        let first = build(InstanceId(1), &month, None, "%Y");
        let second = build(InstanceId(2), &month, None, "%Y");
        let prev = codes.pending(&first.controls.prev);

        assert_ne!(prev, codes.pending(&first.controls.next));
        assert_ne!(prev, codes.pending(&second.controls.prev));
        assert_eq!(prev, codes.pending(&first.controls.prev));
    }
}
