use std::fmt;
use std::str::FromStr;

use crate::clock::Clock;
use crate::error::*;
use crate::month::MonthKey;
use crate::resolve::resolve;
use crate::store::{Store, StoreMapping, CURRENT_MONTH_KEY};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Prev => "prev",
            Direction::Next => "next",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "prev" => Ok(Direction::Prev),
            "next" => Ok(Direction::Next),
            _ => Err(Error::new(
                ErrorKind::ActionParse,
                &format!("'{}' is neither 'prev' nor 'next'", s),
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: MonthKey,
    pub to: MonthKey,
    pub committed: bool,
}

impl Transition {
    /// The month shown after this transition.
    pub fn shown(&self) -> MonthKey {
        if self.committed {
            self.to
        } else {
            self.from
        }
    }
}

/// The month one step away from `current`. Nothing is persisted.
pub fn propose(current: &MonthKey, direction: Direction) -> MonthKey {
    match direction {
        Direction::Prev => current.pred(),
        Direction::Next => current.succ(),
    }
}

/// Steps the persisted month in `direction`.
///
/// The step is only committed if the target month has an image of its own;
/// the fallback image does not count. A blocked step leaves the store
/// untouched.
pub fn navigate<S: Store + ?Sized>(
    store: &mut S,
    clock: &dyn Clock,
    direction: Direction,
) -> Result<Transition> {
    let raw = store.get(CURRENT_MONTH_KEY)?;
    let from = match raw.as_deref() {
        Some(raw) => MonthKey::parse_or_now(raw, clock),
        None => MonthKey::now(clock),
    };
    let to = propose(&from, direction);

    let open = to != from && resolve(&to, &StoreMapping::new(&*store), None).is_specific();
    if !open {
        log::debug!("{} from {} blocked: no image for {}", direction, from, to);
        return Ok(Transition {
            from,
            to,
            committed: false,
        });
    }

    let committed = store.compare_and_swap(CURRENT_MONTH_KEY, raw.as_deref(), &to.to_string())?;
    if committed {
        log::info!("Moved widget from {} to {}", from, to);
    } else {
        log::warn!(
            "{} from {} dropped: current month changed concurrently",
            direction,
            from
        );
    }

    Ok(Transition {
        from,
        to,
        committed,
    })
}
