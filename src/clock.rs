use chrono::{Local, NaiveDate, Utc};
use serde_with::DeserializeFromStr;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::*;

/// Source of the real-world date the month codec falls back to.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

#[derive(Clone, Debug, Default, DeserializeFromStr, PartialEq)]
pub enum Zone {
    #[default]
    Local,
    Iana(chrono_tz::Tz),
}

impl FromStr for Zone {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let lowercase = s.to_lowercase();

        if matches!(lowercase.as_str(), "localtime" | "local") {
            Ok(Zone::Local)
        } else if let Ok(tz) = s.parse::<chrono_tz::Tz>() {
            Ok(Zone::Iana(tz))
        } else {
            Err(Error::new(
                ErrorKind::TimezoneError,
                &format!("Timezone '{}' not recognized", s),
            ))
        }
    }
}

impl Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Zone::Local => write!(f, "local"),
            Zone::Iana(tz) => write!(f, "{}", tz.name()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SystemClock {
    zone: Zone,
}

impl SystemClock {
    pub fn new(zone: Zone) -> Self {
        SystemClock { zone }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        match &self.zone {
            Zone::Local => Local::now().date_naive(),
            Zone::Iana(tz) => Utc::now().with_timezone(tz).date_naive(),
        }
    }
}

/// A clock stuck on one date.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}
