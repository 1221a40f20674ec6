use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, Months, NaiveDate};
use nom::bytes::complete::take_while_m_n;
use nom::character::complete::char;
use nom::combinator::{all_consuming, map_res};
use nom::sequence::separated_pair;
use nom::IResult;
use std::fmt;
use std::fmt::Write;
use std::str::FromStr;

use crate::clock::Clock;
use crate::error::*;

pub const DEFAULT_LABEL_FORMAT: &str = "%Y/%m";

const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9999;

/// A calendar month with a four digit year, written `YYYY-MM`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (MIN_YEAR..=MAX_YEAR).contains(&year) && (1..=12).contains(&month) {
            Some(MonthKey { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: &NaiveDate) -> Self {
        MonthKey::new(date.year(), date.month()).unwrap_or_else(|| {
            if date.year() < MIN_YEAR {
                MonthKey::first()
            } else {
                MonthKey::last()
            }
        })
    }

    pub fn now(clock: &dyn Clock) -> Self {
        MonthKey::from_date(&clock.today())
    }

    /// Parses `s` strictly, falling back to the clock's current month on any
    /// malformed input.
    pub fn parse_or_now(s: &str, clock: &dyn Clock) -> Self {
        match s.parse::<MonthKey>() {
            Ok(key) => key,
            Err(err) => {
                log::debug!("'{}' is not a month key ({}), using current month", s, err);
                MonthKey::now(clock)
            }
        }
    }

    fn first() -> Self {
        MonthKey {
            year: MIN_YEAR,
            month: 1,
        }
    }

    fn last() -> Self {
        MonthKey {
            year: MAX_YEAR,
            month: 12,
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// The following month, or `self` at the end of the representable range.
    pub fn succ(&self) -> Self {
        self.first_day()
            .checked_add_months(Months::new(1))
            .and_then(|date| MonthKey::new(date.year(), date.month()))
            .unwrap_or(*self)
    }

    /// The preceding month, or `self` at the start of the representable range.
    pub fn pred(&self) -> Self {
        self.first_day()
            .checked_sub_months(Months::new(1))
            .and_then(|date| MonthKey::new(date.year(), date.month()))
            .unwrap_or(*self)
    }

    /// Display text for the month, rendered with a strftime pattern.
    pub fn label(&self, format: &str) -> String {
        if !is_valid_label_format(format) {
            return self.to_string();
        }

        let mut label = String::new();
        match write!(label, "{}", self.first_day().format(format)) {
            Ok(()) => label,
            Err(_) => self.to_string(),
        }
    }
}

/// Whether `format` renders a date. Time and zone specifiers are rejected
/// because a month has neither.
pub fn is_valid_label_format(format: &str) -> bool {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return false;
    }

    NaiveDate::from_ymd_opt(2000, 1, 1).map_or(false, |date| {
        let mut sample = String::new();
        write!(sample, "{}", date.format(format)).is_ok()
    })
}

fn digits<'a>(n: usize) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    take_while_m_n(n, n, |c: char| c.is_ascii_digit())
}

fn month_key(input: &str) -> IResult<&str, (i32, u32)> {
    all_consuming(separated_pair(
        map_res(digits(4), |s: &str| s.parse::<i32>()),
        char('-'),
        map_res(digits(2), |s: &str| s.parse::<u32>()),
    ))(input)
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (_, (year, month)) = month_key(s)?;

        MonthKey::new(year, month).ok_or_else(|| {
            Error::new(
                ErrorKind::MonthKeyParse,
                &format!("'{}' has no month {}", s, month),
            )
        })
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
