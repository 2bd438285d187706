//! Canonical calendar-day key.
//!
//! # Responsibility
//! - Convert calendar dates to and from the `YYYY-MM-DD` storage form.
//!
//! # Invariants
//! - A `DateKey` always names a real calendar day in years 0000..=9999.
//! - String form is zero-padded and exactly 10 characters.

use chrono::{Datelike, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";
const DATE_KEY_LEN: usize = 10;
const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9999;

/// One calendar day, keyed as `YYYY-MM-DD` in completion maps.
///
/// Ordering follows calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Returns the calendar day this key names.
    pub fn date(self) -> NaiveDate {
        self.0
    }
}

/// Error for dates whose year has no four-digit key form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateKeyRangeError {
    pub date: NaiveDate,
}

impl Display for DateKeyRangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "date {} is outside years {MIN_YEAR:04}..={MAX_YEAR}",
            self.date
        )
    }
}

impl Error for DateKeyRangeError {}

impl TryFrom<NaiveDate> for DateKey {
    type Error = DateKeyRangeError;

    fn try_from(value: NaiveDate) -> Result<Self, Self::Error> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&value.year()) {
            return Err(DateKeyRangeError { date: value });
        }
        Ok(Self(value))
    }
}

impl From<DateKey> for NaiveDate {
    fn from(value: DateKey) -> Self {
        value.0
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

/// Error for strings that are not canonical date keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateKeyParseError {
    pub input: String,
}

impl Display for DateKeyParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid date key `{}`; expected YYYY-MM-DD", self.input)
    }
}

impl Error for DateKeyParseError {}

impl FromStr for DateKey {
    type Err = DateKeyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || DateKeyParseError {
            input: value.to_string(),
        };
        // chrono accepts unpadded fields; the storage form must not.
        if value.len() != DATE_KEY_LEN {
            return Err(invalid());
        }
        let date = NaiveDate::parse_from_str(value, DATE_KEY_FORMAT).map_err(|_| invalid())?;
        Self::try_from(date).map_err(|_| invalid())
    }
}
