//! The `YYYY-MM` month filter used by the transaction list and the summary.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Month};

use crate::Error;

/// A calendar month in a specific year, written as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: Month,
}

impl YearMonth {
    /// Create a month from a year and a calendar month.
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The month that contains `date`.
    pub fn from_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month within the year.
    pub fn month(&self) -> Month {
        self.month
    }

    /// The first day of the month.
    pub fn first_day(&self) -> Date {
        Date::from_calendar_date(self.year, self.month, 1).unwrap_or(Date::MIN)
    }

    /// The last day of the month.
    pub fn last_day(&self) -> Date {
        let (next_year, next_month) = match self.month {
            Month::December => (self.year + 1, Month::January),
            month => (self.year, month.next()),
        };

        Date::from_calendar_date(next_year, next_month, 1)
            .ok()
            .and_then(|date| date.previous_day())
            .unwrap_or(Date::MAX)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    /// Parse a month like "2024-03".
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidMonth] if the string is not a four digit year
    /// followed by a dash and a two digit month between 01 and 12.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidMonth(text.to_owned());

        let (raw_year, raw_month) = text.split_once('-').ok_or_else(invalid)?;

        let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if raw_year.len() != 4 || raw_month.len() != 2 || !is_digits(raw_year) || !is_digits(raw_month)
        {
            return Err(invalid());
        }

        let year: i32 = raw_year.parse().map_err(|_| invalid())?;
        let month: u8 = raw_month.parse().map_err(|_| invalid())?;
        let month = Month::try_from(month).map_err(|_| invalid())?;

        Ok(Self { year, month })
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month as u8)
    }
}

impl Serialize for YearMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse an optional month query parameter.
///
/// Blank values are treated the same as a missing parameter.
pub fn parse_optional_month(raw_month: Option<&str>) -> Result<Option<YearMonth>, Error> {
    match raw_month.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse().map(Some),
    }
}
