//! Shared traits and the billing-period value type.

use std::fmt;
use std::str::FromStr;

use serde::{de::Deserializer, ser::Serializer, Deserialize, Serialize};

/// Exposes a stable identifier for entities kept in a condominium snapshot.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Supplies a common contract for retrieving monetary amounts in the
/// smallest currency unit.
pub trait Amounted {
    fn amount(&self) -> i64;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// A calendar month in the billing timeline, canonically written `YYYY-MM`.
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns the period immediately after this one.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Returns the period immediately before this one.
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (year, month) = value
            .split_once('-')
            .ok_or_else(|| PeriodError::InvalidFormat(value.to_owned()))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(PeriodError::InvalidFormat(value.to_owned()));
        }
        let year: i32 = year
            .parse()
            .map_err(|_| PeriodError::InvalidFormat(value.to_owned()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| PeriodError::InvalidFormat(value.to_owned()))?;
        Period::new(year, month)
    }
}

impl Serialize for Period {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Errors that can occur when constructing [`Period`] values.
pub enum PeriodError {
    InvalidFormat(String),
    MonthOutOfRange(u32),
}

impl fmt::Display for PeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodError::InvalidFormat(raw) => {
                write!(f, "period `{}` is not in YYYY-MM format", raw)
            }
            PeriodError::MonthOutOfRange(month) => {
                write!(f, "month {} is outside 1..=12", month)
            }
        }
    }
}

impl std::error::Error for PeriodError {}
