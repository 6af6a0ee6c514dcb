use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::course::Threshold;

/// An inclusive range of credits a requirement asks for.
///
/// A single required number is represented as `min == max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CreditsRange {
    min: u32,
    max: u32,
}

impl CreditsRange {
    /// Creates a range, checking that `min <= max`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCreditsRange`] if `min` is greater than `max`.
    pub const fn new(min: u32, max: u32) -> Result<Self, InvalidCreditsRange> {
        if min > max {
            return Err(InvalidCreditsRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// A range requiring exactly `credits`.
    #[must_use]
    pub const fn exact(credits: u32) -> Self {
        Self {
            min: credits,
            max: credits,
        }
    }

    /// The number of credits needed to satisfy the requirement.
    #[must_use]
    pub const fn min(&self) -> u32 {
        self.min
    }

    /// The number of credits beyond which extra credits no longer count.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Whether `min == max`.
    #[must_use]
    pub const fn is_exact(&self) -> bool {
        self.min == self.max
    }
}

impl fmt::Display for CreditsRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_exact() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}~{}", self.min, self.max)
        }
    }
}

/// Error returned when a credits range has `min > max`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid credits range: min ({min}) is greater than max ({max})")]
pub struct InvalidCreditsRange {
    min: u32,
    max: u32,
}

/// A pair of credit totals, one per [`Threshold`].
///
/// Every acquired credit is also a registered credit, so `registered >=
/// acquired` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCounts", into = "RawCounts")]
pub struct RegisteredCreditsCounts {
    acquired: u32,
    registered: u32,
}

impl RegisteredCreditsCounts {
    /// Creates a pair of counts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AcquiredExceedsRegistered`] if `acquired >
    /// registered`.
    pub fn new(acquired: u32, registered: u32) -> Result<Self, ValidationError> {
        if acquired > registered {
            return Err(ValidationError::AcquiredExceedsRegistered {
                acquired: i64::from(acquired),
                registered: i64::from(registered),
            });
        }
        Ok(Self {
            acquired,
            registered,
        })
    }

    /// Credits earned.
    #[must_use]
    pub const fn acquired(&self) -> u32 {
        self.acquired
    }

    /// Credits earned or planned.
    #[must_use]
    pub const fn registered(&self) -> u32 {
        self.registered
    }

    /// The count matching `threshold`.
    #[must_use]
    pub const fn get(&self, threshold: Threshold) -> u32 {
        match threshold {
            Threshold::Registered => self.registered,
            Threshold::Acquired => self.acquired,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawCounts {
    acquired: u32,
    registered: u32,
}

impl TryFrom<RawCounts> for RegisteredCreditsCounts {
    type Error = ValidationError;

    fn try_from(raw: RawCounts) -> Result<Self, Self::Error> {
        Self::new(raw.acquired, raw.registered)
    }
}

impl From<RegisteredCreditsCounts> for RawCounts {
    fn from(counts: RegisteredCreditsCounts) -> Self {
        Self {
            acquired: counts.acquired,
            registered: counts.registered,
        }
    }
}

/// Errors in manually entered credit counts.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A count was negative.
    #[error("credit counts must not be negative (got {0})")]
    Negative(i64),

    /// More credits acquired than registered.
    #[error("acquired credits ({acquired}) exceed registered credits ({registered})")]
    AcquiredExceedsRegistered {
        /// Credits acquired.
        acquired: i64,
        /// Credits registered, including acquired ones.
        registered: i64,
    },

    /// A count does not fit in the supported range.
    #[error("credit count {0} is too large")]
    TooLarge(i64),
}
