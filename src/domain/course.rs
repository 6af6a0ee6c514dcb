use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

/// The catalog code of a course, e.g. `GB10001`.
///
/// Course codes are the stable identity of a course. They are used as map
/// keys in a [`Plan`](crate::Plan) and in persisted snapshots.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseCode(NonEmptyString);

impl CourseCode {
    /// Creates a new `CourseCode` from a string.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCourseCode`] if the trimmed string is empty or
    /// contains whitespace.
    pub fn new(s: impl Into<String>) -> Result<Self, InvalidCourseCode> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.chars().any(char::is_whitespace) {
            return Err(InvalidCourseCode(s));
        }
        NonEmptyString::new(trimmed.to_string())
            .map(Self)
            .map_err(|_| InvalidCourseCode(s))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for CourseCode {
    type Error = InvalidCourseCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for CourseCode {
    type Error = InvalidCourseCode;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CourseCode> for String {
    fn from(code: CourseCode) -> Self {
        code.as_str().to_string()
    }
}

impl FromStr for CourseCode {
    type Err = InvalidCourseCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for CourseCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for CourseCode {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a usable course code.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid course code '{0}': must be non-empty and contain no whitespace")]
pub struct InvalidCourseCode(String);

/// A course from the static catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    /// Unique catalog code.
    pub code: CourseCode,
    /// Human readable title.
    pub title: String,
    /// Number of credits the course is worth. Always positive.
    pub credits: u32,
}

/// How far a course has progressed toward completion.
///
/// The ordering is meaningful: an acquired course is also registered.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    /// Not taken and not planned.
    #[default]
    Unregistered,
    /// Planned or currently being taken.
    Registered,
    /// Completed, credits earned.
    Acquired,
}

impl RegistrationStatus {
    /// Whether this status counts toward totals computed at `threshold`.
    #[must_use]
    pub fn satisfies(self, threshold: Threshold) -> bool {
        self >= Self::from(threshold)
    }

    /// The status reached by clicking a course once more.
    ///
    /// Cycles `Unregistered -> Registered -> Acquired -> Unregistered`.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Unregistered => Self::Registered,
            Self::Registered => Self::Acquired,
            Self::Acquired => Self::Unregistered,
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Unregistered => "unregistered",
            Self::Registered => "registered",
            Self::Acquired => "acquired",
        })
    }
}

/// The status level against which credit totals are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Threshold {
    /// Count registered and acquired courses.
    Registered,
    /// Count acquired courses only.
    Acquired,
}

impl Threshold {
    /// Both thresholds, loosest first.
    pub const ALL: [Self; 2] = [Self::Registered, Self::Acquired];
}

impl From<Threshold> for RegistrationStatus {
    fn from(threshold: Threshold) -> Self {
        match threshold {
            Threshold::Registered => Self::Registered,
            Threshold::Acquired => Self::Acquired,
        }
    }
}
