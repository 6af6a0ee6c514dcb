//! Requirement nodes.
//!
//! A requirement tree is made of three kinds of node: composites that sum
//! their children, leaves that list the courses which may count toward them,
//! and selections that delegate to one of several alternatives.

use std::fmt;

use non_empty_string::NonEmptyString;
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};

use crate::domain::{
    course::{Course, CourseCode},
    credits::CreditsRange,
};

/// Stable identifier of a requirement node.
///
/// Either given explicitly in the requirement file or derived from the path
/// of titles leading to the node (e.g. `Graduation/Major/Core`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequirementId(NonEmptyString);

impl RequirementId {
    /// Separator between titles in a derived id.
    pub const SEPARATOR: char = '/';

    /// Creates a new `RequirementId`.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyRequirementId`] if the string is empty or blank.
    pub fn new(s: impl Into<String>) -> Result<Self, EmptyRequirementId> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(EmptyRequirementId);
        }
        NonEmptyString::new(s).map(Self).map_err(|_| EmptyRequirementId)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The id of a child of this node with the given title.
    #[must_use]
    pub(crate) fn child(&self, title: &str) -> String {
        format!("{self}{}{title}", Self::SEPARATOR)
    }
}

impl TryFrom<String> for RequirementId {
    type Error = EmptyRequirementId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for RequirementId {
    type Error = EmptyRequirementId;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::str::FromStr for RequirementId {
    type Err = EmptyRequirementId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<RequirementId> for String {
    fn from(id: RequirementId) -> Self {
        id.as_str().to_string()
    }
}

impl fmt::Display for RequirementId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a requirement id is empty.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("requirement ids must not be empty")]
pub struct EmptyRequirementId;

/// A node in the graduation requirement tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Sums the credits of its children.
    Composite(CompositeRequirement),
    /// Counts credits from a list of courses.
    Courses(CourseRequirement),
    /// Delegates to one of several alternatives.
    Selection(SelectionRequirement),
}

impl Requirement {
    /// The node's identifier.
    #[must_use]
    pub const fn id(&self) -> &RequirementId {
        match self {
            Self::Composite(r) => &r.id,
            Self::Courses(r) => &r.id,
            Self::Selection(r) => &r.id,
        }
    }

    /// The node's title.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Composite(r) => &r.title,
            Self::Courses(r) => &r.title,
            Self::Selection(r) => &r.title,
        }
    }

    /// The node's description, if it has one.
    ///
    /// Selections never have a description of their own.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Composite(r) => r.description.as_deref(),
            Self::Courses(r) => r.description.as_deref(),
            Self::Selection(_) => None,
        }
    }

    /// The leaf, if this is a course requirement.
    #[must_use]
    pub const fn as_courses(&self) -> Option<&CourseRequirement> {
        match self {
            Self::Courses(r) => Some(r),
            _ => None,
        }
    }

    /// The selection, if this is a selection requirement.
    #[must_use]
    pub const fn as_selection(&self) -> Option<&SelectionRequirement> {
        match self {
            Self::Selection(r) => Some(r),
            _ => None,
        }
    }

    /// A short lowercase name for the node's kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Composite(_) => "composite",
            Self::Courses(_) => "courses",
            Self::Selection(_) => "selection",
        }
    }
}

/// A requirement whose totals are the sum of its children's totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeRequirement {
    /// Node identifier.
    pub id: RequirementId,
    /// Title.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Credits required.
    pub credits: CreditsRange,
    /// Child nodes, in display order.
    pub children: Vec<RequirementId>,
}

/// A leaf requirement listing the courses that may count toward it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRequirement {
    /// Node identifier.
    pub id: RequirementId,
    /// Title.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Credits required.
    pub credits: CreditsRange,
    /// Courses that may count toward this requirement. Each at most once.
    pub courses: Vec<Course>,
    /// Whether a manually entered count may stand in for unlisted courses.
    pub allows_others: bool,
}

impl CourseRequirement {
    /// Whether `code` is listed by this requirement.
    #[must_use]
    pub fn lists(&self, code: &CourseCode) -> bool {
        self.courses.iter().any(|course| &course.code == code)
    }
}

/// A requirement satisfied by exactly one of several alternatives.
///
/// The first choice is active until another one is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRequirement {
    /// Node identifier.
    pub id: RequirementId,
    /// Title.
    pub title: String,
    /// The alternatives.
    pub choices: NonEmpty<RequirementId>,
}

impl SelectionRequirement {
    /// The choice used when nothing has been selected.
    #[must_use]
    pub const fn default_choice(&self) -> &RequirementId {
        &self.choices.head
    }

    /// Whether `id` is one of this selection's choices.
    #[must_use]
    pub fn offers(&self, id: &RequirementId) -> bool {
        self.choices.iter().any(|choice| choice == id)
    }
}
