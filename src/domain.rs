//! Domain models for graduation planning.
//!
//! This module contains the core domain types: courses and credits, the
//! immutable requirement tree, the student's plan, the evaluation engine, and
//! the edits that produce new plans.

mod catalog;
pub use catalog::Catalog;

mod config;
pub use config::{Config, ConfigError};

/// Courses, their codes, and registration statuses.
pub mod course;
pub use course::{Course, CourseCode, InvalidCourseCode, RegistrationStatus, Threshold};

/// Credit ranges and credit counts.
pub mod credits;
pub use credits::{CreditsRange, InvalidCreditsRange, RegisteredCreditsCounts, ValidationError};

pub mod edit;
pub use edit::{
    Decision, EditError, OthersCountInput, PendingReassignment, Reassignment,
    apply_course_click, apply_course_reassignment, apply_course_status_change,
    apply_others_count_change, apply_selection_change,
};

pub mod engine;
pub use engine::{Assignment, Evaluator, Summary, Tally};

pub mod plan;
pub use plan::Plan;

pub mod requirement;
pub use requirement::{
    CompositeRequirement, CourseRequirement, Requirement, RequirementId, SelectionRequirement,
};

pub mod tree;
pub use tree::{ConfigurationError, RequirementTree};

#[cfg(test)]
pub(crate) mod fixtures;
