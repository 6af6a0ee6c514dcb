//! Graduation requirement planning
//!
//! A student's courses are checked against a tree of graduation
//! requirements. Courses are marked as registered or acquired and counted
//! toward one leaf requirement each; every node of the tree reports whether it
//! is currently satisfied.

pub mod domain;
pub use domain::{
    Catalog, ConfigurationError, Config, Course, CourseCode, CreditsRange, EditError, Evaluator,
    Plan, RegisteredCreditsCounts, RegistrationStatus, Requirement, RequirementId,
    RequirementTree, Threshold,
};

/// Loading static inputs and persisting plans.
pub mod storage;
pub use storage::{Directory, ResolutionError, Snapshot};
