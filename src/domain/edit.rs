//! Edits to a [`Plan`].
//!
//! Every edit reads the current plan and returns a new one; the plan passed
//! in is never modified. Inputs are validated against the tree here, so the
//! [`Evaluator`](crate::Evaluator) only ever sees well-formed plans.
//!
//! Moving a course that already counts toward another requirement needs the
//! student's agreement. Rather than blocking on a prompt, the edit returns a
//! [`PendingReassignment`] which the caller resolves once it has an answer.

use thiserror::Error;

use crate::domain::{
    course::{CourseCode, RegistrationStatus},
    credits::{RegisteredCreditsCounts, ValidationError},
    plan::Plan,
    requirement::{CourseRequirement, RequirementId},
    tree::RequirementTree,
};

/// Errors raised when an edit names something that cannot be edited.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    /// No requirement lists the course.
    #[error("course '{0}' is not listed by any requirement")]
    UnknownCourse(CourseCode),

    /// The requirement does not exist.
    #[error("unknown requirement '{0}'")]
    UnknownRequirement(RequirementId),

    /// The requirement exists but is not a course requirement.
    #[error("requirement '{0}' does not list courses")]
    NotACourseRequirement(RequirementId),

    /// The requirement exists but is not a selection.
    #[error("requirement '{0}' is not a selection")]
    NotASelection(RequirementId),

    /// The course cannot count toward the requirement.
    #[error("course '{code}' is not listed by requirement '{requirement}'")]
    CourseNotListed {
        /// The course.
        code: CourseCode,
        /// The requirement that does not list it.
        requirement: RequirementId,
    },

    /// The chosen requirement is not one of the selection's choices.
    #[error("'{choice}' is not a choice of selection '{selection}'")]
    NotAChoice {
        /// The selection.
        selection: RequirementId,
        /// The rejected choice.
        choice: RequirementId,
    },

    /// The requirement does not accept a manual credit count.
    #[error("requirement '{0}' does not accept a manual credit count")]
    OthersNotAllowed(RequirementId),

    /// The manual credit count is invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// The result of asking to count a course toward a requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Reassignment {
    /// No confirmation was needed; this is the new plan.
    Applied(Plan),
    /// The course counts toward another requirement; ask before moving it.
    NeedsConfirmation(PendingReassignment),
}

/// The student's answer to a confirmation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Move the course.
    Confirm,
    /// Leave the plan as it is.
    Decline,
}

impl From<bool> for Decision {
    fn from(confirmed: bool) -> Self {
        if confirmed { Self::Confirm } else { Self::Decline }
    }
}

/// A course move waiting for confirmation.
///
/// Dropping this value without resolving it is the same as declining.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct PendingReassignment {
    course: CourseCode,
    from: RequirementId,
    to: RequirementId,
    next: Plan,
}

impl PendingReassignment {
    /// The course being moved.
    pub const fn course(&self) -> &CourseCode {
        &self.course
    }

    /// The requirement the course currently counts toward.
    pub const fn current_requirement(&self) -> &RequirementId {
        &self.from
    }

    /// The requirement the course would count toward.
    pub const fn target_requirement(&self) -> &RequirementId {
        &self.to
    }

    /// Applies the answer.
    ///
    /// Returns the new plan on confirmation. On decline returns `None`, and
    /// the caller keeps the plan it already has.
    #[must_use]
    pub fn resolve(self, decision: Decision) -> Option<Plan> {
        match decision {
            Decision::Confirm => {
                tracing::debug!(course = %self.course, from = %self.from, to = %self.to, "reassignment confirmed");
                Some(self.next)
            }
            Decision::Decline => {
                tracing::debug!(course = %self.course, "reassignment declined");
                None
            }
        }
    }
}

/// Sets the status of a course.
///
/// # Errors
///
/// Returns [`EditError::UnknownCourse`] if no requirement in the tree lists
/// the course.
pub fn apply_course_status_change(
    plan: &Plan,
    tree: &RequirementTree,
    code: &CourseCode,
    status: RegistrationStatus,
) -> Result<Plan, EditError> {
    if tree.requirements_listing(code).next().is_none() {
        return Err(EditError::UnknownCourse(code.clone()));
    }
    tracing::debug!(course = %code, %status, "status change");
    Ok(plan.with_status(code.clone(), status))
}

/// Records the chosen alternative of a selection.
///
/// # Errors
///
/// Returns an error if `selection` is not a selection of the tree or `choice`
/// is not one of its choices.
pub fn apply_selection_change(
    plan: &Plan,
    tree: &RequirementTree,
    selection: &RequirementId,
    choice: &RequirementId,
) -> Result<Plan, EditError> {
    let node = tree
        .get(selection)
        .ok_or_else(|| EditError::UnknownRequirement(selection.clone()))?;
    let node = node
        .as_selection()
        .ok_or_else(|| EditError::NotASelection(selection.clone()))?;
    if !node.offers(choice) {
        return Err(EditError::NotAChoice {
            selection: selection.clone(),
            choice: choice.clone(),
        });
    }
    tracing::debug!(%selection, %choice, "selection change");
    Ok(plan.with_selection(selection.clone(), choice.clone()))
}

/// Records a manual credit count for a requirement that allows other
/// courses.
///
/// # Errors
///
/// Returns an error if the requirement does not exist, does not list
/// courses, or does not allow others.
pub fn apply_others_count_change(
    plan: &Plan,
    tree: &RequirementTree,
    requirement: &RequirementId,
    counts: RegisteredCreditsCounts,
) -> Result<Plan, EditError> {
    let leaf = course_requirement(tree, requirement)?;
    if !leaf.allows_others {
        return Err(EditError::OthersNotAllowed(requirement.clone()));
    }
    tracing::debug!(
        %requirement,
        acquired = counts.acquired(),
        registered = counts.registered(),
        "others count change"
    );
    Ok(plan.with_others_count(requirement.clone(), counts))
}

/// Counts a course toward a requirement.
///
/// If the course already counts toward a different requirement, nothing is
/// changed yet: a [`PendingReassignment`] is returned instead.
///
/// # Errors
///
/// Returns an error if the requirement does not exist, does not list
/// courses, or does not list this course.
pub fn apply_course_reassignment(
    plan: &Plan,
    tree: &RequirementTree,
    code: &CourseCode,
    requirement: &RequirementId,
) -> Result<Reassignment, EditError> {
    let leaf = listing_requirement(tree, code, requirement)?;
    let next = plan.with_requirement(code.clone(), leaf.id.clone());
    Ok(confirm_if_owned_elsewhere(plan, code, requirement, next))
}

/// The single "click" gesture on a course shown under a requirement.
///
/// If the course counts toward another requirement this asks for
/// confirmation exactly like [`apply_course_reassignment`], leaving the
/// status alone. Otherwise the course is counted toward `requirement` and
/// its status advances with [`RegistrationStatus::next`].
///
/// # Errors
///
/// Same as [`apply_course_reassignment`].
pub fn apply_course_click(
    plan: &Plan,
    tree: &RequirementTree,
    code: &CourseCode,
    requirement: &RequirementId,
) -> Result<Reassignment, EditError> {
    let leaf = listing_requirement(tree, code, requirement)?;
    let moved = plan.with_requirement(code.clone(), leaf.id.clone());
    match plan.requirement_of(code) {
        Some(owner) if owner != requirement => {
            Ok(confirm_if_owned_elsewhere(plan, code, requirement, moved))
        }
        _ => {
            let status = plan.status(code).next();
            tracing::debug!(course = %code, %requirement, %status, "course click");
            Ok(Reassignment::Applied(moved.with_status(code.clone(), status)))
        }
    }
}

fn confirm_if_owned_elsewhere(
    plan: &Plan,
    code: &CourseCode,
    requirement: &RequirementId,
    next: Plan,
) -> Reassignment {
    match plan.requirement_of(code) {
        Some(owner) if owner != requirement => {
            tracing::debug!(course = %code, from = %owner, to = %requirement, "reassignment needs confirmation");
            Reassignment::NeedsConfirmation(PendingReassignment {
                course: code.clone(),
                from: owner.clone(),
                to: requirement.clone(),
                next,
            })
        }
        _ => Reassignment::Applied(next),
    }
}

fn course_requirement<'t>(
    tree: &'t RequirementTree,
    id: &RequirementId,
) -> Result<&'t CourseRequirement, EditError> {
    tree.get(id)
        .ok_or_else(|| EditError::UnknownRequirement(id.clone()))?
        .as_courses()
        .ok_or_else(|| EditError::NotACourseRequirement(id.clone()))
}

fn listing_requirement<'t>(
    tree: &'t RequirementTree,
    code: &CourseCode,
    id: &RequirementId,
) -> Result<&'t CourseRequirement, EditError> {
    let leaf = course_requirement(tree, id)?;
    if leaf.lists(code) {
        Ok(leaf)
    } else {
        Err(EditError::CourseNotListed {
            code: code.clone(),
            requirement: id.clone(),
        })
    }
}

/// The fields of the manual credit count form.
///
/// Each field may be left blank. The resulting counts are derived from the
/// filled fields and the current override:
///
/// - `registered_including_acquired`, when given, is the new registered
///   total;
/// - otherwise `registered_excluding_acquired` is added to the new acquired
///   count;
/// - otherwise the registered total moves by the same amount as the acquired
///   count;
/// - otherwise it is left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OthersCountInput {
    /// Credits already earned.
    pub acquired: Option<i64>,
    /// Credits planned on top of those earned.
    pub registered_excluding_acquired: Option<i64>,
    /// Credits earned or planned.
    pub registered_including_acquired: Option<i64>,
}

impl OthersCountInput {
    /// Computes the new override from the form and the current one.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if any resulting count is negative, too
    /// large, or if more credits are acquired than registered.
    pub fn resolve(
        &self,
        current: RegisteredCreditsCounts,
    ) -> Result<RegisteredCreditsCounts, ValidationError> {
        for value in [
            self.acquired,
            self.registered_excluding_acquired,
            self.registered_including_acquired,
        ]
        .into_iter()
        .flatten()
        {
            if value < 0 {
                return Err(ValidationError::Negative(value));
            }
        }

        let current_acquired = i64::from(current.acquired());
        let current_registered = i64::from(current.registered());
        let acquired = self.acquired.unwrap_or(current_acquired);

        let registered = match (
            self.registered_including_acquired,
            self.registered_excluding_acquired,
            self.acquired,
        ) {
            (Some(total), _, _) => total,
            (None, Some(extra), _) => acquired
                .checked_add(extra)
                .ok_or(ValidationError::TooLarge(acquired.max(extra)))?,
            (None, None, Some(new_acquired)) => current_registered
                .checked_add(new_acquired - current_acquired)
                .ok_or(ValidationError::TooLarge(new_acquired))?,
            (None, None, None) => current_registered,
        };

        if registered < 0 {
            return Err(ValidationError::Negative(registered));
        }
        if acquired > registered {
            return Err(ValidationError::AcquiredExceedsRegistered {
                acquired,
                registered,
            });
        }

        let to_u32 = |value: i64| u32::try_from(value).map_err(|_| ValidationError::TooLarge(value));
        RegisteredCreditsCounts::new(to_u32(acquired)?, to_u32(registered)?)
    }
}
