//! The student's assignment state.
//!
//! A [`Plan`] records course statuses, which leaf requirement each course is
//! counted toward, the chosen alternative of each selection, and manual
//! credit overrides. It is held separately from the immutable
//! [`RequirementTree`](crate::RequirementTree) and is never edited in place:
//! every edit in [`edit`](crate::domain::edit) returns a new plan.

use std::collections::BTreeMap;

use crate::domain::{
    course::{CourseCode, RegistrationStatus},
    credits::RegisteredCreditsCounts,
    requirement::RequirementId,
};

/// The student's current choices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub(crate) course_to_status: BTreeMap<CourseCode, RegistrationStatus>,
    pub(crate) course_to_requirement: BTreeMap<CourseCode, RequirementId>,
    pub(crate) selection_to_requirement: BTreeMap<RequirementId, RequirementId>,
    pub(crate) requirement_to_others_count: BTreeMap<RequirementId, RegisteredCreditsCounts>,
}

impl Plan {
    /// The status of a course. Courses not in the plan are unregistered.
    #[must_use]
    pub fn status(&self, code: &CourseCode) -> RegistrationStatus {
        self.course_to_status.get(code).copied().unwrap_or_default()
    }

    /// The leaf requirement a course is counted toward, if any.
    #[must_use]
    pub fn requirement_of(&self, code: &CourseCode) -> Option<&RequirementId> {
        self.course_to_requirement.get(code)
    }

    /// The recorded choice of a selection, if one was made.
    #[must_use]
    pub fn chosen(&self, selection: &RequirementId) -> Option<&RequirementId> {
        self.selection_to_requirement.get(selection)
    }

    /// The manual override for a requirement that allows other courses.
    #[must_use]
    pub fn others_count(&self, requirement: &RequirementId) -> Option<RegisteredCreditsCounts> {
        self.requirement_to_others_count.get(requirement).copied()
    }

    /// Courses with a status other than unregistered.
    pub fn statuses(&self) -> impl Iterator<Item = (&CourseCode, RegistrationStatus)> {
        self.course_to_status.iter().map(|(code, &status)| (code, status))
    }

    /// Course to requirement assignments.
    pub fn assignments(&self) -> impl Iterator<Item = (&CourseCode, &RequirementId)> {
        self.course_to_requirement.iter()
    }

    /// Recorded selection choices.
    pub fn selections(&self) -> impl Iterator<Item = (&RequirementId, &RequirementId)> {
        self.selection_to_requirement.iter()
    }

    /// Recorded manual overrides.
    pub fn others_counts(&self) -> impl Iterator<Item = (&RequirementId, RegisteredCreditsCounts)> {
        self.requirement_to_others_count
            .iter()
            .map(|(id, &counts)| (id, counts))
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.course_to_status.is_empty()
            && self.course_to_requirement.is_empty()
            && self.selection_to_requirement.is_empty()
            && self.requirement_to_others_count.is_empty()
    }

    // Copy-on-write helpers. Each returns a new plan and leaves `self` alone.

    pub(crate) fn with_status(&self, code: CourseCode, status: RegistrationStatus) -> Self {
        let mut next = self.clone();
        if status == RegistrationStatus::Unregistered {
            next.course_to_status.remove(&code);
        } else {
            next.course_to_status.insert(code, status);
        }
        next
    }

    /// Inserting replaces any previous owner, so a course is never claimed by
    /// two requirements.
    pub(crate) fn with_requirement(&self, code: CourseCode, requirement: RequirementId) -> Self {
        let mut next = self.clone();
        next.course_to_requirement.insert(code, requirement);
        next
    }

    pub(crate) fn with_selection(&self, selection: RequirementId, choice: RequirementId) -> Self {
        let mut next = self.clone();
        next.selection_to_requirement.insert(selection, choice);
        next
    }

    pub(crate) fn with_others_count(
        &self,
        requirement: RequirementId,
        counts: RegisteredCreditsCounts,
    ) -> Self {
        let mut next = self.clone();
        next.requirement_to_others_count.insert(requirement, counts);
        next
    }
}
