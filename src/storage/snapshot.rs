//! Portable snapshots of a [`Plan`].
//!
//! A snapshot records course codes and requirement ids as plain strings. It
//! is not a copy of the tree: turning it back into a plan means resolving
//! every id against the live catalog and tree, and rejecting the whole
//! snapshot if anything fails to resolve.

use std::{collections::BTreeMap, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    Catalog, CourseCode, InvalidCourseCode, Plan, RegisteredCreditsCounts, RegistrationStatus,
    RequirementId, RequirementTree, ValidationError, requirement::EmptyRequirementId,
};

/// A serialized plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SnapshotVersion", into = "SnapshotVersion")]
pub struct Snapshot {
    exported: Option<DateTime<Utc>>,
    course_to_status: BTreeMap<String, RegistrationStatus>,
    course_to_requirement: BTreeMap<String, String>,
    selection_to_requirement: BTreeMap<String, String>,
    requirement_to_others_count: BTreeMap<String, OthersCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct OthersCount {
    acquired: u32,
    registered: u32,
}

/// Errors raised when a snapshot cannot be turned back into a plan.
///
/// The plan currently in use is never affected.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The document is not a snapshot (bad JSON, wrong shapes, unknown
    /// version).
    #[error("malformed snapshot")]
    Malformed(#[from] serde_json::Error),

    /// A course code could not be parsed.
    #[error(transparent)]
    InvalidCourseCode(#[from] InvalidCourseCode),

    /// A requirement id was empty.
    #[error(transparent)]
    InvalidRequirementId(#[from] EmptyRequirementId),

    /// The catalog has no such course.
    #[error("unknown course '{0}'")]
    UnknownCourse(CourseCode),

    /// The tree has no such requirement.
    #[error("unknown requirement '{0}'")]
    UnknownRequirement(RequirementId),

    /// A course is assigned to a node that does not list courses.
    #[error("requirement '{0}' does not list courses")]
    NotACourseRequirement(RequirementId),

    /// A course is assigned to a requirement that does not list it.
    #[error("course '{code}' is not listed by requirement '{requirement}'")]
    CourseNotListed {
        /// The course.
        code: CourseCode,
        /// The requirement.
        requirement: RequirementId,
    },

    /// A selection entry names a node that is not a selection.
    #[error("requirement '{0}' is not a selection")]
    NotASelection(RequirementId),

    /// The recorded choice is no longer one of the selection's choices.
    #[error("'{choice}' is not a choice of selection '{selection}'")]
    NotAChoice {
        /// The selection.
        selection: RequirementId,
        /// The recorded choice.
        choice: RequirementId,
    },

    /// An override is recorded for a requirement that does not accept one.
    #[error("requirement '{0}' does not accept a manual credit count")]
    OthersNotAllowed(RequirementId),

    /// An override has more credits acquired than registered.
    #[error("invalid manual credit count for requirement '{requirement}'")]
    InvalidOthersCount {
        /// The requirement.
        requirement: RequirementId,
        /// What was wrong with the counts.
        #[source]
        source: ValidationError,
    },
}

/// Serializes a plan into a snapshot.
#[must_use]
pub fn to_json(plan: &Plan) -> Snapshot {
    Snapshot::from_plan(plan)
}

/// Resolves a snapshot against a catalog and tree.
///
/// # Errors
///
/// See [`Snapshot::resolve`].
pub fn from_json(
    snapshot: &Snapshot,
    tree: &RequirementTree,
    catalog: &Catalog,
) -> Result<Plan, ResolutionError> {
    snapshot.resolve(tree, catalog)
}

impl Snapshot {
    /// A snapshot of the empty plan.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Records every entry of `plan` by its string identifiers.
    #[must_use]
    pub fn from_plan(plan: &Plan) -> Self {
        Self {
            exported: None,
            course_to_status: plan
                .statuses()
                .map(|(code, status)| (code.to_string(), status))
                .collect(),
            course_to_requirement: plan
                .assignments()
                .map(|(code, id)| (code.to_string(), id.to_string()))
                .collect(),
            selection_to_requirement: plan
                .selections()
                .map(|(selection, choice)| (selection.to_string(), choice.to_string()))
                .collect(),
            requirement_to_others_count: plan
                .others_counts()
                .map(|(id, counts)| {
                    (
                        id.to_string(),
                        OthersCount {
                            acquired: counts.acquired(),
                            registered: counts.registered(),
                        },
                    )
                })
                .collect(),
        }
    }

    /// Marks the snapshot with the current time.
    #[must_use]
    pub fn stamped(self) -> Self {
        Self {
            exported: Some(Utc::now()),
            ..self
        }
    }

    /// When the snapshot was exported, if recorded.
    #[must_use]
    pub const fn exported(&self) -> Option<DateTime<Utc>> {
        self.exported
    }

    /// Pretty-printed JSON.
    ///
    /// # Panics
    ///
    /// Never in practice: every key is a string and every value is plain
    /// data.
    #[must_use]
    pub fn to_string_pretty(&self) -> String {
        serde_json::to_string_pretty(self).expect("this must never fail")
    }

    /// Resolves every identifier against the live catalog and tree.
    ///
    /// Either every entry resolves and a plan is returned, or nothing is.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolutionError`] if a course or requirement is unknown, a
    /// course is assigned somewhere it cannot count, a recorded choice is not
    /// offered any more, or an override is not accepted or invalid.
    pub fn resolve(
        &self,
        tree: &RequirementTree,
        catalog: &Catalog,
    ) -> Result<Plan, ResolutionError> {
        let mut plan = Plan::default();

        for (code, &status) in &self.course_to_status {
            let code = known_course(catalog, code)?;
            if status != RegistrationStatus::Unregistered {
                plan.course_to_status.insert(code, status);
            }
        }

        for (code, id) in &self.course_to_requirement {
            let code = known_course(catalog, code)?;
            let id = RequirementId::new(id.as_str())?;
            let leaf = tree
                .get(&id)
                .ok_or_else(|| ResolutionError::UnknownRequirement(id.clone()))?
                .as_courses()
                .ok_or_else(|| ResolutionError::NotACourseRequirement(id.clone()))?;
            if !leaf.lists(&code) {
                return Err(ResolutionError::CourseNotListed {
                    code,
                    requirement: id,
                });
            }
            plan.course_to_requirement.insert(code, id);
        }

        for (selection, choice) in &self.selection_to_requirement {
            let selection = RequirementId::new(selection.as_str())?;
            let choice = RequirementId::new(choice.as_str())?;
            let node = tree
                .get(&selection)
                .ok_or_else(|| ResolutionError::UnknownRequirement(selection.clone()))?
                .as_selection()
                .ok_or_else(|| ResolutionError::NotASelection(selection.clone()))?;
            if tree.get(&choice).is_none() {
                return Err(ResolutionError::UnknownRequirement(choice));
            }
            if !node.offers(&choice) {
                return Err(ResolutionError::NotAChoice { selection, choice });
            }
            plan.selection_to_requirement.insert(selection, choice);
        }

        for (id, counts) in &self.requirement_to_others_count {
            let id = RequirementId::new(id.as_str())?;
            let leaf = tree
                .get(&id)
                .ok_or_else(|| ResolutionError::UnknownRequirement(id.clone()))?
                .as_courses()
                .ok_or_else(|| ResolutionError::NotACourseRequirement(id.clone()))?;
            if !leaf.allows_others {
                return Err(ResolutionError::OthersNotAllowed(id));
            }
            let counts = RegisteredCreditsCounts::new(counts.acquired, counts.registered)
                .map_err(|source| ResolutionError::InvalidOthersCount {
                    requirement: id.clone(),
                    source,
                })?;
            plan.requirement_to_others_count.insert(id, counts);
        }

        tracing::debug!(
            statuses = plan.course_to_status.len(),
            assignments = plan.course_to_requirement.len(),
            "resolved snapshot"
        );
        Ok(plan)
    }
}

fn known_course(catalog: &Catalog, code: &str) -> Result<CourseCode, ResolutionError> {
    let code = CourseCode::new(code)?;
    if catalog.contains(&code) {
        Ok(code)
    } else {
        Err(ResolutionError::UnknownCourse(code))
    }
}

impl FromStr for Snapshot {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version", deny_unknown_fields)]
enum SnapshotVersion {
    #[serde(rename = "1", rename_all = "camelCase")]
    V1 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exported: Option<DateTime<Utc>>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        course_to_status: BTreeMap<String, RegistrationStatus>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        course_to_requirement: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        selection_to_requirement: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        requirement_to_others_count: BTreeMap<String, OthersCount>,
    },
}

impl From<SnapshotVersion> for Snapshot {
    fn from(version: SnapshotVersion) -> Self {
        match version {
            SnapshotVersion::V1 {
                exported,
                course_to_status,
                course_to_requirement,
                selection_to_requirement,
                requirement_to_others_count,
            } => Self {
                exported,
                course_to_status,
                course_to_requirement,
                selection_to_requirement,
                requirement_to_others_count,
            },
        }
    }
}

impl From<Snapshot> for SnapshotVersion {
    fn from(snapshot: Snapshot) -> Self {
        let Snapshot {
            exported,
            course_to_status,
            course_to_requirement,
            selection_to_requirement,
            requirement_to_others_count,
        } = snapshot;
        Self::V1 {
            exported,
            course_to_status,
            course_to_requirement,
            selection_to_requirement,
            requirement_to_others_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Reassignment, apply_course_click, apply_course_reassignment, apply_others_count_change,
        apply_selection_change,
        fixtures::{code, composite, course, id, leaf, selection},
    };

    fn catalog() -> Catalog {
        Catalog::new([course("X", 2), course("Y", 2), course("Z", 1)]).unwrap()
    }

    fn tree() -> RequirementTree {
        RequirementTree::new(
            id("root"),
            [
                composite("root", 8, &["a", "b", "s"]),
                leaf("a", 4, vec![course("X", 2), course("Y", 2)], false),
                leaf("b", 4, vec![course("X", 2), course("Z", 1)], false),
                selection("s", &["s1", "s2"]),
                leaf("s1", 2, vec![], true),
                leaf("s2", 3, vec![], true),
            ],
        )
        .unwrap()
    }

    fn applied(result: Result<Reassignment, crate::EditError>) -> Plan {
        match result.unwrap() {
            Reassignment::Applied(plan) => plan,
            Reassignment::NeedsConfirmation(pending) => pending
                .resolve(crate::domain::Decision::Confirm)
                .unwrap(),
        }
    }

    fn edited_plan(tree: &RequirementTree) -> Plan {
        let plan = applied(apply_course_click(&Plan::default(), tree, &code("X"), &id("a")));
        let plan = applied(apply_course_click(&plan, tree, &code("X"), &id("a")));
        let plan = applied(apply_course_click(&plan, tree, &code("Z"), &id("b")));
        let plan = applied(apply_course_reassignment(&plan, tree, &code("X"), &id("b")));
        let plan = apply_selection_change(&plan, tree, &id("s"), &id("s2")).unwrap();
        apply_others_count_change(
            &plan,
            tree,
            &id("s2"),
            RegisteredCreditsCounts::new(1, 3).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn round_trips_through_json_text() {
        let tree = tree();
        let plan = edited_plan(&tree);

        let text = to_json(&plan).stamped().to_string_pretty();
        let snapshot: Snapshot = text.parse().unwrap();
        let restored = from_json(&snapshot, &tree, &catalog()).unwrap();

        assert_eq!(restored, plan);
        assert!(snapshot.exported().is_some());
    }

    #[test]
    fn empty_plan_round_trips() {
        let text = Snapshot::empty().to_string_pretty();
        let snapshot: Snapshot = text.parse().unwrap();
        assert_eq!(snapshot.resolve(&tree(), &catalog()).unwrap(), Plan::default());
    }

    #[test]
    fn uses_camel_case_keys_and_version_tag() {
        let tree = tree();
        let value = serde_json::to_value(to_json(&edited_plan(&tree))).unwrap();
        assert_eq!(value["_version"], "1");
        assert_eq!(value["courseToStatus"]["X"], "acquired");
        assert_eq!(value["courseToRequirement"]["X"], "b");
        assert_eq!(value["selectionToRequirement"]["s"], "s2");
        assert_eq!(value["requirementToOthersCount"]["s2"]["registered"], 3);
    }

    fn resolve(json: &str) -> Result<Plan, ResolutionError> {
        json.parse::<Snapshot>()?.resolve(&tree(), &catalog())
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(resolve("not json"), Err(ResolutionError::Malformed(_))));
        assert!(matches!(resolve("{}"), Err(ResolutionError::Malformed(_))));
        assert!(matches!(
            resolve(r#"{"_version": "2"}"#),
            Err(ResolutionError::Malformed(_))
        ));
        assert!(matches!(
            resolve(r#"{"_version": "1", "courseToStatus": {"X": "finished"}}"#),
            Err(ResolutionError::Malformed(_))
        ));
        assert!(matches!(
            resolve(r#"{"_version": "1", "courseToStatus": []}"#),
            Err(ResolutionError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_misspelled_keys() {
        assert!(matches!(
            resolve(
                r#"{"_version": "1", "courseToStatuses": {"X": "acquired"}, "courseToRequirment": {"X": "a"}}"#
            ),
            Err(ResolutionError::Malformed(_))
        ));
        assert!(matches!(
            resolve(r#"{"_version": "1", "courseToStatus": {"X": "acquired"}, "extra": 1}"#),
            Err(ResolutionError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_unknown_course() {
        assert!(matches!(
            resolve(r#"{"_version": "1", "courseToStatus": {"NOPE": "registered"}}"#),
            Err(ResolutionError::UnknownCourse(c)) if c == code("NOPE")
        ));
    }

    #[test]
    fn rejects_unknown_requirement() {
        assert!(matches!(
            resolve(r#"{"_version": "1", "courseToRequirement": {"X": "gone"}}"#),
            Err(ResolutionError::UnknownRequirement(r)) if r == id("gone")
        ));
    }

    #[test]
    fn rejects_assignment_to_a_requirement_not_listing_the_course() {
        assert!(matches!(
            resolve(r#"{"_version": "1", "courseToRequirement": {"Y": "b"}}"#),
            Err(ResolutionError::CourseNotListed { .. })
        ));
        assert!(matches!(
            resolve(r#"{"_version": "1", "courseToRequirement": {"X": "root"}}"#),
            Err(ResolutionError::NotACourseRequirement(_))
        ));
    }

    #[test]
    fn rejects_choices_no_longer_offered() {
        assert!(matches!(
            resolve(r#"{"_version": "1", "selectionToRequirement": {"s": "a"}}"#),
            Err(ResolutionError::NotAChoice { .. })
        ));
        assert!(matches!(
            resolve(r#"{"_version": "1", "selectionToRequirement": {"a": "s1"}}"#),
            Err(ResolutionError::NotASelection(_))
        ));
    }

    #[test]
    fn rejects_invalid_overrides() {
        assert!(matches!(
            resolve(r#"{"_version": "1", "requirementToOthersCount": {"a": {"acquired": 1, "registered": 1}}}"#),
            Err(ResolutionError::OthersNotAllowed(_))
        ));
        assert!(matches!(
            resolve(r#"{"_version": "1", "requirementToOthersCount": {"s1": {"acquired": 3, "registered": 1}}}"#),
            Err(ResolutionError::InvalidOthersCount { .. })
        ));
    }

    #[test]
    fn failure_returns_no_partial_plan() {
        // The first entries are valid; the last one is not.
        let result = resolve(
            r#"{"_version": "1",
                "courseToStatus": {"X": "acquired"},
                "courseToRequirement": {"X": "a"},
                "selectionToRequirement": {"s": "missing"}}"#,
        );
        assert!(matches!(result, Err(ResolutionError::UnknownRequirement(_))));
    }

    #[test]
    fn unregistered_entries_are_dropped() {
        let plan =
            resolve(r#"{"_version": "1", "courseToStatus": {"X": "unregistered"}}"#).unwrap();
        assert_eq!(plan, Plan::default());
    }
}
