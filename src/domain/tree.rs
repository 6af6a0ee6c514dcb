//! The immutable requirement tree.
//!
//! The [`RequirementTree`] knows nothing about files or formats. Nodes are
//! stored in an arena keyed by [`RequirementId`]; composites and selections
//! refer to their children by id.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::domain::{
    course::CourseCode,
    credits::InvalidCreditsRange,
    requirement::{CourseRequirement, EmptyRequirementId, Requirement, RequirementId, SelectionRequirement},
    InvalidCourseCode,
};

/// An immutable tree of graduation requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementTree {
    root: RequirementId,
    nodes: BTreeMap<RequirementId, Requirement>,
}

/// Errors in the static catalog or requirement tree.
///
/// These are fatal: the planner cannot start with an invalid configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Two catalog entries share a code.
    #[error("duplicate course code '{0}' in catalog")]
    DuplicateCourse(CourseCode),

    /// A catalog entry is worth zero credits.
    #[error("course '{0}' must be worth at least one credit")]
    ZeroCredits(CourseCode),

    /// A course code could not be parsed.
    #[error(transparent)]
    InvalidCourseCode(#[from] InvalidCourseCode),

    /// A requirement lists a course the catalog does not contain.
    #[error("requirement '{requirement}' references unknown course '{code}'")]
    UnknownCourse {
        /// The requirement listing the course.
        requirement: RequirementId,
        /// The missing code.
        code: CourseCode,
    },

    /// A requirement lists the same course twice.
    #[error("requirement '{requirement}' lists course '{code}' more than once")]
    DuplicateCourseInRequirement {
        /// The requirement listing the course.
        requirement: RequirementId,
        /// The repeated code.
        code: CourseCode,
    },

    /// A selection has no choices.
    #[error("selection '{0}' has no choices")]
    EmptySelection(RequirementId),

    /// A credits range has `min > max`.
    #[error("requirement '{requirement}' has an invalid credits range")]
    InvalidCredits {
        /// The offending requirement.
        requirement: RequirementId,
        /// The underlying range error.
        #[source]
        source: InvalidCreditsRange,
    },

    /// A requirement id is empty.
    #[error(transparent)]
    EmptyRequirementId(#[from] EmptyRequirementId),

    /// Two nodes share an id.
    #[error("duplicate requirement id '{0}'")]
    DuplicateRequirementId(RequirementId),

    /// A node refers to a child that does not exist.
    #[error("unknown requirement '{0}'")]
    UnknownRequirement(RequirementId),

    /// A node is shared, part of a cycle, or unreachable from the root.
    #[error("requirement '{0}' does not have exactly one parent in the tree")]
    NotATree(RequirementId),
}

impl RequirementTree {
    /// Assembles a tree from its root id and the full set of nodes.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if ids are duplicated, a child id is
    /// unknown, a leaf lists a course twice, or the nodes do not form a single
    /// tree rooted at `root`.
    pub fn new(
        root: RequirementId,
        nodes: impl IntoIterator<Item = Requirement>,
    ) -> Result<Self, ConfigurationError> {
        let mut arena = BTreeMap::new();
        for node in nodes {
            let id = node.id().clone();
            if let Requirement::Courses(leaf) = &node {
                check_unique_courses(leaf)?;
            }
            if arena.insert(id.clone(), node).is_some() {
                return Err(ConfigurationError::DuplicateRequirementId(id));
            }
        }

        let tree = Self { root, nodes: arena };
        tree.check_shape()?;
        tracing::debug!(nodes = tree.nodes.len(), root = %tree.root, "built requirement tree");
        Ok(tree)
    }

    fn check_shape(&self) -> Result<(), ConfigurationError> {
        if !self.nodes.contains_key(&self.root) {
            return Err(ConfigurationError::UnknownRequirement(self.root.clone()));
        }

        let mut seen = BTreeSet::new();
        let mut stack = vec![&self.root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                return Err(ConfigurationError::NotATree(id.clone()));
            }
            let node = self
                .nodes
                .get(id)
                .ok_or_else(|| ConfigurationError::UnknownRequirement(id.clone()))?;
            stack.extend(child_ids(node));
        }

        if let Some(orphan) = self.nodes.keys().find(|id| !seen.contains(id)) {
            return Err(ConfigurationError::NotATree(orphan.clone()));
        }
        Ok(())
    }

    /// The root requirement.
    #[must_use]
    pub fn root(&self) -> &Requirement {
        &self.nodes[&self.root]
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn get(&self, id: &RequirementId) -> Option<&Requirement> {
        self.nodes.get(id)
    }

    /// Looks up a course requirement by id.
    #[must_use]
    pub fn course_requirement(&self, id: &RequirementId) -> Option<&CourseRequirement> {
        self.get(id).and_then(Requirement::as_courses)
    }

    /// Looks up a selection requirement by id.
    #[must_use]
    pub fn selection(&self, id: &RequirementId) -> Option<&SelectionRequirement> {
        self.get(id).and_then(Requirement::as_selection)
    }

    /// The number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The direct children of a node, in order.
    ///
    /// For a selection these are all of its choices, not only the active
    /// one.
    pub fn children<'a>(
        &'a self,
        requirement: &'a Requirement,
    ) -> impl Iterator<Item = &'a Requirement> + 'a {
        child_ids(requirement).filter_map(|id| self.nodes.get(id))
    }

    /// Every node in depth-first order, paired with its depth.
    #[must_use]
    pub fn walk(&self) -> Vec<(usize, &Requirement)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(0, self.root())];
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, node));
            let children: Vec<_> = self.children(node).collect();
            stack.extend(children.into_iter().rev().map(|child| (depth + 1, child)));
        }
        out
    }

    /// Every course requirement in the tree.
    pub fn course_requirements(&self) -> impl Iterator<Item = &CourseRequirement> {
        self.nodes.values().filter_map(Requirement::as_courses)
    }

    /// The course requirements that list `code`.
    pub fn requirements_listing<'a>(
        &'a self,
        code: &'a CourseCode,
    ) -> impl Iterator<Item = &'a CourseRequirement> + 'a {
        self.course_requirements().filter(move |leaf| leaf.lists(code))
    }
}

fn child_ids(requirement: &Requirement) -> Box<dyn Iterator<Item = &RequirementId> + '_> {
    match requirement {
        Requirement::Composite(composite) => Box::new(composite.children.iter()),
        Requirement::Courses(_) => Box::new(std::iter::empty()),
        Requirement::Selection(selection) => Box::new(selection.choices.iter()),
    }
}

fn check_unique_courses(leaf: &CourseRequirement) -> Result<(), ConfigurationError> {
    let mut seen = BTreeSet::new();
    for course in &leaf.courses {
        if !seen.insert(&course.code) {
            return Err(ConfigurationError::DuplicateCourseInRequirement {
                requirement: leaf.id.clone(),
                code: course.code.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{composite, course, id, leaf, selection};

    #[test]
    fn walk_is_depth_first_in_order() {
        let tree = RequirementTree::new(
            id("root"),
            [
                composite("root", 10, &["a", "s"]),
                leaf("a", 4, vec![course("A1", 2)], false),
                selection("s", &["b", "c"]),
                leaf("b", 2, vec![], true),
                leaf("c", 3, vec![], true),
            ],
        )
        .unwrap();

        let order: Vec<_> = tree
            .walk()
            .into_iter()
            .map(|(depth, node)| (depth, node.id().to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                (0, "root".to_string()),
                (1, "a".to_string()),
                (1, "s".to_string()),
                (2, "b".to_string()),
                (2, "c".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = RequirementTree::new(
            id("root"),
            [composite("root", 0, &["a"]), leaf("a", 0, vec![], false), leaf("a", 0, vec![], false)],
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateRequirementId(id("a")));
    }

    #[test]
    fn rejects_unknown_child() {
        let err = RequirementTree::new(id("root"), [composite("root", 0, &["missing"])]).unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownRequirement(id("missing")));
    }

    #[test]
    fn rejects_shared_child() {
        let err = RequirementTree::new(
            id("root"),
            [
                composite("root", 0, &["x", "y"]),
                composite("x", 0, &["leaf"]),
                composite("y", 0, &["leaf"]),
                leaf("leaf", 0, vec![], false),
            ],
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationError::NotATree(id("leaf")));
    }

    #[test]
    fn rejects_unreachable_nodes() {
        let err = RequirementTree::new(
            id("root"),
            [leaf("root", 0, vec![], false), leaf("orphan", 0, vec![], false)],
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationError::NotATree(id("orphan")));
    }

    #[test]
    fn rejects_course_listed_twice() {
        let err = RequirementTree::new(
            id("root"),
            [leaf("root", 0, vec![course("A1", 2), course("A1", 2)], false)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::DuplicateCourseInRequirement { .. }
        ));
    }

    #[test]
    fn finds_requirements_listing_a_course() {
        let tree = RequirementTree::new(
            id("root"),
            [
                composite("root", 0, &["a", "b"]),
                leaf("a", 0, vec![course("X", 2)], false),
                leaf("b", 0, vec![course("X", 2), course("Y", 1)], false),
            ],
        )
        .unwrap();
        let code = CourseCode::new("X").unwrap();
        let owners: Vec<_> = tree
            .requirements_listing(&code)
            .map(|leaf| leaf.id.to_string())
            .collect();
        assert_eq!(owners, vec!["a", "b"]);
    }
}
