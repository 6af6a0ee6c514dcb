//! Credit aggregation and status evaluation.
//!
//! The [`Evaluator`] borrows a [`RequirementTree`] and a [`Plan`] and derives
//! everything a renderer needs from them. It holds no state of its own and
//! never fails: identical inputs always produce identical outputs.

use std::collections::BTreeSet;

use crate::domain::{
    course::{Course, RegistrationStatus, Threshold},
    credits::CreditsRange,
    plan::Plan,
    requirement::{CourseRequirement, Requirement, RequirementId, SelectionRequirement},
    tree::RequirementTree,
};

/// Evaluates requirements of a tree against a plan.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    tree: &'a RequirementTree,
    plan: &'a Plan,
}

/// Capped and uncapped totals at one threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    /// Credits counted toward the requirement, capped at its maximum.
    pub capped: u32,
    /// Credits earned including those beyond the maximum.
    pub uncapped: u32,
}

impl Tally {
    /// Credits earned beyond the requirement's maximum. Shown for
    /// information only; they never count toward the parent.
    #[must_use]
    pub const fn exceeded(&self) -> u32 {
        self.uncapped.saturating_sub(self.capped)
    }
}

/// Everything shown for a single requirement node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Whether the node is satisfied, and at which level.
    pub status: RegistrationStatus,
    /// The credits the node asks for.
    pub required: CreditsRange,
    /// Totals of acquired credits.
    pub acquired: Tally,
    /// Totals of registered (including acquired) credits.
    pub registered: Tally,
}

impl Summary {
    /// The tally for `threshold`.
    #[must_use]
    pub const fn tally(&self, threshold: Threshold) -> Tally {
        match threshold {
            Threshold::Registered => self.registered,
            Threshold::Acquired => self.acquired,
        }
    }

    /// Credits beyond the maximum at `threshold`.
    #[must_use]
    pub const fn exceeded(&self, threshold: Threshold) -> u32 {
        self.tally(threshold).exceeded()
    }
}

/// Where a listed course is currently counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment<'a> {
    /// Not counted anywhere.
    Unassigned,
    /// Counted toward the requirement being looked at.
    Here,
    /// Counted toward a different requirement.
    Elsewhere(&'a RequirementId),
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator for `plan` against `tree`.
    #[must_use]
    pub const fn new(tree: &'a RequirementTree, plan: &'a Plan) -> Self {
        Self { tree, plan }
    }

    /// The status of a requirement.
    ///
    /// `Acquired` if the capped acquired total reaches the required minimum,
    /// otherwise `Registered` if the capped registered total does, otherwise
    /// `Unregistered`. Selections take the status of their active choice.
    #[must_use]
    pub fn status(&self, requirement: &Requirement) -> RegistrationStatus {
        if let Requirement::Selection(selection) = requirement {
            return self
                .active_choice(selection)
                .map_or(RegistrationStatus::Unregistered, |choice| self.status(choice));
        }

        let required = self.required_credits_count(requirement).min();
        if self.registered_credits_count(requirement, Threshold::Acquired, false) >= required {
            RegistrationStatus::Acquired
        } else if self.registered_credits_count(requirement, Threshold::Registered, false)
            >= required
        {
            RegistrationStatus::Registered
        } else {
            RegistrationStatus::Unregistered
        }
    }

    /// The credits counted toward `requirement` at `threshold`.
    ///
    /// When `includes_excess` is false the total is capped at the node's
    /// maximum, and whatever lies above the cap is discarded at that node.
    #[must_use]
    pub fn registered_credits_count(
        &self,
        requirement: &Requirement,
        threshold: Threshold,
        includes_excess: bool,
    ) -> u32 {
        let (total, credits) = match requirement {
            Requirement::Courses(leaf) => (self.leaf_total(leaf, threshold), leaf.credits),
            Requirement::Composite(composite) => {
                let total = composite
                    .children
                    .iter()
                    .filter_map(|id| self.tree.get(id))
                    .map(|child| self.registered_credits_count(child, threshold, includes_excess))
                    .fold(0, u32::saturating_add);
                (total, composite.credits)
            }
            Requirement::Selection(selection) => {
                return self.active_choice(selection).map_or(0, |choice| {
                    self.registered_credits_count(choice, threshold, includes_excess)
                });
            }
        };

        if includes_excess {
            total
        } else {
            total.min(credits.max())
        }
    }

    fn leaf_total(&self, leaf: &CourseRequirement, threshold: Threshold) -> u32 {
        let mut qualifying = leaf
            .courses
            .iter()
            .filter(|course| self.counts_toward(leaf, course, threshold))
            .peekable();

        if qualifying.peek().is_none() && leaf.allows_others {
            return self
                .plan
                .others_count(&leaf.id)
                .map_or(0, |counts| counts.get(threshold));
        }

        qualifying
            .map(|course| course.credits)
            .fold(0, u32::saturating_add)
    }

    fn counts_toward(&self, leaf: &CourseRequirement, course: &Course, threshold: Threshold) -> bool {
        self.plan.status(&course.code).satisfies(threshold)
            && self.plan.requirement_of(&course.code) == Some(&leaf.id)
    }

    /// The credits `requirement` asks for.
    ///
    /// Selections report the range of their active choice.
    #[must_use]
    pub fn required_credits_count(&self, requirement: &Requirement) -> CreditsRange {
        match requirement {
            Requirement::Composite(composite) => composite.credits,
            Requirement::Courses(leaf) => leaf.credits,
            Requirement::Selection(selection) => self
                .active_choice(selection)
                .map_or(CreditsRange::exact(0), |choice| {
                    self.required_credits_count(choice)
                }),
        }
    }

    /// The alternative of `selection` that currently counts.
    ///
    /// Falls back to the first choice when nothing was chosen, or when the
    /// recorded choice is not one of the selection's choices. `None` if the
    /// selection comes from another tree and its choice is not in this one;
    /// such a selection counts for nothing, like an unknown composite child.
    #[must_use]
    pub fn active_choice(&self, selection: &SelectionRequirement) -> Option<&'a Requirement> {
        let id = self
            .plan
            .chosen(&selection.id)
            .filter(|chosen| selection.offers(chosen))
            .unwrap_or_else(|| selection.default_choice());
        self.tree.get(id)
    }

    /// Status, required range and both tallies for `requirement`.
    #[must_use]
    pub fn summary(&self, requirement: &Requirement) -> Summary {
        let tally = |threshold| Tally {
            capped: self.registered_credits_count(requirement, threshold, false),
            uncapped: self.registered_credits_count(requirement, threshold, true),
        };
        Summary {
            status: self.status(requirement),
            required: self.required_credits_count(requirement),
            acquired: tally(Threshold::Acquired),
            registered: tally(Threshold::Registered),
        }
    }

    /// The courses of a leaf to display.
    ///
    /// With `only_registered`, keeps the courses that are registered or
    /// acquired and counted toward this leaf.
    #[must_use]
    pub fn listed_courses<'l>(
        &self,
        leaf: &'l CourseRequirement,
        only_registered: bool,
    ) -> Vec<&'l Course> {
        leaf.courses
            .iter()
            .filter(|course| {
                !only_registered || self.counts_toward(leaf, course, Threshold::Registered)
            })
            .collect()
    }

    /// Where `course` is counted, relative to `leaf`.
    #[must_use]
    pub fn assignment(&self, leaf: &CourseRequirement, course: &Course) -> Assignment<'a> {
        match self.plan.requirement_of(&course.code) {
            None => Assignment::Unassigned,
            Some(owner) if owner == &leaf.id => Assignment::Here,
            Some(owner) => Assignment::Elsewhere(owner),
        }
    }

    /// Ids of the nodes reachable from the root through active choices only.
    ///
    /// Nodes outside this set are inactive alternatives: they contribute
    /// nothing to any total.
    #[must_use]
    pub fn active_nodes(&self) -> BTreeSet<&'a RequirementId> {
        let mut active = BTreeSet::new();
        let mut stack = vec![self.tree.root()];
        while let Some(node) = stack.pop() {
            active.insert(node.id());
            match node {
                Requirement::Composite(composite) => {
                    stack.extend(composite.children.iter().filter_map(|id| self.tree.get(id)));
                }
                Requirement::Courses(_) => {}
                Requirement::Selection(selection) => stack.extend(self.active_choice(selection)),
            }
        }
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        course::CourseCode,
        credits::RegisteredCreditsCounts,
        fixtures::{code, composite, composite_range, course, id, leaf, leaf_range, selection},
    };

    fn acquire(plan: &Plan, course: &str, requirement: &str) -> Plan {
        set(plan, course, requirement, RegistrationStatus::Acquired)
    }

    fn set(plan: &Plan, course: &str, requirement: &str, status: RegistrationStatus) -> Plan {
        plan.with_status(code(course), status)
            .with_requirement(code(course), id(requirement))
    }

    fn single_leaf(courses: usize) -> RequirementTree {
        let courses = (1..=courses).map(|i| course(&format!("C{i}"), 2)).collect();
        RequirementTree::new(id("leaf"), [leaf("leaf", 4, courses, false)]).unwrap()
    }

    #[test]
    fn two_acquired_courses_meet_an_exact_requirement() {
        let tree = single_leaf(2);
        let plan = acquire(&acquire(&Plan::default(), "C1", "leaf"), "C2", "leaf");
        let eval = Evaluator::new(&tree, &plan);

        assert_eq!(eval.status(tree.root()), RegistrationStatus::Acquired);
        assert_eq!(
            eval.registered_credits_count(tree.root(), Threshold::Acquired, false),
            4
        );
    }

    #[test]
    fn credits_above_the_maximum_are_reported_as_exceeded() {
        let tree = single_leaf(3);
        let mut plan = Plan::default();
        for c in ["C1", "C2", "C3"] {
            plan = acquire(&plan, c, "leaf");
        }
        let summary = Evaluator::new(&tree, &plan).summary(tree.root());

        assert_eq!(summary.acquired.capped, 4);
        assert_eq!(summary.acquired.uncapped, 6);
        assert_eq!(summary.exceeded(Threshold::Acquired), 2);
        assert_eq!(summary.exceeded(Threshold::Registered), 2);
    }

    #[test]
    fn registered_courses_give_registered_status() {
        let tree = single_leaf(2);
        let plan = set(&Plan::default(), "C1", "leaf", RegistrationStatus::Registered);
        let plan = acquire(&plan, "C2", "leaf");
        let eval = Evaluator::new(&tree, &plan);

        assert_eq!(eval.status(tree.root()), RegistrationStatus::Registered);
        assert_eq!(
            eval.registered_credits_count(tree.root(), Threshold::Acquired, false),
            2
        );
        assert_eq!(
            eval.registered_credits_count(tree.root(), Threshold::Registered, false),
            4
        );
    }

    #[test]
    fn courses_assigned_elsewhere_do_not_count() {
        let tree = RequirementTree::new(
            id("root"),
            [
                composite("root", 4, &["a", "b"]),
                leaf("a", 2, vec![course("X", 2)], false),
                leaf("b", 2, vec![course("X", 2)], false),
            ],
        )
        .unwrap();
        let plan = acquire(&Plan::default(), "X", "b");
        let eval = Evaluator::new(&tree, &plan);

        let a = tree.get(&id("a")).unwrap();
        let b = tree.get(&id("b")).unwrap();
        assert_eq!(eval.registered_credits_count(a, Threshold::Acquired, true), 0);
        assert_eq!(eval.registered_credits_count(b, Threshold::Acquired, true), 2);
        assert_eq!(eval.status(a), RegistrationStatus::Unregistered);
    }

    #[test]
    fn unassigned_courses_do_not_count() {
        let tree = single_leaf(2);
        let plan = Plan::default().with_status(code("C1"), RegistrationStatus::Acquired);
        let eval = Evaluator::new(&tree, &plan);
        assert_eq!(
            eval.registered_credits_count(tree.root(), Threshold::Registered, true),
            0
        );
    }

    #[test]
    fn override_stands_in_for_empty_leaf() {
        let tree =
            RequirementTree::new(id("free"), [leaf("free", 6, vec![course("X", 2)], true)]).unwrap();
        let plan = Plan::default()
            .with_others_count(id("free"), RegisteredCreditsCounts::new(2, 8).unwrap());
        let summary = Evaluator::new(&tree, &plan).summary(tree.root());

        assert_eq!(summary.acquired, Tally { capped: 2, uncapped: 2 });
        assert_eq!(summary.registered, Tally { capped: 6, uncapped: 8 });
        assert_eq!(summary.status, RegistrationStatus::Registered);
    }

    #[test]
    fn override_is_ignored_once_a_listed_course_qualifies() {
        let tree =
            RequirementTree::new(id("free"), [leaf("free", 6, vec![course("X", 2)], true)]).unwrap();
        let plan = Plan::default()
            .with_others_count(id("free"), RegisteredCreditsCounts::new(6, 6).unwrap());
        let plan = acquire(&plan, "X", "free");
        let eval = Evaluator::new(&tree, &plan);

        assert_eq!(
            eval.registered_credits_count(tree.root(), Threshold::Acquired, true),
            2
        );
    }

    #[test]
    fn override_is_ignored_without_allows_others() {
        let tree =
            RequirementTree::new(id("fixed"), [leaf("fixed", 6, vec![], false)]).unwrap();
        let plan = Plan::default()
            .with_others_count(id("fixed"), RegisteredCreditsCounts::new(6, 6).unwrap());
        let eval = Evaluator::new(&tree, &plan);

        for threshold in Threshold::ALL {
            for includes_excess in [false, true] {
                assert_eq!(
                    eval.registered_credits_count(tree.root(), threshold, includes_excess),
                    0
                );
            }
        }
    }

    #[test]
    fn composite_caps_the_sum_of_capped_children() {
        let tree = RequirementTree::new(
            id("root"),
            [
                composite_range("root", CreditsRange::new(4, 5).unwrap(), &["a", "b"]),
                leaf_range(
                    "a",
                    CreditsRange::new(0, 2).unwrap(),
                    vec![course("A1", 2), course("A2", 2)],
                    false,
                ),
                leaf("b", 4, vec![course("B1", 2), course("B2", 2)], false),
            ],
        )
        .unwrap();
        let mut plan = Plan::default();
        for (c, r) in [("A1", "a"), ("A2", "a"), ("B1", "b"), ("B2", "b")] {
            plan = acquire(&plan, c, r);
        }
        let eval = Evaluator::new(&tree, &plan);
        let root = tree.root();

        let children: u32 = tree
            .children(root)
            .map(|child| eval.registered_credits_count(child, Threshold::Acquired, false))
            .sum();
        assert_eq!(children, 6);
        assert_eq!(
            eval.registered_credits_count(root, Threshold::Acquired, false),
            children.min(5)
        );
        // Uncapped totals sum the children's uncapped totals.
        assert_eq!(eval.registered_credits_count(root, Threshold::Acquired, true), 8);
    }

    #[test]
    fn selection_defaults_to_first_choice() {
        let tree = RequirementTree::new(
            id("s"),
            [selection("s", &["two", "three"]), leaf("two", 2, vec![], true), leaf("three", 3, vec![], true)],
        )
        .unwrap();
        let plan = Plan::default();
        let eval = Evaluator::new(&tree, &plan);
        assert_eq!(eval.required_credits_count(tree.root()), CreditsRange::exact(2));
    }

    #[test]
    fn selection_delegates_to_the_chosen_child() {
        let tree = RequirementTree::new(
            id("s"),
            [
                selection("s", &["a", "b"]),
                leaf("a", 2, vec![course("A1", 2)], false),
                leaf("b", 3, vec![course("B1", 3)], false),
            ],
        )
        .unwrap();
        let plan = acquire(&Plan::default(), "A1", "a");
        let chose_b = plan.with_selection(id("s"), id("b"));

        let before = Evaluator::new(&tree, &plan);
        assert_eq!(before.status(tree.root()), RegistrationStatus::Acquired);

        let after = Evaluator::new(&tree, &chose_b);
        let b = tree.get(&id("b")).unwrap();
        assert_eq!(after.status(tree.root()), after.status(b));
        assert_eq!(after.required_credits_count(tree.root()), after.required_credits_count(b));
        assert_eq!(after.status(tree.root()), RegistrationStatus::Unregistered);
        assert_eq!(
            after.registered_credits_count(tree.root(), Threshold::Acquired, true),
            0
        );
        assert!(!after.active_nodes().contains(&id("a")));
    }

    #[test]
    fn stale_choice_falls_back_to_default() {
        let tree = RequirementTree::new(
            id("s"),
            [selection("s", &["a", "b"]), leaf("a", 2, vec![], true), leaf("b", 3, vec![], true)],
        )
        .unwrap();
        let plan = Plan::default().with_selection(id("s"), id("gone"));
        let eval = Evaluator::new(&tree, &plan);
        let s = tree.selection(&id("s")).unwrap();
        assert_eq!(eval.active_choice(s).map(Requirement::id), Some(&id("a")));
    }

    #[test]
    fn selection_from_another_tree_counts_for_nothing() {
        let other = RequirementTree::new(
            id("s"),
            [selection("s", &["x"]), leaf("x", 2, vec![], true)],
        )
        .unwrap();
        let tree = RequirementTree::new(id("a"), [leaf("a", 2, vec![], true)]).unwrap();
        let plan = Plan::default();
        let eval = Evaluator::new(&tree, &plan);
        let foreign = other.get(&id("s")).unwrap();
        let Requirement::Selection(s) = foreign else {
            panic!("expected a selection");
        };

        assert!(eval.active_choice(s).is_none());
        assert_eq!(eval.status(foreign), RegistrationStatus::Unregistered);
        assert_eq!(eval.required_credits_count(foreign), CreditsRange::exact(0));
        assert_eq!(
            eval.registered_credits_count(foreign, Threshold::Registered, true),
            0
        );
    }

    #[test]
    fn raising_a_status_never_lowers_ancestor_totals() {
        let tree = RequirementTree::new(
            id("root"),
            [
                composite("root", 6, &["inner", "s"]),
                composite("inner", 4, &["a"]),
                leaf("a", 4, vec![course("A1", 2), course("A2", 2), course("A3", 2)], false),
                selection("s", &["b"]),
                leaf("b", 2, vec![course("B1", 2)], false),
            ],
        )
        .unwrap();

        let statuses = [
            RegistrationStatus::Unregistered,
            RegistrationStatus::Registered,
            RegistrationStatus::Acquired,
        ];
        let courses = [("A1", "a"), ("A2", "a"), ("A3", "a"), ("B1", "b")];
        let ancestors = [id("root"), id("inner"), id("s")];

        let mut plan = Plan::default();
        for (c, r) in courses {
            let mut previous: Option<Vec<u32>> = None;
            for status in statuses {
                plan = set(&plan, c, r, status);
                let eval = Evaluator::new(&tree, &plan);
                let totals: Vec<u32> = ancestors
                    .iter()
                    .filter_map(|a| tree.get(a))
                    .flat_map(|node| {
                        Threshold::ALL.into_iter().flat_map(move |t| {
                            [false, true]
                                .into_iter()
                                .map(move |excess| eval.registered_credits_count(node, t, excess))
                        })
                    })
                    .collect();
                if let Some(previous) = &previous {
                    assert!(totals.iter().zip(previous).all(|(now, before)| now >= before));
                }
                previous = Some(totals);
            }
        }
    }

    #[test]
    fn courses_missing_from_the_tree_are_ignored() {
        let tree = single_leaf(1);
        let plan = acquire(&Plan::default(), "UNKNOWN", "leaf");
        let eval = Evaluator::new(&tree, &plan);
        assert_eq!(
            eval.registered_credits_count(tree.root(), Threshold::Registered, true),
            0
        );
    }

    #[test]
    fn only_registered_filter_keeps_courses_counted_here() {
        let tree = RequirementTree::new(
            id("root"),
            [
                composite("root", 0, &["a", "b"]),
                leaf("a", 4, vec![course("X", 2), course("Y", 2), course("Z", 2)], false),
                leaf("b", 4, vec![course("X", 2)], false),
            ],
        )
        .unwrap();
        let plan = set(&Plan::default(), "Y", "a", RegistrationStatus::Registered);
        let plan = acquire(&plan, "X", "b");
        let eval = Evaluator::new(&tree, &plan);
        let a = tree.course_requirement(&id("a")).unwrap();

        let shown: Vec<&CourseCode> = eval
            .listed_courses(a, true)
            .into_iter()
            .map(|c| &c.code)
            .collect();
        assert_eq!(shown, vec![&code("Y")]);
        assert_eq!(eval.listed_courses(a, false).len(), 3);

        let x = &a.courses[0];
        assert_eq!(eval.assignment(a, x), Assignment::Elsewhere(&id("b")));
    }
}
