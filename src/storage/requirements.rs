//! The requirement tree file.
//!
//! Nodes nest directly and are tagged by `kind`. Course leaves list catalog
//! codes; the course details are taken from the catalog.
//!
//! ```yaml
//! _version: "1"
//! root:
//!   kind: composite
//!   title: Graduation
//!   credits: 124
//!   children:
//!     - kind: courses
//!       title: Foundations
//!       credits: { min: 4, max: 8 }
//!       courses: [GB10001, GB10002]
//!     - kind: selection
//!       title: Major
//!       choices:
//!         - kind: courses
//!           title: Systems
//!           credits: 20
//!           allows_others: true
//! ```
//!
//! A node without an explicit `id` is identified by the titles on the path
//! from the root, joined by `/` (`Graduation/Major/Systems` above).

use std::path::Path;

use nonempty::NonEmpty;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    domain::{
        Catalog, CompositeRequirement, ConfigurationError, CourseCode, CourseRequirement,
        CreditsRange, Requirement, RequirementId, RequirementTree, SelectionRequirement,
    },
    storage::yaml::{self, LoadError},
};

#[derive(Debug, Deserialize)]
#[serde(tag = "_version")]
enum RequirementsFile {
    #[serde(rename = "1")]
    V1 { root: Node },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Node {
    Composite {
        id: Option<String>,
        title: String,
        description: Option<String>,
        credits: Credits,
        #[serde(default)]
        children: Vec<Node>,
    },
    Courses {
        id: Option<String>,
        title: String,
        description: Option<String>,
        credits: Credits,
        #[serde(default)]
        courses: Vec<String>,
        #[serde(default)]
        allows_others: bool,
    },
    Selection {
        id: Option<String>,
        title: String,
        #[serde(default)]
        choices: Vec<Node>,
    },
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum Credits {
    Exact(u32),
    Range { min: u32, max: u32 },
}

impl Node {
    fn id(&self) -> Option<&str> {
        match self {
            Self::Composite { id, .. } | Self::Courses { id, .. } | Self::Selection { id, .. } => {
                id.as_deref()
            }
        }
    }

    fn title(&self) -> &str {
        match self {
            Self::Composite { title, .. }
            | Self::Courses { title, .. }
            | Self::Selection { title, .. } => title,
        }
    }
}

/// Flattens nested nodes into the arena the tree is built from.
struct Builder<'c> {
    catalog: &'c Catalog,
    nodes: Vec<Requirement>,
}

impl Builder<'_> {
    fn add(
        &mut self,
        node: Node,
        parent: Option<&RequirementId>,
    ) -> Result<RequirementId, ConfigurationError> {
        let id = match (node.id(), parent) {
            (Some(id), _) => RequirementId::new(id)?,
            (None, Some(parent)) => RequirementId::new(parent.child(node.title()))?,
            (None, None) => RequirementId::new(node.title())?,
        };

        let requirement = match node {
            Node::Composite {
                title,
                description,
                credits,
                children,
                ..
            } => {
                let credits = credits_range(&id, credits)?;
                let children = children
                    .into_iter()
                    .map(|child| self.add(child, Some(&id)))
                    .collect::<Result<_, _>>()?;
                Requirement::Composite(CompositeRequirement {
                    id: id.clone(),
                    title,
                    description,
                    credits,
                    children,
                })
            }
            Node::Courses {
                title,
                description,
                credits,
                courses,
                allows_others,
                ..
            } => {
                let credits = credits_range(&id, credits)?;
                let courses = courses
                    .into_iter()
                    .map(|code| {
                        let code = CourseCode::new(code)?;
                        self.catalog.get(&code).cloned().ok_or_else(|| {
                            ConfigurationError::UnknownCourse {
                                requirement: id.clone(),
                                code,
                            }
                        })
                    })
                    .collect::<Result<_, _>>()?;
                Requirement::Courses(CourseRequirement {
                    id: id.clone(),
                    title,
                    description,
                    credits,
                    courses,
                    allows_others,
                })
            }
            Node::Selection { title, choices, .. } => {
                let choices = choices
                    .into_iter()
                    .map(|choice| self.add(choice, Some(&id)))
                    .collect::<Result<Vec<_>, _>>()?;
                let choices = NonEmpty::from_vec(choices)
                    .ok_or_else(|| ConfigurationError::EmptySelection(id.clone()))?;
                Requirement::Selection(SelectionRequirement {
                    id: id.clone(),
                    title,
                    choices,
                })
            }
        };

        self.nodes.push(requirement);
        Ok(id)
    }
}

fn credits_range(id: &RequirementId, credits: Credits) -> Result<CreditsRange, ConfigurationError> {
    match credits {
        Credits::Exact(credits) => Ok(CreditsRange::exact(credits)),
        Credits::Range { min, max } => {
            CreditsRange::new(min, max).map_err(|source| ConfigurationError::InvalidCredits {
                requirement: id.clone(),
                source,
            })
        }
    }
}

impl RequirementsFile {
    fn into_tree(self, catalog: &Catalog) -> Result<RequirementTree, LoadError> {
        let Self::V1 { root } = self;
        let mut builder = Builder {
            catalog,
            nodes: Vec::new(),
        };
        let root = builder.add(root, None)?;
        Ok(RequirementTree::new(root, builder.nodes)?)
    }
}

/// Loads the requirement tree from a YAML file, resolving course codes
/// against `catalog`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the tree it
/// describes is invalid.
#[instrument(level = "debug", skip(catalog))]
pub fn load(path: &Path, catalog: &Catalog) -> Result<RequirementTree, LoadError> {
    yaml::read::<RequirementsFile>(path)?.into_tree(catalog)
}

/// Parses a requirement tree from YAML text.
///
/// # Errors
///
/// As for [`load`], minus the I/O.
pub fn parse(content: &str, catalog: &Catalog) -> Result<RequirementTree, LoadError> {
    serde_yaml::from_str::<RequirementsFile>(content)?.into_tree(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{code, course, id};

    fn catalog() -> Catalog {
        Catalog::new([course("GB10001", 2), course("GB10002", 1), course("GB20001", 4)]).unwrap()
    }

    const TREE: &str = r#"
_version: "1"
root:
  kind: composite
  title: Graduation
  credits: 12
  children:
    - kind: courses
      title: Foundations
      description: First-year courses
      credits: { min: 2, max: 3 }
      courses: [GB10001, GB10002]
    - kind: selection
      id: major
      title: Major
      choices:
        - kind: courses
          title: Systems
          credits: 4
          courses: [GB20001]
          allows_others: true
        - kind: composite
          title: Theory
          credits: 4
"#;

    #[test]
    fn derives_ids_from_title_paths() {
        let tree = parse(TREE, &catalog()).unwrap();
        assert_eq!(tree.root().id(), &id("Graduation"));
        assert!(tree.get(&id("Graduation/Foundations")).is_some());
        assert!(tree.selection(&id("major")).is_some());
        assert!(tree.get(&id("major/Systems")).is_some());
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn resolves_courses_and_credits() {
        let tree = parse(TREE, &catalog()).unwrap();
        let leaf = tree.course_requirement(&id("Graduation/Foundations")).unwrap();
        assert_eq!(leaf.credits, CreditsRange::new(2, 3).unwrap());
        assert_eq!(leaf.description.as_deref(), Some("First-year courses"));
        assert_eq!(leaf.courses[1].credits, 1);
        assert!(!leaf.allows_others);
        assert!(tree.course_requirement(&id("major/Systems")).unwrap().allows_others);
    }

    #[test]
    fn keeps_choice_order() {
        let tree = parse(TREE, &catalog()).unwrap();
        let major = tree.selection(&id("major")).unwrap();
        assert_eq!(major.default_choice(), &id("major/Systems"));
        assert!(major.offers(&id("major/Theory")));
    }

    fn configuration_error(content: &str) -> ConfigurationError {
        match parse(content, &catalog()).unwrap_err() {
            LoadError::Configuration(error) => error,
            other => panic!("expected a configuration error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_course() {
        let error = configuration_error(
            "_version: \"1\"\nroot: { kind: courses, title: R, credits: 1, courses: [NOPE] }\n",
        );
        assert_eq!(
            error,
            ConfigurationError::UnknownCourse {
                requirement: id("R"),
                code: code("NOPE"),
            }
        );
    }

    #[test]
    fn rejects_empty_selection() {
        let error =
            configuration_error("_version: \"1\"\nroot: { kind: selection, title: S, choices: [] }\n");
        assert_eq!(error, ConfigurationError::EmptySelection(id("S")));
    }

    #[test]
    fn rejects_inverted_credit_range() {
        let error = configuration_error(
            "_version: \"1\"\nroot: { kind: courses, title: R, credits: { min: 5, max: 2 } }\n",
        );
        assert!(matches!(error, ConfigurationError::InvalidCredits { .. }));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let content = r#"
_version: "1"
root:
  kind: composite
  title: R
  credits: 1
  children:
    - { kind: courses, title: A, credits: 1 }
    - { kind: courses, title: A, credits: 1 }
"#;
        assert_eq!(
            configuration_error(content),
            ConfigurationError::DuplicateRequirementId(id("R/A"))
        );
    }

    #[test]
    fn rejects_courses_listed_twice() {
        let error = configuration_error(
            "_version: \"1\"\nroot: { kind: courses, title: R, credits: 1, courses: [GB10001, GB10001] }\n",
        );
        assert!(matches!(
            error,
            ConfigurationError::DuplicateCourseInRequirement { .. }
        ));
    }

    #[test]
    fn rejects_unknown_kind() {
        let error = parse(
            "_version: \"1\"\nroot: { kind: elective, title: R }\n",
            &catalog(),
        )
        .unwrap_err();
        assert!(matches!(error, LoadError::Yaml(_)));
    }
}
