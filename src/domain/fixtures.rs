// Small constructors for building trees in unit tests.

use nonempty::NonEmpty;

use crate::domain::{
    course::{Course, CourseCode},
    credits::CreditsRange,
    requirement::{
        CompositeRequirement, CourseRequirement, Requirement, RequirementId, SelectionRequirement,
    },
};

pub fn id(s: &str) -> RequirementId {
    RequirementId::new(s).unwrap()
}

pub fn code(s: &str) -> CourseCode {
    CourseCode::new(s).unwrap()
}

pub fn course(code_str: &str, credits: u32) -> Course {
    Course {
        code: code(code_str),
        title: format!("Course {code_str}"),
        credits,
    }
}

pub fn composite(name: &str, credits: u32, children: &[&str]) -> Requirement {
    composite_range(name, CreditsRange::exact(credits), children)
}

pub fn composite_range(name: &str, credits: CreditsRange, children: &[&str]) -> Requirement {
    Requirement::Composite(CompositeRequirement {
        id: id(name),
        title: name.to_string(),
        description: None,
        credits,
        children: children.iter().map(|child| id(child)).collect(),
    })
}

pub fn leaf(name: &str, credits: u32, courses: Vec<Course>, allows_others: bool) -> Requirement {
    leaf_range(name, CreditsRange::exact(credits), courses, allows_others)
}

pub fn leaf_range(
    name: &str,
    credits: CreditsRange,
    courses: Vec<Course>,
    allows_others: bool,
) -> Requirement {
    Requirement::Courses(CourseRequirement {
        id: id(name),
        title: name.to_string(),
        description: None,
        credits,
        courses,
        allows_others,
    })
}

pub fn selection(name: &str, choices: &[&str]) -> Requirement {
    let choices: Vec<_> = choices.iter().map(|choice| id(choice)).collect();
    Requirement::Selection(SelectionRequirement {
        id: id(name),
        title: name.to_string(),
        choices: NonEmpty::from_vec(choices).unwrap(),
    })
}
