use std::collections::BTreeMap;

use crate::domain::{
    course::{Course, CourseCode},
    tree::ConfigurationError,
};

/// The static course catalog.
///
/// Loaded once at startup and read-only afterwards. Keeps the catalog's
/// original ordering for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    courses: Vec<Course>,
    index: BTreeMap<CourseCode, usize>,
}

impl Catalog {
    /// Builds a catalog from an ordered list of courses.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DuplicateCourse`] if two courses share a
    /// code, or [`ConfigurationError::ZeroCredits`] if a course is worth no
    /// credits.
    pub fn new(courses: impl IntoIterator<Item = Course>) -> Result<Self, ConfigurationError> {
        let courses: Vec<Course> = courses.into_iter().collect();
        let mut index = BTreeMap::new();
        for (position, course) in courses.iter().enumerate() {
            if course.credits == 0 {
                return Err(ConfigurationError::ZeroCredits(course.code.clone()));
            }
            if index.insert(course.code.clone(), position).is_some() {
                return Err(ConfigurationError::DuplicateCourse(course.code.clone()));
            }
        }
        Ok(Self { courses, index })
    }

    /// Looks up a course by code.
    #[must_use]
    pub fn get(&self, code: &CourseCode) -> Option<&Course> {
        self.index.get(code).map(|&position| &self.courses[position])
    }

    /// Whether the catalog contains `code`.
    #[must_use]
    pub fn contains(&self, code: &CourseCode) -> bool {
        self.index.contains_key(code)
    }

    /// All courses in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Course> {
        self.courses.iter()
    }

    /// The number of courses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::course;

    #[test]
    fn looks_up_by_code() {
        let catalog = Catalog::new([course("A1", 2), course("B1", 1)]).unwrap();
        let code = CourseCode::new("B1").unwrap();
        assert_eq!(catalog.get(&code).map(|c| c.credits), Some(1));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn rejects_duplicate_codes() {
        let err = Catalog::new([course("A1", 2), course("A1", 1)]).unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateCourse(_)));
    }

    #[test]
    fn rejects_zero_credit_courses() {
        let err = Catalog::new([course("A1", 0)]).unwrap_err();
        assert!(matches!(err, ConfigurationError::ZeroCredits(_)));
    }
}
