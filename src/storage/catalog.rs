//! The course catalog file.
//!
//! ```yaml
//! _version: "1"
//! courses:
//!   - code: GB10001
//!     title: Introduction to Informatics
//!     credits: 2
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::instrument;

use crate::{
    domain::{Catalog, Course, CourseCode},
    storage::yaml::{self, LoadError},
};

#[derive(Debug, Deserialize)]
#[serde(tag = "_version")]
enum CatalogFile {
    #[serde(rename = "1")]
    V1 { courses: Vec<CourseEntry> },
}

#[derive(Debug, Deserialize)]
struct CourseEntry {
    code: String,
    title: String,
    credits: u32,
}

impl CatalogFile {
    fn into_catalog(self) -> Result<Catalog, LoadError> {
        let Self::V1 { courses } = self;
        let courses = courses
            .into_iter()
            .map(|entry| {
                Ok(Course {
                    code: CourseCode::new(entry.code)?,
                    title: entry.title,
                    credits: entry.credits,
                })
            })
            .collect::<Result<Vec<_>, crate::ConfigurationError>>()?;
        Ok(Catalog::new(courses)?)
    }
}

/// Loads the catalog from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if a course code
/// is invalid, duplicated, or worth no credits.
#[instrument(level = "debug")]
pub fn load(path: &Path) -> Result<Catalog, LoadError> {
    let catalog = yaml::read::<CatalogFile>(path)?.into_catalog()?;
    tracing::debug!("Loaded {} courses", catalog.len());
    Ok(catalog)
}

/// Parses a catalog from YAML text.
///
/// # Errors
///
/// As for [`load`], minus the I/O.
pub fn parse(content: &str) -> Result<Catalog, LoadError> {
    serde_yaml::from_str::<CatalogFile>(content)?.into_catalog()
}
