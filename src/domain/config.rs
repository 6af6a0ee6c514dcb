use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration for a planner workspace.
///
/// Names the static input files and the file the plan is saved to. Relative
/// paths are resolved against the workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Versions")]
pub struct Config {
    /// The course catalog (YAML).
    catalog: PathBuf,

    /// The requirement tree (YAML).
    requirements: PathBuf,

    /// Where the plan snapshot is read from and saved to (JSON).
    plan: PathBuf,

    /// Whether course listings show only the courses counted toward each
    /// requirement by default.
    pub only_registered: bool,
}

/// Errors that can occur when loading a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file")]
    Read(#[from] std::io::Error),

    /// The file is not a valid configuration.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Whether the config file does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Read(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            requirements: default_requirements(),
            plan: default_plan(),
            only_registered: false,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// The catalog path, resolved against `root`.
    #[must_use]
    pub fn catalog_path(&self, root: &Path) -> PathBuf {
        root.join(&self.catalog)
    }

    /// The requirement tree path, resolved against `root`.
    #[must_use]
    pub fn requirements_path(&self, root: &Path) -> PathBuf {
        root.join(&self.requirements)
    }

    /// The plan path, resolved against `root`.
    #[must_use]
    pub fn plan_path(&self, root: &Path) -> PathBuf {
        root.join(&self.plan)
    }
}

fn default_catalog() -> PathBuf {
    PathBuf::from("catalog.yaml")
}

fn default_requirements() -> PathBuf {
    PathBuf::from("requirements.yaml")
}

fn default_plan() -> PathBuf {
    PathBuf::from("plan.json")
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Deserialize)]
#[serde(tag = "_version", deny_unknown_fields)]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_catalog")]
        catalog: PathBuf,

        #[serde(default = "default_requirements")]
        requirements: PathBuf,

        #[serde(default = "default_plan")]
        plan: PathBuf,

        #[serde(default)]
        only_registered: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                catalog,
                requirements,
                plan,
                only_registered,
            } => Self {
                catalog,
                requirements,
                plan,
                only_registered,
            },
        }
    }
}
