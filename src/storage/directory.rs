//! A filesystem backed planner workspace
//!
//! The [`Directory`] ties the static inputs (catalog and requirement tree)
//! to the plan saved next to them. The file names come from `config.toml` in
//! the workspace root; a missing config means the defaults.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    domain::{Catalog, Config, ConfigError, Evaluator, Plan, RequirementTree},
    storage::{
        catalog, requirements,
        snapshot::{ResolutionError, Snapshot},
        yaml::LoadError,
    },
};

/// A loaded planner workspace.
#[derive(Debug)]
pub struct Directory {
    /// The root of the workspace.
    root: PathBuf,
    config: Config,
    catalog: Catalog,
    tree: RequirementTree,
    plan: Plan,
}

/// Errors that can occur when opening or saving a workspace.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// `config.toml` exists but could not be read or parsed.
    #[error("invalid workspace configuration in {}", path.display())]
    Config {
        /// The config file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: ConfigError,
    },

    /// The catalog or requirement tree could not be loaded.
    #[error("failed to load {}", path.display())]
    Load {
        /// The file being loaded.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: LoadError,
    },

    /// A plan snapshot could not be read or resolved.
    #[error("failed to restore plan from {}", path.display())]
    Snapshot {
        /// The snapshot file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: ResolutionError,
    },

    /// A file could not be read or written.
    #[error("failed to access {}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

impl Directory {
    /// Opens the workspace at `root`.
    ///
    /// The saved plan is restored if the plan file exists; otherwise the plan
    /// starts empty.
    ///
    /// # Errors
    ///
    /// Fails if `config.toml` is present but invalid, if the catalog or
    /// requirement tree is missing or invalid, or if a saved plan no longer
    /// resolves against them.
    pub fn open(root: PathBuf) -> Result<Self, DirectoryError> {
        let config = load_config(&root)?;

        let catalog_path = config.catalog_path(&root);
        let catalog = catalog::load(&catalog_path).map_err(|source| DirectoryError::Load {
            path: catalog_path,
            source,
        })?;

        let requirements_path = config.requirements_path(&root);
        let tree = requirements::load(&requirements_path, &catalog).map_err(|source| {
            DirectoryError::Load {
                path: requirements_path,
                source,
            }
        })?;

        let plan_path = config.plan_path(&root);
        let plan = if plan_path.exists() {
            read_plan(&plan_path, &tree, &catalog)?
        } else {
            tracing::debug!("No saved plan at {}", plan_path.display());
            Plan::default()
        };

        Ok(Self {
            root,
            config,
            catalog,
            tree,
            plan,
        })
    }

    /// The workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The workspace configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The course catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The requirement tree.
    #[must_use]
    pub const fn tree(&self) -> &RequirementTree {
        &self.tree
    }

    /// The current plan.
    #[must_use]
    pub const fn plan(&self) -> &Plan {
        &self.plan
    }

    /// An evaluator over the current plan.
    #[must_use]
    pub const fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.tree, &self.plan)
    }

    /// Reads a snapshot from `path` and resolves it against this workspace.
    ///
    /// The current plan is left alone; pass the result to
    /// [`Self::save_plan`] to adopt it.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, or the snapshot is malformed or does
    /// not resolve.
    pub fn read_snapshot(&self, path: &Path) -> Result<Plan, DirectoryError> {
        read_plan(path, &self.tree, &self.catalog)
    }

    /// Makes `plan` the current plan and saves it to the plan file.
    ///
    /// The snapshot is written to a temporary file first and moved into place,
    /// so an interrupted save leaves the previous plan file intact.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written. The new plan is adopted in
    /// memory either way.
    pub fn save_plan(&mut self, plan: Plan) -> Result<(), DirectoryError> {
        self.plan = plan;
        let path = self.config.plan_path(&self.root);
        let content = Snapshot::from_plan(&self.plan).stamped().to_string_pretty();

        let tmp = path.with_extension("json.tmp");
        let io_error = |source| DirectoryError::Io {
            path: path.clone(),
            source,
        };
        fs::write(&tmp, content).map_err(io_error)?;
        fs::rename(&tmp, &path).map_err(io_error)?;

        tracing::debug!("Saved plan to {}", path.display());
        Ok(())
    }
}

fn load_config(root: &Path) -> Result<Config, DirectoryError> {
    let path = root.join("config.toml");
    match Config::load(&path) {
        Ok(config) => Ok(config),
        Err(e) if e.is_not_found() => {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Config::default())
        }
        Err(source) => Err(DirectoryError::Config { path, source }),
    }
}

fn read_plan(
    path: &Path,
    tree: &RequirementTree,
    catalog: &Catalog,
) -> Result<Plan, DirectoryError> {
    let content = fs::read_to_string(path).map_err(|source| DirectoryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    content
        .parse::<Snapshot>()
        .and_then(|snapshot| snapshot.resolve(tree, catalog))
        .map_err(|source| DirectoryError::Snapshot {
            path: path.to_path_buf(),
            source,
        })
}
