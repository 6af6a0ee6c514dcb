use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;

use crate::domain::ConfigurationError;

/// Errors that can occur when loading the catalog or the requirement tree.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file was not found.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// An I/O error occurred.
    #[error("failed to read {}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The YAML could not be parsed.
    #[error("failed to parse YAML")]
    Yaml(#[from] serde_yaml::Error),

    /// The document parsed, but describes an invalid catalog or tree.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

pub fn read<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    tracing::debug!("Read {}", path.display());
    Ok(serde_yaml::from_str(&content)?)
}
