/// Loading the course catalog.
pub mod catalog;
pub mod directory;
/// Loading the requirement tree.
pub mod requirements;
pub mod snapshot;
mod yaml;

pub use directory::{Directory, DirectoryError};
pub use snapshot::{ResolutionError, Snapshot, from_json, to_json};
pub use yaml::LoadError;
