use std::path::PathBuf;

use comet_types::ComponentId;

/// Errors from the location map and the file-system collaborator.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// No entry and no default layout can place this component.
    #[error("path not registered for {id}: {reason}")]
    PathNotRegistered { id: ComponentId, reason: String },

    /// A non-overwriting write hit an existing file.
    #[error("file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The directory-structure template could not be parsed.
    #[error("invalid directory structure {template:?}: {reason}")]
    InvalidStructure { template: String, reason: String },

    #[error("malformed map file {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MapResult<T> = Result<T, MapError>;
