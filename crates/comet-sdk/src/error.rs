use std::path::PathBuf;

use comet_types::ComponentId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("no comet workspace at {}", .0.display())]
    NotInitialized(PathBuf),

    #[error("a comet workspace already exists at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("manifest already exists: {}", .0.display())]
    ManifestAlreadyExists(PathBuf),

    #[error("invalid manifest {}: {reason}", path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("component not found: {0}")]
    ComponentNotFound(ComponentId),

    #[error("component already exists: {0}")]
    ComponentAlreadyExists(ComponentId),

    #[error("component is not tracked: {0}")]
    NotTracked(ComponentId),

    #[error("component has no files on disk: {0}")]
    FilesMissing(ComponentId),

    #[error("nothing to export for {0}")]
    NothingToExport(ComponentId),

    #[error("remote not found: {0}")]
    RemoteNotFound(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Identity(#[from] comet_types::TypeError),

    #[error("store error: {0}")]
    Store(#[from] comet_store::StoreError),

    #[error("version error: {0}")]
    Version(#[from] comet_version::VersionError),

    #[error("map error: {0}")]
    Map(#[from] comet_map::MapError),

    #[error("resolve error: {0}")]
    Resolve(#[from] comet_resolve::ResolveError),

    #[error("status error: {0}")]
    Status(#[from] comet_status::StatusError),

    #[error("sync error: {0}")]
    Sync(#[from] comet_sync::SyncError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
