use comet_types::{ComponentId, ObjectId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote could not be reached or dropped the exchange.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("object {0} not found on remote")]
    ObjectNotFound(ObjectId),

    #[error("component {0} not found on remote")]
    ComponentNotFound(ComponentId),

    #[error("remote {remote} rejected push: {reason}")]
    Rejected { remote: String, reason: String },

    /// The remote already holds `version` of `id` with different content.
    #[error("{id} version {version} already exists on the remote with different content")]
    Conflict { id: ComponentId, version: u32 },

    #[error("store error: {0}")]
    Store(#[from] comet_store::StoreError),

    #[error("version error: {0}")]
    Version(#[from] comet_version::VersionError),
}

pub type SyncResult<T> = Result<T, SyncError>;
