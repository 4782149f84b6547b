use comet_crypto::HasherError;
use comet_store::StoreError;

/// Errors from building, hashing or persisting versions.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    /// Two source files claim the same relative path.
    #[error("duplicate file path in component: {0}")]
    DuplicatePath(String),

    /// A version object could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("hash error: {0}")]
    Hasher(#[from] HasherError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type VersionResult<T> = Result<T, VersionError>;
