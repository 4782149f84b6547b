use comet_store::StoreError;
use comet_version::VersionError;

/// Errors that abort a resolution.
///
/// A dependency that simply cannot be found is not an error; it is reported
/// as a diagnostic on the [`Flattened`](crate::Flattened) result.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("version error: {0}")]
    Version(#[from] VersionError),

    /// Failure inside a custom source, such as a remote transport.
    #[error("dependency source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type ResolveResult<T> = Result<T, ResolveError>;
