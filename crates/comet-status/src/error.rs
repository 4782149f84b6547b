use comet_map::MapError;
use comet_store::StoreError;
use comet_types::ComponentId;
use comet_version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("version error: {0}")]
    Version(#[from] VersionError),

    #[error("map error: {0}")]
    Map(#[from] MapError),

    /// The working-directory loader failed for a component.
    #[error("failed to load {id} from the working directory: {source}")]
    Loader {
        id: ComponentId,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("a status worker thread panicked")]
    WorkerPanicked,
}

pub type StatusResult<T> = Result<T, StatusError>;
