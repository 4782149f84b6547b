//! Object exchange between a local scope and remote scopes.
//!
//! [`RemoteTransport`] is the narrow contract the engine needs from a
//! remote: fetch and push content objects, read and write component records.
//! Failures surface as [`SyncError::Transport`] and are never retried.
//! [`StoreRemote`] serves a remote scope straight from an [`ObjectStore`],
//! which is how directory-backed remotes are reached.
//!
//! [`ObjectStore`]: comet_store::ObjectStore

pub mod error;
pub mod transfer;
pub mod transport;
pub mod types;

pub use error::{SyncError, SyncResult};
pub use transfer::{collect_version_objects, fetch_objects, push_component};
pub use transport::{RemoteTransport, StoreRemote};
pub use types::{PushAck, PushResult};
