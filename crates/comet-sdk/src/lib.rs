//! High-level API over a comet workspace.
//!
//! [`Workspace`] ties together the consumer manifest, the local scope's
//! object store, the location map and the working directory. Every command
//! of the CLI is one method here:
//!
//! - [`Workspace::init`], [`Workspace::init_bare`]
//! - [`Workspace::create`], [`Workspace::add`]
//! - [`Workspace::commit`], [`Workspace::export`]
//! - [`Workspace::import`]
//! - [`Workspace::status`]

pub mod commit;
pub mod config;
pub mod error;
pub mod import;
pub mod workspace;

pub use commit::{CommitOutcome, ExportOutcome};
pub use config::{
    ComponentManifest, ConsumerManifest, Dist, Env, ScopeConfig, Sources, MANIFEST_FILE,
    SCOPE_FILE,
};
pub use error::{SdkError, SdkResult};
pub use import::{ImportOptions, ImportOutcome, DEPENDENCIES_DIR};
pub use workspace::{
    AddOutcome, Workspace, WorkspaceLoader, DEFAULT_SCOPE_NAME, PACKAGES_DIR, SCOPE_DIR,
};

pub use comet_map::Origin;
pub use comet_status::StatusReport;
pub use comet_types::{ComponentId, Diagnostic, Diagnostics, VersionSpec};
