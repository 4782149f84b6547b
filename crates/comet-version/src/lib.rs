//! Component version model for comet.
//!
//! A [`Version`] is an immutable snapshot of one component version: its file
//! references, declared and flattened dependencies, and a [`LogEntry`].
//! Versions come from two places, modelled by [`Representation`]:
//!
//! - the working directory (`FileSystem`), built transiently and never
//!   persisted by construction;
//! - the object store (`Model`), deserialized from a stored version object.
//!
//! Both expose the same [`Representation::comparison_hash`], which ignores the
//! log so that only content drift is ever reported as a modification.

pub mod error;
pub mod representation;
pub mod version;

pub use error::{VersionError, VersionResult};
pub use representation::{is_modified, Representation};
pub use version::{DeclaredDependencies, FileRef, FileRole, LogEntry, SourceFile, Version};
