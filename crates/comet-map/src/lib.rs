//! Location map for comet.
//!
//! The [`LocationMap`] is the persisted bridge between logical component ids
//! and the files that hold them in the working directory. It decides where
//! files are written (override, root dir, then the [`DirStructure`] default
//! layout) and records why each component is present ([`Origin`]).
//!
//! The [`FileSystem`] trait is the narrow disk contract the engine relies on;
//! [`DiskFileSystem`] implements it over a workspace root.

pub mod entry;
pub mod error;
pub mod fs;
pub mod map;
pub mod structure;

pub use entry::{MapEntry, Origin};
pub use error::{MapError, MapResult};
pub use fs::{DiskFileSystem, FileSystem, WriteMode};
pub use map::{LocationMap, MAP_FILE_NAME};
pub use structure::{DirStructure, DEFAULT_STRUCTURE};
