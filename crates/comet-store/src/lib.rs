//! Content-addressed object storage for comet.
//!
//! A scope's store holds two things:
//!
//! - **Content objects**: source files and serialized versions, keyed by the
//!   BLAKE3 hash of their bytes (domain-separated by [`ObjectKind`]). They are
//!   append-only: writing identical bytes twice returns the same key and
//!   stores nothing new; nothing is ever deleted or rewritten in place.
//! - **Component records**: one [`ComponentRecord`] per scoped component,
//!   mapping each committed version number to the key of its version object.
//!   Records are the only mutable layer, the way refs sit on top of objects.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsObjectStore`] -- sharded directory layout with atomic file writes

pub mod error;
pub mod fs;
pub mod memory;
pub mod object;
pub mod record;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{ObjectKind, SourceObject, StoredObject};
pub use record::ComponentRecord;
pub use traits::ObjectStore;
