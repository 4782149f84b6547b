//! Dependency resolution for comet.
//!
//! [`DependencyResolver`] walks declared component dependencies breadth
//! first and produces a [`Flattened`] closure keyed by namespace/name, so a
//! dependency shared by several importers appears once. Versions are loaded
//! through a [`DependencySource`]; [`StoreSource`] reads a local object store.

pub mod error;
pub mod resolver;
pub mod source;

pub use error::{ResolveError, ResolveResult};
pub use resolver::{DependencyResolver, Flattened};
pub use source::{DependencySource, ResolvedComponent, StoreSource};
