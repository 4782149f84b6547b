//! Foundation types for comet.
//!
//! This crate provides the identity and addressing types shared by every other
//! comet crate.
//!
//! # Key Types
//!
//! - [`ComponentId`] -- Four-part logical name of a component (scope, namespace, name, version)
//! - [`VersionSpec`] -- Either `latest` or an exact committed version number
//! - [`ObjectId`] -- Content-addressed identifier (BLAKE3 hash)
//! - [`Diagnostic`] -- Non-fatal warnings returned beside primary results

pub mod diagnostic;
pub mod error;
pub mod identity;
pub mod object;

pub use diagnostic::{Diagnostic, Diagnostics};
pub use error::TypeError;
pub use identity::{ComponentId, VersionSpec, DEFAULT_NAMESPACE};
pub use object::ObjectId;
