//! Status engine for comet.
//!
//! [`ComponentsList`] combines the location map, the object store and a scan
//! of the working directory to classify components. The four flags are
//! computed independently:
//!
//! - **untracked**: found under the layout directory but not in the map;
//! - **new**: in the map but never stored;
//! - **modified**: stored latest differs from the working copy;
//! - **staged**: stored under the local scope, not yet exported.
//!
//! Derived lists are cached on the [`ListCache`] owned by the list and
//! dropped with [`ComponentsList::invalidate`].

pub mod error;
pub mod list;
pub mod report;

pub use error::{StatusError, StatusResult};
pub use list::{ComponentLoader, ComponentsList, ListCache, LoadResult};
pub use report::StatusReport;
