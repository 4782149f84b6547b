//! Non-fatal findings reported beside a primary result.
//!
//! Missing package dependencies, orphaned model entries and resolver policy
//! decisions never abort an operation. They are collected into a
//! [`Diagnostics`] list so callers decide whether to treat them as fatal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::ComponentId;

/// A single warning-level finding.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Diagnostic {
    /// A declared package dependency is neither a known component nor
    /// installed locally.
    MissingPackageDependency { name: String, version: String },
    /// A component exists in the store but has no file-system counterpart.
    OrphanedModel { id: ComponentId },
    /// A dependency could not be loaded from the store or any remote.
    UnresolvedDependency { id: ComponentId },
    /// Two dependency paths declared the same component at different
    /// versions; the later one replaced the earlier one.
    VersionOverride {
        replaced: ComponentId,
        kept: ComponentId,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPackageDependency { name, version } => {
                write!(f, "missing package dependency {name}: {version}")
            }
            Self::OrphanedModel { id } => {
                write!(f, "component {id} exists in the model but not on the file system")
            }
            Self::UnresolvedDependency { id } => write!(f, "could not resolve dependency {id}"),
            Self::VersionOverride { replaced, kept } => {
                write!(f, "dependency {replaced} was replaced by {kept}")
            }
        }
    }
}

/// Ordered, de-duplicated collection of [`Diagnostic`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding; duplicates are dropped.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if !self.0.contains(&diagnostic) {
            self.0.push(diagnostic);
        }
    }

    /// Append every finding from `other`.
    pub fn extend(&mut self, other: Diagnostics) {
        for d in other.0 {
            self.push(d);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Only the missing package dependencies, as `(name, version)` pairs.
    pub fn missing_packages(&self) -> Vec<(&str, &str)> {
        self.0
            .iter()
            .filter_map(|d| match d {
                Diagnostic::MissingPackageDependency { name, version } => {
                    Some((name.as_str(), version.as_str()))
                }
                _ => None,
            })
            .collect()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
