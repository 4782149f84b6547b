use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a component's files are present in the working directory.
///
/// Variants are ordered by precedence: merging two origins keeps the
/// greater one, so `Nested` can be upgraded but `Imported` is never
/// downgraded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Origin {
    /// Pulled in only as a transitive dependency of an imported component.
    Nested,
    /// Created locally and never imported.
    Authored,
    /// Fetched explicitly by name.
    Imported,
}

impl Origin {
    /// Origin after registering `incoming` over an existing `self`.
    pub fn merge(self, incoming: Origin) -> Origin {
        self.max(incoming)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Nested => "NESTED",
            Self::Authored => "AUTHORED",
            Self::Imported => "IMPORTED",
        };
        f.write_str(s)
    }
}

/// Where one component lives on disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MapEntry {
    /// Component-relative path to workspace-relative disk path.
    pub files: BTreeMap<String, String>,
    pub origin: Origin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_file: Option<String>,
    /// Directory the component was materialized into, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<String>,
}

impl MapEntry {
    pub fn new(files: BTreeMap<String, String>, origin: Origin) -> Self {
        Self {
            files,
            origin,
            main_file: None,
            root_dir: None,
        }
    }

    /// Disk path registered for a component-relative path.
    pub fn disk_path(&self, relative: &str) -> Option<&str> {
        self.files.get(relative).map(String::as_str)
    }
}
