use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use comet_crypto::ContentHasher;
use comet_store::{ObjectKind, SourceObject, StoredObject};
use comet_types::{ComponentId, ObjectId};
use serde::{Deserialize, Serialize};

use crate::error::{VersionError, VersionResult};

/// What a file is for inside its component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    /// Implementation source (the manifest's `impl` file and its siblings).
    #[default]
    Impl,
    /// Test specification.
    Spec,
    /// Anything else shipped with the component.
    Other,
}

/// A file of a component version: relative path plus content key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileRef {
    pub path: String,
    pub object_id: ObjectId,
    pub role: FileRole,
}

/// A file read from the working directory, not yet stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the component root, `/`-separated.
    pub path: String,
    pub contents: Vec<u8>,
    pub role: FileRole,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, contents: impl Into<Vec<u8>>, role: FileRole) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
            role,
        }
    }

    pub fn to_source_object(&self) -> SourceObject {
        SourceObject::new(self.contents.clone())
    }
}

/// Dependencies declared by a component manifest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeclaredDependencies {
    /// Component dependencies: id to version constraint.
    #[serde(default)]
    pub components: BTreeMap<ComponentId, String>,
    /// External package dependencies the engine reports but never fetches.
    #[serde(default)]
    pub packages: BTreeMap<String, String>,
}

/// Commit metadata. Never part of the drift comparison.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LogEntry {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub date: DateTime<Utc>,
}

impl LogEntry {
    /// A log entry stamped with the current time.
    pub fn now(message: impl Into<String>, author: Option<String>) -> Self {
        Self {
            message: message.into(),
            author,
            date: Utc::now(),
        }
    }
}

/// Snapshot of one component version.
///
/// Immutable once persisted: the store key is the hash of its serialized form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Version {
    /// Files sorted by path.
    pub files: Vec<FileRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<ComponentId, String>,
    #[serde(default)]
    pub package_dependencies: BTreeMap<String, String>,
    /// Transitive component closure, as resolved at commit time.
    #[serde(default)]
    pub flattened_dependencies: BTreeSet<ComponentId>,
    pub log: LogEntry,
}

/// The part of a version that drift detection looks at. File roles are
/// left out: they are derived from the manifest of whoever loads the files.
#[derive(Serialize)]
struct ComparisonView<'a> {
    files: Vec<(&'a str, &'a ObjectId)>,
    dependencies: &'a BTreeMap<ComponentId, String>,
    package_dependencies: &'a BTreeMap<String, String>,
    flattened_dependencies: &'a BTreeSet<ComponentId>,
}

impl Version {
    /// Build a version from working-directory files. Nothing is persisted.
    ///
    /// The flattened set starts empty; it is filled by the resolver when the
    /// version is committed.
    pub fn from_file_system(
        files: &[SourceFile],
        declared: &DeclaredDependencies,
        main_file: Option<String>,
        lang: Option<String>,
    ) -> VersionResult<Self> {
        let mut refs: Vec<FileRef> = files
            .iter()
            .map(|f| FileRef {
                path: f.path.clone(),
                object_id: f.to_source_object().object_id(),
                role: f.role,
            })
            .collect();
        refs.sort();
        if let Some(dup) = refs.windows(2).find(|w| w[0].path == w[1].path) {
            return Err(VersionError::DuplicatePath(dup[0].path.clone()));
        }
        Ok(Self {
            files: refs,
            main_file,
            lang,
            dependencies: declared.components.clone(),
            package_dependencies: declared.packages.clone(),
            flattened_dependencies: BTreeSet::new(),
            log: LogEntry::default(),
        })
    }

    /// Deserialize a previously persisted version object.
    pub fn from_stored_object(obj: &StoredObject) -> VersionResult<Self> {
        obj.expect_kind(ObjectKind::Version)?;
        serde_json::from_slice(&obj.data).map_err(|e| VersionError::Serialization(e.to_string()))
    }

    /// Serialize into a storable object.
    pub fn to_stored_object(&self) -> VersionResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| VersionError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Version, data))
    }

    /// Store key of this version (log included).
    pub fn object_id(&self) -> VersionResult<ObjectId> {
        Ok(self.to_stored_object()?.compute_id())
    }

    /// Hash over files and dependency sets only; `log` is excluded.
    pub fn comparison_hash(&self) -> VersionResult<ObjectId> {
        let view = ComparisonView {
            files: self
                .files
                .iter()
                .map(|f| (f.path.as_str(), &f.object_id))
                .collect(),
            dependencies: &self.dependencies,
            package_dependencies: &self.package_dependencies,
            flattened_dependencies: &self.flattened_dependencies,
        };
        Ok(ContentHasher::COMPARISON.hash_json(&view)?)
    }

    /// Look up a file by relative path.
    pub fn file(&self, path: &str) -> Option<&FileRef> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Declared component dependencies as ids pinned to their constraint.
    ///
    /// A constraint that is not a valid version (`*`, `^1`) resolves as
    /// `latest`.
    pub fn dependency_ids(&self) -> Vec<ComponentId> {
        self.dependencies
            .iter()
            .map(|(id, constraint)| match constraint.parse() {
                Ok(version) => id.with_version(version),
                Err(_) => id.clone(),
            })
            .collect()
    }
}
