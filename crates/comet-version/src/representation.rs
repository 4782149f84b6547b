use std::collections::BTreeSet;

use comet_store::{ObjectStore, StoredObject};
use comet_types::{ComponentId, ObjectId};
use tracing::debug;

use crate::error::VersionResult;
use crate::version::{DeclaredDependencies, LogEntry, SourceFile, Version};

/// Where a version snapshot came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Representation {
    /// Built from the working directory; carries the file contents so it can
    /// be persisted on commit.
    FileSystem {
        id: ComponentId,
        version: Version,
        sources: Vec<SourceFile>,
    },
    /// Loaded from the object store.
    Model {
        id: ComponentId,
        object_id: ObjectId,
        version: Version,
    },
}

impl Representation {
    /// Snapshot working-directory files without touching any store.
    pub fn from_file_system(
        id: ComponentId,
        sources: Vec<SourceFile>,
        declared: &DeclaredDependencies,
        main_file: Option<String>,
        lang: Option<String>,
    ) -> VersionResult<Self> {
        let version = Version::from_file_system(&sources, declared, main_file, lang)?;
        Ok(Self::FileSystem {
            id,
            version,
            sources,
        })
    }

    /// Decode a stored version object.
    pub fn from_stored_object(id: ComponentId, object: &StoredObject) -> VersionResult<Self> {
        Ok(Self::Model {
            id,
            object_id: object.compute_id(),
            version: Version::from_stored_object(object)?,
        })
    }

    /// Load a version object by key.
    pub fn load(
        store: &dyn ObjectStore,
        id: ComponentId,
        object_id: &ObjectId,
    ) -> VersionResult<Self> {
        let object = store.get(object_id)?;
        Self::from_stored_object(id, &object)
    }

    pub fn id(&self) -> &ComponentId {
        match self {
            Self::FileSystem { id, .. } | Self::Model { id, .. } => id,
        }
    }

    pub fn version(&self) -> &Version {
        match self {
            Self::FileSystem { version, .. } | Self::Model { version, .. } => version,
        }
    }

    pub fn into_version(self) -> Version {
        match self {
            Self::FileSystem { version, .. } | Self::Model { version, .. } => version,
        }
    }

    /// Store key, once persisted.
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Self::FileSystem { .. } => None,
            Self::Model { object_id, .. } => Some(*object_id),
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Model { .. })
    }

    /// See [`Version::comparison_hash`].
    pub fn comparison_hash(&self) -> VersionResult<ObjectId> {
        self.version().comparison_hash()
    }

    /// Write sources and the version object, turning a working-directory
    /// snapshot into a stored one.
    ///
    /// `flattened` and `log` are stamped onto the version first. Calling this
    /// on a `Model` only re-writes the version object, which is a no-op.
    pub fn persist(
        self,
        store: &dyn ObjectStore,
        flattened: BTreeSet<ComponentId>,
        log: LogEntry,
    ) -> VersionResult<Self> {
        match self {
            Self::FileSystem {
                id,
                mut version,
                sources,
            } => {
                let objects: Vec<StoredObject> = sources
                    .iter()
                    .map(|s| s.to_source_object().to_stored_object())
                    .collect();
                store.write_batch(&objects)?;
                version.flattened_dependencies = flattened;
                version.log = log;
                let object_id = store.write(&version.to_stored_object()?)?;
                debug!(%id, %object_id, files = sources.len(), "persisted version");
                Ok(Self::Model {
                    id,
                    object_id,
                    version,
                })
            }
            model @ Self::Model { .. } => {
                store.write(&model.version().to_stored_object()?)?;
                Ok(model)
            }
        }
    }
}

/// Has the working copy drifted from the stored version?
///
/// The stored log and flattened set are copied onto the current snapshot
/// before hashing, so only file contents and declared dependencies count.
pub fn is_modified(stored: &Version, current: &Version) -> VersionResult<bool> {
    let mut current = current.clone();
    current.log = stored.log.clone();
    current.flattened_dependencies = stored.flattened_dependencies.clone();
    Ok(stored.comparison_hash()? != current.comparison_hash()?)
}
