//! On-disk object store.
//!
//! Layout under the store root:
//!
//! ```text
//! objects/<2 hex>/<62 hex>      "<kind>\n" followed by the raw payload
//! components/<scope~ns~name>.json   one ComponentRecord per file
//! ```
//!
//! Every file is written to a temporary file in its destination directory and
//! then persisted over the final name, so readers never observe a partial
//! write. Reads re-hash the payload and reject anything that does not match
//! its key.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use comet_types::{ComponentId, ObjectId};
use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::record::ComponentRecord;
use crate::traits::ObjectStore;

const OBJECTS_DIR: &str = "objects";
const COMPONENTS_DIR: &str = "components";

/// Object store backed by a directory tree.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(OBJECTS_DIR))?;
        fs::create_dir_all(root.join(COMPONENTS_DIR))?;
        debug!(root = %root.display(), "opened object store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, id: &ObjectId) -> PathBuf {
        let (shard, rest) = id.shard();
        self.root.join(OBJECTS_DIR).join(shard).join(rest)
    }

    fn component_path(&self, id: &ComponentId) -> PathBuf {
        self.root
            .join(COMPONENTS_DIR)
            .join(format!("{}.json", ComponentRecord::storage_key(id)))
    }

    fn decode(id: &ObjectId, raw: &[u8]) -> StoreResult<StoredObject> {
        let split = raw
            .iter()
            .position(|b| *b == b'\n')
            .ok_or_else(|| StoreError::CorruptObject {
                id: *id,
                reason: "missing kind header".into(),
            })?;
        let tag = std::str::from_utf8(&raw[..split]).unwrap_or_default();
        let kind = ObjectKind::from_tag(tag).ok_or_else(|| StoreError::CorruptObject {
            id: *id,
            reason: format!("unknown object kind {tag:?}"),
        })?;
        let object = StoredObject::new(kind, raw[split + 1..].to_vec());
        let computed = object.compute_id();
        if computed != *id {
            return Err(StoreError::HashMismatch { id: *id, computed });
        }
        Ok(object)
    }
}

/// Write `bytes` to `dest` through a sibling temporary file.
pub(crate) fn write_atomic(dest: &Path, bytes: &[u8]) -> StoreResult<()> {
    let dir = dest
        .parent()
        .ok_or_else(|| std::io::Error::other(format!("{} has no parent", dest.display())))?;
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

impl ObjectStore for FsObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let path = self.object_path(id);
        match fs::read(&path) {
            Ok(raw) => Self::decode(id, &raw).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        let path = self.object_path(&id);
        if path.exists() {
            trace!(%id, "object already stored");
            return Ok(id);
        }
        let mut raw = Vec::with_capacity(object.data.len() + 8);
        raw.extend_from_slice(object.kind.tag().as_bytes());
        raw.push(b'\n');
        raw.extend_from_slice(&object.data);
        write_atomic(&path, &raw)?;
        debug!(%id, kind = %object.kind, size = object.size, "stored object");
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).is_file())
    }

    fn read_component(&self, id: &ComponentId) -> StoreResult<Option<ComponentRecord>> {
        let path = self.component_path(id);
        match fs::read(&path) {
            Ok(raw) => serde_json::from_slice(&raw)
                .map(Some)
                .map_err(|e| StoreError::Serialization(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_component(&self, record: &ComponentRecord) -> StoreResult<()> {
        if !record.id.has_scope() {
            return Err(StoreError::UnscopedRecord(record.id.clone()));
        }
        let json = serde_json::to_vec_pretty(record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        write_atomic(&self.component_path(&record.id), &json)?;
        debug!(id = %record.id, versions = record.versions.len(), "wrote component record");
        Ok(())
    }

    fn remove_component(&self, id: &ComponentId) -> StoreResult<bool> {
        match fs::remove_file(self.component_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn component_ids(&self) -> StoreResult<Vec<ComponentId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(self.root.join(COMPONENTS_DIR))? {
            let path = entry?.path();
            let Some(stem) = path
                .extension()
                .filter(|ext| *ext == "json")
                .and_then(|_| path.file_stem())
                .and_then(|s| s.to_str())
            else {
                continue;
            };
            let id = ComponentId::parse(&stem.replace('~', "/"))
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            ids.push(id);
        }
        ids.sort();
        Ok(ids)
    }
}
