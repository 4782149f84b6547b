use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use comet_types::{ComponentId, ObjectId, VersionSpec};

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::record::ComponentRecord;
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests, remote stand-ins and embedding. Objects and records sit
/// behind `RwLock`s for safe concurrent access and are cloned on read/write.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
    components: RwLock<BTreeMap<ComponentId, ComponentRecord>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            components: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of content objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns `true` if the store holds no content objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .map(|m| m.values().map(|obj| obj.size).sum())
            .unwrap_or(0)
    }

    fn objects_read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<ObjectId, StoredObject>>> {
        self.objects
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn objects_write(
        &self,
    ) -> StoreResult<RwLockWriteGuard<'_, HashMap<ObjectId, StoredObject>>> {
        self.objects
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn components_read(
        &self,
    ) -> StoreResult<RwLockReadGuard<'_, BTreeMap<ComponentId, ComponentRecord>>> {
        self.components
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn components_write(
        &self,
    ) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<ComponentId, ComponentRecord>>> {
        self.components
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

fn record_key(id: &ComponentId) -> ComponentId {
    id.with_version(VersionSpec::Latest)
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        Ok(self.objects_read()?.get(id).cloned())
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        // Same ID always maps to the same content, so keep the first copy.
        self.objects_write()?
            .entry(id)
            .or_insert_with(|| object.clone());
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.objects_read()?.contains_key(id))
    }

    fn read_component(&self, id: &ComponentId) -> StoreResult<Option<ComponentRecord>> {
        Ok(self.components_read()?.get(&record_key(id)).cloned())
    }

    fn write_component(&self, record: &ComponentRecord) -> StoreResult<()> {
        if !record.id.has_scope() {
            return Err(StoreError::UnscopedRecord(record.id.clone()));
        }
        self.components_write()?
            .insert(record_key(&record.id), record.clone());
        Ok(())
    }

    fn remove_component(&self, id: &ComponentId) -> StoreResult<bool> {
        Ok(self.components_write()?.remove(&record_key(id)).is_some())
    }

    fn component_ids(&self) -> StoreResult<Vec<ComponentId>> {
        Ok(self.components_read()?.keys().cloned().collect())
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}
