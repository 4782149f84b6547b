use comet_types::{ComponentId, ObjectId};

use crate::error::{StoreError, StoreResult};
use crate::object::{SourceObject, StoredObject};
use crate::record::ComponentRecord;

/// Lazy iterator over the component records of a store.
pub type ComponentRecords<'a> = Box<dyn Iterator<Item = StoreResult<ComponentRecord>> + 'a>;

/// Content-addressed object store plus the component records that point into
/// it.
///
/// All implementations must satisfy these invariants:
/// - Content objects are immutable once written: the same data always
///   produces the same ID, and a second write of it is a no-op.
/// - Once `write` has returned an ID, `read` returns byte-identical content
///   for the lifetime of the store (no deletion, no compaction).
/// - Concurrent reads are always safe.
/// - Component records are the only mutable state and are keyed by their
///   scoped, version-less id.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read an object by its content-addressed ID.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its content-addressed ID.
    ///
    /// If the object already exists, this is a no-op.
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Read the record of a scoped component. The version part of `id` is
    /// ignored.
    fn read_component(&self, id: &ComponentId) -> StoreResult<Option<ComponentRecord>>;

    /// Insert or replace a component record.
    fn write_component(&self, record: &ComponentRecord) -> StoreResult<()>;

    /// Drop a component record (the objects it points at stay). Used when a
    /// record moves to another scope on export.
    fn remove_component(&self, id: &ComponentId) -> StoreResult<bool>;

    /// Sorted snapshot of every component record id.
    fn component_ids(&self) -> StoreResult<Vec<ComponentId>>;

    /// Read an object, failing with [`StoreError::NotFound`] if absent.
    fn get(&self, id: &ObjectId) -> StoreResult<StoredObject> {
        self.read(id)?.ok_or(StoreError::NotFound(*id))
    }

    /// Store raw source bytes and return their key.
    fn put(&self, bytes: &[u8]) -> StoreResult<ObjectId> {
        self.write(&SourceObject::new(bytes).to_stored_object())
    }

    /// Enumerate component records.
    ///
    /// Ids are snapshotted up front and each record is read on demand, so
    /// the iterator is finite even if records change meanwhile; call again to
    /// restart.
    fn list_components(&self) -> StoreResult<ComponentRecords<'_>> {
        let ids = self.component_ids()?;
        Ok(Box::new(ids.into_iter().filter_map(move |id| {
            self.read_component(&id).transpose()
        })))
    }

    /// Write multiple objects in a batch and return their IDs.
    fn write_batch(&self, objects: &[StoredObject]) -> StoreResult<Vec<ObjectId>> {
        objects.iter().map(|obj| self.write(obj)).collect()
    }
}
