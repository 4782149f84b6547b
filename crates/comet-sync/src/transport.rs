use std::sync::Arc;

use async_trait::async_trait;
use comet_store::{ComponentRecord, ObjectStore, StoreError, StoredObject};
use comet_types::{ComponentId, ObjectId};
use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::types::PushAck;

/// Transport interface for remote scopes.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Name of the scope this remote owns.
    fn scope_name(&self) -> &str;

    async fn fetch_object(&self, id: &ObjectId) -> SyncResult<StoredObject>;

    /// Push content objects. Each object is stored atomically; objects the
    /// remote already holds are acknowledged without rewriting.
    async fn push_objects(&self, objects: &[StoredObject]) -> SyncResult<PushAck>;

    async fn fetch_component(&self, id: &ComponentId) -> SyncResult<Option<ComponentRecord>>;

    /// Replace the remote record of a component. The record must carry the
    /// remote's scope.
    async fn push_component(&self, record: &ComponentRecord) -> SyncResult<()>;
}

/// A remote scope served directly from an object store.
#[derive(Clone)]
pub struct StoreRemote {
    name: String,
    store: Arc<dyn ObjectStore>,
}

impl StoreRemote {
    pub fn new(name: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }
}

fn transport_error(err: StoreError) -> SyncError {
    match err {
        StoreError::NotFound(id) => SyncError::ObjectNotFound(id),
        StoreError::Io(e) => SyncError::Transport(e.to_string()),
        other => SyncError::Store(other),
    }
}

#[async_trait]
impl RemoteTransport for StoreRemote {
    fn scope_name(&self) -> &str {
        &self.name
    }

    async fn fetch_object(&self, id: &ObjectId) -> SyncResult<StoredObject> {
        self.store.get(id).map_err(transport_error)
    }

    async fn push_objects(&self, objects: &[StoredObject]) -> SyncResult<PushAck> {
        let mut ack = PushAck::default();
        for object in objects {
            let id = object.compute_id();
            if self.store.exists(&id).map_err(transport_error)? {
                ack.already_present += 1;
                continue;
            }
            self.store.write(object).map_err(transport_error)?;
            ack.accepted.push(id);
        }
        debug!(
            remote = %self.name,
            accepted = ack.accepted.len(),
            already_present = ack.already_present,
            "pushed objects"
        );
        Ok(ack)
    }

    async fn fetch_component(&self, id: &ComponentId) -> SyncResult<Option<ComponentRecord>> {
        let id = id.with_scope(Some(self.name.as_str()));
        self.store.read_component(&id).map_err(transport_error)
    }

    async fn push_component(&self, record: &ComponentRecord) -> SyncResult<()> {
        if record.id.scope() != Some(self.name.as_str()) {
            return Err(SyncError::Rejected {
                remote: self.name.clone(),
                reason: format!("record {} is not owned by this scope", record.id),
            });
        }
        for object_id in record.versions.values() {
            if !self.store.exists(object_id).map_err(transport_error)? {
                return Err(SyncError::Rejected {
                    remote: self.name.clone(),
                    reason: format!("version object {object_id} was not pushed"),
                });
            }
        }
        self.store.write_component(record).map_err(transport_error)
    }
}

impl std::fmt::Debug for StoreRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRemote").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use comet_store::{InMemoryObjectStore, SourceObject};

    use super::*;

    fn remote() -> StoreRemote {
        StoreRemote::new("remote", Arc::new(InMemoryObjectStore::new()))
    }

    #[tokio::test]
    async fn push_then_fetch_object() {
        let remote = remote();
        let object = SourceObject::new(b"module.exports = 1;".to_vec()).to_stored_object();
        let ack = remote.push_objects(&[object.clone(), object.clone()]).await.unwrap();
        assert_eq!(ack.accepted, vec![object.compute_id()]);
        assert_eq!(ack.already_present, 1);
        assert_eq!(remote.fetch_object(&object.compute_id()).await.unwrap(), object);
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let missing = ObjectId::from_bytes(b"missing");
        assert!(matches!(
            remote().fetch_object(&missing).await,
            Err(SyncError::ObjectNotFound(id)) if id == missing
        ));
    }

    #[tokio::test]
    async fn foreign_scope_record_is_rejected() {
        let record = ComponentRecord::new(&ComponentId::parse("local/bar/foo").unwrap());
        assert!(matches!(
            remote().push_component(&record).await,
            Err(SyncError::Rejected { .. })
        ));
    }

    #[tokio::test]
    async fn record_without_objects_is_rejected() {
        let mut record = ComponentRecord::new(&ComponentId::parse("remote/bar/foo").unwrap());
        record.add_version(1, ObjectId::from_bytes(b"never pushed"));
        assert!(matches!(
            remote().push_component(&record).await,
            Err(SyncError::Rejected { .. })
        ));
    }

    #[tokio::test]
    async fn fetch_component_applies_remote_scope() {
        let remote = remote();
        let object = SourceObject::new(b"v".to_vec()).to_stored_object();
        remote.push_objects(&[object.clone()]).await.unwrap();
        let mut record = ComponentRecord::new(&ComponentId::parse("remote/bar/foo").unwrap());
        record.add_version(1, object.compute_id());
        remote.push_component(&record).await.unwrap();

        let fetched = remote
            .fetch_component(&ComponentId::parse("bar/foo::1").unwrap())
            .await
            .unwrap();
        assert_eq!(fetched, Some(record));
    }
}
