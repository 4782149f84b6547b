use std::collections::BTreeSet;
use std::sync::Arc;

use comet_store::{ComponentRecord, ObjectStore, StoredObject};
use comet_types::ObjectId;
use comet_version::Version;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};
use crate::transport::RemoteTransport;
use crate::types::PushResult;

/// Every object a record points at: version objects followed by the source
/// objects of their files, without duplicates.
pub fn collect_version_objects(
    store: &dyn ObjectStore,
    record: &ComponentRecord,
) -> SyncResult<Vec<StoredObject>> {
    let mut seen = BTreeSet::new();
    let mut objects = Vec::new();
    for object_id in record.versions.values() {
        if !seen.insert(*object_id) {
            continue;
        }
        let stored = store.get(object_id)?;
        let version = Version::from_stored_object(&stored)?;
        objects.push(stored);
        for file in &version.files {
            if seen.insert(file.object_id) {
                objects.push(store.get(&file.object_id)?);
            }
        }
    }
    Ok(objects)
}

/// Fetch objects concurrently. Results keep the order of `ids`.
pub async fn fetch_objects(
    transport: Arc<dyn RemoteTransport>,
    ids: Vec<ObjectId>,
) -> SyncResult<Vec<StoredObject>> {
    let mut tasks = JoinSet::new();
    for (index, id) in ids.iter().copied().enumerate() {
        let transport = Arc::clone(&transport);
        tasks.spawn(async move { (index, transport.fetch_object(&id).await) });
    }

    let mut fetched: Vec<Option<StoredObject>> = vec![None; ids.len()];
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.map_err(|e| SyncError::Transport(e.to_string()))?;
        let object = result?;
        if object.compute_id() != ids[index] {
            return Err(SyncError::Transport(format!(
                "remote returned wrong content for {}",
                ids[index]
            )));
        }
        fetched[index] = Some(object);
    }
    debug!(count = ids.len(), "fetched objects");
    Ok(fetched.into_iter().flatten().collect())
}

/// Push a local record and everything it references to `remote`.
///
/// Versions are merged into the remote record. A version number the remote
/// already holds must point at the same object, otherwise nothing is pushed
/// and [`SyncError::Conflict`] is returned.
pub async fn push_component(
    local: &dyn ObjectStore,
    remote: &dyn RemoteTransport,
    record: &ComponentRecord,
) -> SyncResult<PushResult> {
    let mut remote_record = remote
        .fetch_component(&record.id)
        .await?
        .unwrap_or_else(|| ComponentRecord::new(&record.id.with_scope(Some(remote.scope_name()))));
    for (&number, &object_id) in &record.versions {
        let held = remote_record.versions.get(&number).copied();
        if held.is_some_and(|held| held != object_id) {
            warn!(id = %remote_record.id, version = number, "remote holds different content");
            return Err(SyncError::Conflict {
                id: remote_record.id.clone(),
                version: number,
            });
        }
        remote_record.add_version(number, object_id);
    }

    let objects = collect_version_objects(local, record)?;
    let ack = remote.push_objects(&objects).await?;
    remote.push_component(&remote_record).await?;

    let remote_id = match remote_record.latest() {
        Some((number, _)) => remote_record.id_at(number),
        None => remote_record.id.clone(),
    };
    info!(
        local = %record.id,
        remote = %remote_id,
        objects = objects.len(),
        "exported component"
    );
    Ok(PushResult { remote_id, ack })
}
