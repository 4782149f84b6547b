//! Recording new versions and publishing them to a remote scope.

use comet_resolve::{DependencyResolver, StoreSource};
use comet_store::ComponentRecord;
use comet_types::{ComponentId, Diagnostics, VersionSpec};
use comet_version::{is_modified, LogEntry, Version};
use tracing::{debug, info, warn};

use crate::error::{SdkError, SdkResult};
use crate::workspace::Workspace;

/// Outcome of [`Workspace::commit`].
#[derive(Clone, Debug, Default)]
pub struct CommitOutcome {
    /// Local-scope ids pinned to the version just recorded.
    pub committed: Vec<ComponentId>,
    /// Requested components whose working copy matches their latest version.
    pub unchanged: Vec<ComponentId>,
    pub diagnostics: Diagnostics,
}

/// Outcome of [`Workspace::export`].
#[derive(Clone, Debug, Default)]
pub struct ExportOutcome {
    /// Remote-scoped ids at their latest exported version.
    pub exported: Vec<ComponentId>,
    /// Objects the remote did not hold before.
    pub objects_pushed: usize,
}

impl Workspace {
    /// Record a new version of each component in `ids`, or of every new and
    /// modified component when `ids` is empty.
    ///
    /// Versions are numbered after the highest version known in any scope,
    /// so committing an imported component continues its history.
    pub async fn commit(&mut self, ids: &[ComponentId], message: &str) -> SdkResult<CommitOutcome> {
        let targets = if ids.is_empty() {
            let loader = self.loader();
            let mut list = self.components_list(&loader);
            list.list_commit_pending()?
        } else {
            ids.to_vec()
        };
        let mut outcome = CommitOutcome::default();
        for id in &targets {
            self.commit_one(id, message, &mut outcome).await?;
        }
        info!(
            committed = outcome.committed.len(),
            unchanged = outcome.unchanged.len(),
            "commit finished"
        );
        Ok(outcome)
    }

    async fn commit_one(
        &self,
        id: &ComponentId,
        message: &str,
        outcome: &mut CommitOutcome,
    ) -> SdkResult<()> {
        let (key, entry) = self
            .map
            .find(id)
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .ok_or_else(|| SdkError::NotTracked(id.clone()))?;
        let current = self
            .loader()
            .load_working_copy(&key, &entry)?
            .ok_or_else(|| SdkError::FilesMissing(key.clone()))?;

        let local_id = key
            .with_scope(Some(self.scope.name.as_str()))
            .with_version(VersionSpec::Latest);
        let local = self.store.read_component(&local_id)?;
        let upstream = match key.scope() {
            Some(scope) if scope != self.scope.name => {
                self.store.read_component(&key.with_version(VersionSpec::Latest))?
            }
            _ => None,
        };
        let latest = [local.as_ref(), upstream.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(ComponentRecord::latest)
            .max_by_key(|(number, _)| *number);

        if let Some((_, object_id)) = latest {
            let previous = Version::from_stored_object(&self.store.get(&object_id)?)?;
            if !is_modified(&previous, current.version())? {
                debug!(id = %key, "unchanged, nothing to commit");
                outcome.unchanged.push(key.with_version(VersionSpec::Latest));
                return Ok(());
            }
        }

        let source = StoreSource::new(self.store.clone()).with_preferred_scope(self.scope.name.clone());
        let flattened = DependencyResolver::new(&source)
            .flatten(&key, &current.version().dependency_ids())
            .await?;
        outcome.diagnostics.extend(flattened.diagnostics.clone());

        let log = LogEntry::now(message, self.author.clone());
        let persisted = current.persist(&*self.store, flattened.ids(), log)?;
        let object_id = persisted
            .object_id()
            .ok_or_else(|| SdkError::InvalidOperation(format!("{key} was not persisted")))?;

        let number = latest.map_or(1, |(number, _)| number + 1);
        let mut record = local.unwrap_or_else(|| ComponentRecord::new(&local_id));
        record.add_version(number, object_id);
        self.store.write_component(&record)?;
        info!(id = %record.id_at(number), %object_id, "committed");
        outcome.committed.push(record.id_at(number));
        Ok(())
    }

    /// Push staged components to `remote`: every id in `ids`, or every
    /// staged component when `ids` is empty.
    ///
    /// On success the local-scope record is replaced by a copy under the
    /// remote's scope and the map entry is rekeyed to the remote id.
    pub async fn export(&mut self, remote: &str, ids: &[ComponentId]) -> SdkResult<ExportOutcome> {
        let transport = self.remote(remote)?;
        let targets = if ids.is_empty() {
            let loader = self.loader();
            let mut list = self.components_list(&loader);
            list.list_export_pending()?
        } else {
            ids.to_vec()
        };
        if targets.is_empty() {
            return Err(SdkError::InvalidOperation("nothing staged to export".into()));
        }

        let mut outcome = ExportOutcome::default();
        for id in &targets {
            let local_id = id
                .with_scope(Some(self.scope.name.as_str()))
                .with_version(VersionSpec::Latest);
            let record = self
                .store
                .read_component(&local_id)?
                .ok_or_else(|| SdkError::NothingToExport(id.clone()))?;

            let pushed = comet_sync::push_component(&*self.store, transport.as_ref(), &record).await?;
            outcome.objects_pushed += pushed.ack.accepted.len();

            let mirror_id = record.id.with_scope(Some(transport.scope_name()));
            let mut mirror = self
                .store
                .read_component(&mirror_id)?
                .unwrap_or_else(|| ComponentRecord::new(&mirror_id));
            for (number, object_id) in &record.versions {
                mirror.add_version(*number, *object_id);
            }
            self.store.write_component(&mirror)?;
            self.store.remove_component(&record.id)?;

            if !self.map.rekey(&record.id, &pushed.remote_id) {
                warn!(id = %record.id, "exported component has no map entry");
            }
            self.map.save()?;
            outcome.exported.push(pushed.remote_id);
        }
        Ok(outcome)
    }
}
