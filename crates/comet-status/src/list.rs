use std::collections::{BTreeMap, BTreeSet};
use std::thread;

use comet_map::{DirStructure, FileSystem, LocationMap, MapEntry};
use comet_store::{ComponentRecord, ObjectStore};
use comet_types::{ComponentId, Diagnostic, Diagnostics, VersionSpec};
use comet_version::{is_modified, Version};
use tracing::{debug, warn};

use crate::error::{StatusError, StatusResult};
use crate::report::StatusReport;

/// Result of loading a component from the working directory. `Ok(None)`
/// means its files are gone.
pub type LoadResult = Result<Option<Version>, Box<dyn std::error::Error + Send + Sync>>;

/// Builds the working-directory version of a mapped component.
pub trait ComponentLoader: Send + Sync {
    fn load_from_file_system(&self, id: &ComponentId, entry: &MapEntry) -> LoadResult;
}

/// A stored component record with its latest version decoded.
#[derive(Clone, Debug)]
struct StoredComponent {
    record: ComponentRecord,
    latest: Option<Version>,
}

/// Derived lists, filled on first use.
#[derive(Debug, Default)]
pub struct ListCache {
    from_objects: Option<Vec<StoredComponent>>,
    from_map: Option<Vec<ComponentId>>,
    from_file_system: Option<Vec<ComponentId>>,
}

impl ListCache {
    pub fn invalidate(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.from_objects.is_none() && self.from_map.is_none() && self.from_file_system.is_none()
    }
}

fn report_id(id: &ComponentId) -> ComponentId {
    id.without_scope().with_version(VersionSpec::Latest)
}

fn sorted(ids: impl IntoIterator<Item = ComponentId>) -> Vec<ComponentId> {
    ids.into_iter()
        .map(|id| report_id(&id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Decode the latest version of each record, spreading the work over
/// scoped threads.
fn load_latest(
    store: &dyn ObjectStore,
    records: Vec<ComponentRecord>,
) -> StatusResult<Vec<StoredComponent>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }
    let workers = thread::available_parallelism()
        .map_or(1, |n| n.get())
        .min(records.len());
    let chunk = records.len().div_ceil(workers);

    thread::scope(|scope| {
        let handles: Vec<_> = records
            .chunks(chunk)
            .map(|part| {
                scope.spawn(move || {
                    part.iter()
                        .map(|record| -> StatusResult<StoredComponent> {
                            let latest = match record.latest() {
                                Some((_, object_id)) => {
                                    Some(Version::from_stored_object(&store.get(&object_id)?)?)
                                }
                                None => None,
                            };
                            Ok(StoredComponent {
                                record: record.clone(),
                                latest,
                            })
                        })
                        .collect::<StatusResult<Vec<_>>>()
                })
            })
            .collect();

        let mut loaded = Vec::with_capacity(records.len());
        for handle in handles {
            loaded.extend(handle.join().map_err(|_| StatusError::WorkerPanicked)??);
        }
        Ok(loaded)
    })
}

/// Status computation over one workspace session.
pub struct ComponentsList<'a> {
    store: &'a dyn ObjectStore,
    map: &'a LocationMap,
    fs: &'a dyn FileSystem,
    structure: &'a DirStructure,
    loader: &'a dyn ComponentLoader,
    local_scope: &'a str,
    cache: ListCache,
}

impl<'a> ComponentsList<'a> {
    pub fn new(
        store: &'a dyn ObjectStore,
        map: &'a LocationMap,
        fs: &'a dyn FileSystem,
        structure: &'a DirStructure,
        loader: &'a dyn ComponentLoader,
        local_scope: &'a str,
    ) -> Self {
        Self {
            store,
            map,
            fs,
            structure,
            loader,
            local_scope,
            cache: ListCache::default(),
        }
    }

    /// Drop every cached list; the next query re-reads its sources.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    pub fn cache(&self) -> &ListCache {
        &self.cache
    }

    fn from_objects(&mut self) -> StatusResult<&[StoredComponent]> {
        if self.cache.from_objects.is_none() {
            let records = self.store.list_components()?.collect::<Result<Vec<_>, _>>()?;
            debug!(records = records.len(), "loading stored components");
            self.cache.from_objects = Some(load_latest(self.store, records)?);
        }
        Ok(self.cache.from_objects.as_deref().unwrap_or_default())
    }

    fn from_map(&mut self) -> &[ComponentId] {
        let map = self.map;
        self.cache
            .from_map
            .get_or_insert_with(|| map.ids().cloned().collect())
    }

    fn from_file_system(&mut self) -> StatusResult<&[ComponentId]> {
        if self.cache.from_file_system.is_none() {
            let base = self.structure.base_dir();
            let candidates: Vec<ComponentId> = self
                .fs
                .list_directories(&base, self.structure.scan_depth())?
                .iter()
                .filter_map(|dir| self.structure.candidate_id(dir))
                .collect();
            self.cache.from_file_system = Some(candidates);
        }
        Ok(self.cache.from_file_system.as_deref().unwrap_or_default())
    }

    /// Components in the layout directory with no map entry.
    pub fn list_untracked(&mut self) -> StatusResult<Vec<ComponentId>> {
        let map = self.map;
        let candidates = self.from_file_system()?;
        Ok(sorted(
            candidates
                .iter()
                .filter(|candidate| !map.contains(candidate))
                .cloned()
                .collect::<Vec<_>>(),
        ))
    }

    /// Mapped components that were never stored, in any scope.
    pub fn list_new(&mut self) -> StatusResult<Vec<ComponentId>> {
        let stored: BTreeSet<String> = self
            .from_objects()?
            .iter()
            .map(|c| c.record.id.component_key())
            .collect();
        let mapped = self.from_map().to_vec();
        Ok(sorted(
            mapped
                .into_iter()
                .filter(|id| !stored.contains(&id.component_key())),
        ))
    }

    /// Stored components whose working copy drifted, plus orphan warnings.
    ///
    /// When a component is stored under several scopes the local-scope record
    /// is compared, since that is the one the next commit extends.
    pub fn list_modified(&mut self) -> StatusResult<(Vec<ComponentId>, Diagnostics)> {
        let local_scope = self.local_scope;
        let map = self.map;
        let loader = self.loader;

        let mut by_component: BTreeMap<String, &StoredComponent> = BTreeMap::new();
        for stored in self.from_objects()? {
            let key = stored.record.id.component_key();
            let is_local = stored.record.id.scope() == Some(local_scope);
            match by_component.get(&key) {
                Some(existing) if existing.record.id.scope() == Some(local_scope) || !is_local => {}
                _ => {
                    by_component.insert(key, stored);
                }
            }
        }

        let mut modified = Vec::new();
        let mut diagnostics = Diagnostics::new();
        for stored in by_component.values() {
            let Some(latest) = &stored.latest else {
                continue;
            };
            let id = &stored.record.id;
            let Some((key, entry)) = map.find(id) else {
                warn!(%id, "stored component has no location map entry");
                diagnostics.push(Diagnostic::OrphanedModel { id: report_id(id) });
                continue;
            };
            let current = loader
                .load_from_file_system(key, entry)
                .map_err(|source| StatusError::Loader {
                    id: key.clone(),
                    source,
                })?;
            match current {
                Some(current) => {
                    if is_modified(latest, &current)? {
                        modified.push(id.clone());
                    }
                }
                None => {
                    warn!(%id, "stored component has no files on disk");
                    diagnostics.push(Diagnostic::OrphanedModel { id: report_id(id) });
                }
            }
        }
        Ok((sorted(modified), diagnostics))
    }

    /// Components stored under the local scope, i.e. committed but not
    /// exported.
    pub fn list_staged(&mut self) -> StatusResult<Vec<ComponentId>> {
        let local_scope = self.local_scope;
        Ok(sorted(
            self.from_objects()?
                .iter()
                .filter(|c| c.record.id.scope() == Some(local_scope))
                .map(|c| c.record.id.clone())
                .collect::<Vec<_>>(),
        ))
    }

    /// New or modified components: what the next commit would record.
    pub fn list_commit_pending(&mut self) -> StatusResult<Vec<ComponentId>> {
        let mut pending = self.list_new()?;
        pending.extend(self.list_modified()?.0);
        Ok(sorted(pending))
    }

    /// Staged components: what the next export would push.
    pub fn list_export_pending(&mut self) -> StatusResult<Vec<ComponentId>> {
        self.list_staged()
    }

    pub fn status(&mut self) -> StatusResult<StatusReport> {
        let (modified, diagnostics) = self.list_modified()?;
        Ok(StatusReport {
            untracked: self.list_untracked()?,
            new: self.list_new()?,
            modified,
            staged: self.list_staged()?,
            diagnostics,
        })
    }
}
