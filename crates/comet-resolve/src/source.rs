use std::sync::Arc;

use async_trait::async_trait;
use comet_store::ObjectStore;
use comet_types::{ComponentId, ObjectId, VersionSpec};
use comet_version::Version;
use tracing::trace;

use crate::error::ResolveResult;

/// A dependency pinned to the version that satisfied it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedComponent {
    /// Scoped id with an exact version.
    pub id: ComponentId,
    pub object_id: ObjectId,
    pub version: Version,
}

/// Where the resolver loads component versions from.
#[async_trait]
pub trait DependencySource: Send + Sync {
    /// Load the version `id` refers to. `Ok(None)` means the component is
    /// unknown to this source.
    async fn load(&self, id: &ComponentId) -> ResolveResult<Option<ResolvedComponent>>;
}

/// Reads versions from an object store.
///
/// Unscoped ids match a record of the same namespace/name in any scope,
/// preferring `preferred_scope` when several exist.
#[derive(Clone)]
pub struct StoreSource {
    store: Arc<dyn ObjectStore>,
    preferred_scope: Option<String>,
}

impl StoreSource {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            preferred_scope: None,
        }
    }

    pub fn with_preferred_scope(mut self, scope: impl Into<String>) -> Self {
        self.preferred_scope = Some(scope.into());
        self
    }

    /// Synchronous form of [`DependencySource::load`].
    pub fn load_blocking(&self, id: &ComponentId) -> ResolveResult<Option<ResolvedComponent>> {
        let record = if id.has_scope() {
            self.store.read_component(id)?
        } else {
            let mut matches: Vec<ComponentId> = self
                .store
                .component_ids()?
                .into_iter()
                .filter(|candidate| candidate.same_component(id))
                .collect();
            if let Some(scope) = &self.preferred_scope {
                if let Some(pos) = matches.iter().position(|m| m.scope() == Some(scope.as_str())) {
                    matches.swap(0, pos);
                }
            }
            match matches.first() {
                Some(found) => self.store.read_component(found)?,
                None => None,
            }
        };
        let Some(record) = record else {
            trace!(%id, "not in store");
            return Ok(None);
        };
        let Some((number, object_id)) = record.get(id.version()) else {
            trace!(%id, "version not in store");
            return Ok(None);
        };
        let version = Version::from_stored_object(&self.store.get(&object_id)?)?;
        Ok(Some(ResolvedComponent {
            id: record.id.with_version(VersionSpec::Exact(number)),
            object_id,
            version,
        }))
    }
}

#[async_trait]
impl DependencySource for StoreSource {
    async fn load(&self, id: &ComponentId) -> ResolveResult<Option<ResolvedComponent>> {
        self.load_blocking(id)
    }
}

impl std::fmt::Debug for StoreSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSource")
            .field("preferred_scope", &self.preferred_scope)
            .finish()
    }
}
