use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use comet_types::{ComponentId, Diagnostic, Diagnostics};
use tracing::{debug, warn};

use crate::error::ResolveResult;
use crate::source::{DependencySource, ResolvedComponent};

/// Transitive dependency closure of one component.
#[derive(Clone, Debug, Default)]
pub struct Flattened {
    /// Resolved dependencies keyed by `namespace/name`.
    pub components: BTreeMap<String, ResolvedComponent>,
    pub diagnostics: Diagnostics,
}

impl Flattened {
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Scoped, versioned ids of the closure, as stored on a version.
    pub fn ids(&self) -> BTreeSet<ComponentId> {
        self.components.values().map(|c| c.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedComponent> {
        self.components.values()
    }

    /// Package dependencies declared anywhere in the closure.
    pub fn package_dependencies(&self) -> BTreeMap<String, String> {
        self.components
            .values()
            .flat_map(|c| c.version.package_dependencies.clone())
            .collect()
    }
}

/// Breadth-first dependency flattener.
pub struct DependencyResolver<'a> {
    source: &'a dyn DependencySource,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(source: &'a dyn DependencySource) -> Self {
        Self { source }
    }

    /// Flatten the declared dependencies of `root`.
    ///
    /// Each scope-stripped id+version is expanded at most once, so cyclic
    /// declarations terminate. `root` itself never appears in the result.
    /// When two paths declare the same namespace/name at different versions
    /// the one resolved last is kept and a
    /// [`Diagnostic::VersionOverride`] is recorded.
    pub async fn flatten(
        &self,
        root: &ComponentId,
        declared: &[ComponentId],
    ) -> ResolveResult<Flattened> {
        let mut flattened = Flattened::default();
        let mut visited: HashSet<ComponentId> = HashSet::new();
        let mut queue: VecDeque<ComponentId> = declared.iter().cloned().collect();

        while let Some(id) = queue.pop_front() {
            if id.same_component(root) {
                continue;
            }
            let requested = id.without_scope();
            if !visited.insert(requested.clone()) {
                continue;
            }
            let Some(resolved) = self.source.load(&id).await? else {
                warn!(%id, "dependency could not be resolved");
                flattened
                    .diagnostics
                    .push(Diagnostic::UnresolvedDependency { id });
                continue;
            };
            let pinned = resolved.id.without_scope();
            if pinned != requested && !visited.insert(pinned) {
                continue;
            }

            queue.extend(resolved.version.dependency_ids());
            let kept = resolved.id.clone();
            debug!(id = %kept, "resolved dependency");
            if let Some(previous) = flattened
                .components
                .insert(kept.component_key(), resolved)
            {
                if previous.id != kept {
                    flattened.diagnostics.push(Diagnostic::VersionOverride {
                        replaced: previous.id,
                        kept,
                    });
                }
            }
        }
        Ok(flattened)
    }
}
