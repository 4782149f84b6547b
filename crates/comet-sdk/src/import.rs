//! Bringing components from a remote scope into the workspace.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use comet_map::{FileSystem, Origin, WriteMode};
use comet_resolve::{
    DependencyResolver, DependencySource, ResolveError, ResolveResult, ResolvedComponent,
    StoreSource,
};
use comet_store::{ComponentRecord, ObjectStore, SourceObject};
use comet_sync::{RemoteTransport, SyncError};
use comet_types::{ComponentId, Diagnostics, ObjectId, VersionSpec};
use comet_version::Version;
use tracing::{debug, info};

use crate::config::{ComponentManifest, MANIFEST_FILE};
use crate::error::{SdkError, SdkResult};
use crate::workspace::{slash_path, Workspace};

/// Directory, below an imported component, holding its dependencies.
pub const DEPENDENCIES_DIR: &str = "dependencies";

#[derive(Clone, Debug, Default)]
pub struct ImportOptions {
    /// Write the component here instead of its layout directory.
    pub path: Option<PathBuf>,
    /// Replace files whose contents differ from the imported version.
    pub overwrite: bool,
}

/// Outcome of [`Workspace::import`].
#[derive(Clone, Debug)]
pub struct ImportOutcome {
    /// Scoped id of the imported version.
    pub imported: ComponentId,
    /// Flattened dependencies with the origin their map entry ended up with.
    pub dependencies: Vec<(ComponentId, Origin)>,
    /// Files written, workspace-relative.
    pub written: Vec<PathBuf>,
    /// Files left alone because they already held the imported contents.
    pub skipped: Vec<PathBuf>,
    pub diagnostics: Diagnostics,
}

/// Fetch the version `id` refers to from `transport` and store it, with its
/// sources, in `store`. The local record of the remote scope gains that
/// version.
async fn fetch_into(
    store: &Arc<dyn ObjectStore>,
    transport: &Arc<dyn RemoteTransport>,
    id: &ComponentId,
) -> SdkResult<Option<ResolvedComponent>> {
    let Some(record) = transport.fetch_component(id).await? else {
        return Ok(None);
    };
    let Some((number, object_id)) = record.get(id.version()) else {
        return Ok(None);
    };
    let version_object = transport.fetch_object(&object_id).await?;
    if version_object.compute_id() != object_id {
        return Err(SyncError::Transport(format!(
            "remote returned wrong content for version {object_id}"
        ))
        .into());
    }
    let version = Version::from_stored_object(&version_object)?;

    let mut missing: Vec<ObjectId> = Vec::new();
    for file in &version.files {
        if !store.exists(&file.object_id)? && !missing.contains(&file.object_id) {
            missing.push(file.object_id);
        }
    }
    let sources = comet_sync::fetch_objects(Arc::clone(transport), missing).await?;
    store.write_batch(&sources)?;
    store.write(&version_object)?;

    let mut local = store
        .read_component(&record.id)?
        .unwrap_or_else(|| ComponentRecord::new(&record.id));
    local.add_version(number, object_id);
    store.write_component(&local)?;
    debug!(id = %record.id_at(number), sources = sources.len(), "fetched version");

    Ok(Some(ResolvedComponent {
        id: record.id_at(number),
        object_id,
        version,
    }))
}

/// Resolves from the local store, fetching from the remote what it lacks.
///
/// Exact versions already stored are never refetched; `latest` asks the
/// remote first so a stale local copy does not win.
struct FetchingSource {
    local: StoreSource,
    store: Arc<dyn ObjectStore>,
    transport: Arc<dyn RemoteTransport>,
}

impl FetchingSource {
    fn owned_by_remote(&self, id: &ComponentId) -> bool {
        id.scope()
            .map_or(true, |scope| scope == self.transport.scope_name())
    }
}

#[async_trait]
impl DependencySource for FetchingSource {
    async fn load(&self, id: &ComponentId) -> ResolveResult<Option<ResolvedComponent>> {
        if !id.version().is_latest() || !self.owned_by_remote(id) {
            if let Some(found) = self.local.load_blocking(id)? {
                return Ok(Some(found));
            }
        }
        if !self.owned_by_remote(id) {
            return Ok(None);
        }
        match fetch_into(&self.store, &self.transport, id).await {
            Ok(Some(found)) => Ok(Some(found)),
            Ok(None) => self.local.load_blocking(id),
            Err(e) => Err(ResolveError::Source(Box::new(e))),
        }
    }
}

impl Workspace {
    /// Import `id` from its remote, with every transitive dependency.
    ///
    /// The component lands in its layout directory (or `options.path`) as
    /// IMPORTED; dependencies land below it in `dependencies/` as NESTED
    /// unless the map already places them elsewhere. Files that already hold
    /// the imported contents are not rewritten.
    pub async fn import(
        &mut self,
        id: &ComponentId,
        options: ImportOptions,
    ) -> SdkResult<ImportOutcome> {
        let transport = self.remote_for(id)?;
        let root = fetch_into(&self.store, &transport, id)
            .await?
            .ok_or_else(|| SdkError::ComponentNotFound(id.clone()))?;

        let source = FetchingSource {
            local: StoreSource::new(Arc::clone(&self.store))
                .with_preferred_scope(transport.scope_name()),
            store: Arc::clone(&self.store),
            transport: Arc::clone(&transport),
        };
        let flattened = DependencyResolver::new(&source)
            .flatten(&root.id, &root.version.dependency_ids())
            .await?;

        let mut diagnostics = flattened.diagnostics.clone();
        let mut packages = root.version.package_dependencies.clone();
        packages.extend(flattened.package_dependencies());
        diagnostics.extend(self.missing_packages(&packages));

        let mut written = Vec::new();
        let mut skipped = Vec::new();
        let forced = match &options.path {
            Some(path) => Some(self.relative(path)?),
            None => None,
        };
        let root_dir = match &forced {
            Some(dir) => dir.clone(),
            None => self.component_dir_for(&root.id)?,
        };
        self.materialize(
            &root,
            &root_dir,
            Origin::Imported,
            forced.is_some(),
            options.overwrite,
            (&mut written, &mut skipped),
        )?;

        let nested_base = self
            .map
            .find(&root.id)
            .and_then(|(_, entry)| entry.root_dir.clone())
            .map_or(root_dir, PathBuf::from);
        let mut dependencies = Vec::with_capacity(flattened.len());
        for dep in flattened.iter() {
            let dir = nested_dir(&nested_base, &dep.id, self.scope_name());
            let origin = self.materialize(
                dep,
                &dir,
                Origin::Nested,
                false,
                options.overwrite,
                (&mut written, &mut skipped),
            )?;
            dependencies.push((dep.id.clone(), origin));
        }

        let number = root.id.version().exact().unwrap_or_default();
        self.consumer
            .dependencies
            .insert(root.id.with_version(VersionSpec::Latest), number.to_string());
        self.consumer.write(&self.root, true)?;
        self.map.save()?;

        info!(
            id = %root.id,
            dependencies = dependencies.len(),
            written = written.len(),
            skipped = skipped.len(),
            "imported component"
        );
        Ok(ImportOutcome {
            imported: root.id,
            dependencies,
            written,
            skipped,
            diagnostics,
        })
    }

    /// Directory of an already mapped component, else its layout directory.
    fn component_dir_for(&self, id: &ComponentId) -> SdkResult<PathBuf> {
        if let Some(dir) = self
            .map
            .find(id)
            .and_then(|(_, entry)| entry.root_dir.as_deref())
        {
            return Ok(PathBuf::from(dir));
        }
        Ok(self.structure.component_dir(id)?)
    }

    /// Write one component's files and register them.
    ///
    /// Without `force_dir`, a component the map already knows keeps its
    /// recorded paths and `dir` only applies to new entries.
    fn materialize(
        &mut self,
        component: &ResolvedComponent,
        dir: &Path,
        origin: Origin,
        force_dir: bool,
        overwrite: bool,
        (written, skipped): (&mut Vec<PathBuf>, &mut Vec<PathBuf>),
    ) -> SdkResult<Origin> {
        let replaceable = self.adopt_entry(&component.id, origin)?;
        let existing_root = self
            .map
            .find(&component.id)
            .map(|(_, entry)| entry.root_dir.clone());
        let known = existing_root.is_some() && !force_dir;

        let mut files = BTreeMap::new();
        for file in &component.version.files {
            let target = if known {
                self.map
                    .resolve_write_path(&component.id, &file.path, &self.structure)?
            } else {
                dir.join(&file.path)
            };
            let contents = SourceObject::from_stored_object(&self.store.get(&file.object_id)?)?;
            let replace = overwrite || self.is_unedited(&target, replaceable.get(&file.path))?;
            self.write_if_changed(&target, &contents.contents, replace, written, skipped)?;
            files.insert(file.path.clone(), slash_path(&target));
        }

        let manifest_dir = match existing_root.flatten() {
            Some(root) if known => PathBuf::from(root),
            _ => dir.to_path_buf(),
        };
        let version = &component.version;
        if !version.dependencies.is_empty() || !version.package_dependencies.is_empty() {
            let manifest = ComponentManifest {
                dependencies: version.dependencies.clone(),
                package_dependencies: version.package_dependencies.clone(),
                lang: None,
            };
            let path = manifest_dir.join(MANIFEST_FILE);
            let bytes = manifest.to_bytes()?;
            if !self.fs.exists(&path) || self.fs.read_file(&path)? != bytes {
                self.fs.write_file(&path, &bytes, WriteMode::OVERWRITE)?;
            }
        }

        let entry = self.map.add(&component.id, files, origin);
        if entry.root_dir.is_none() || force_dir {
            entry.root_dir = Some(slash_path(&manifest_dir));
        }
        if entry.main_file.is_none() {
            entry.main_file.clone_from(&version.main_file);
        }
        Ok(entry.origin)
    }

    /// Give the component one map entry under `id`.
    ///
    /// An entry the map holds for the same component under another key
    /// (unscoped, or at another version for a direct import) is moved to
    /// `id`. When that entry pointed at a stored version, its files are
    /// returned: working copies still matching them may be replaced.
    fn adopt_entry(
        &mut self,
        id: &ComponentId,
        origin: Origin,
    ) -> SdkResult<BTreeMap<String, ObjectId>> {
        let found = match origin {
            Origin::Imported => self.map.find_any_version(id),
            _ => self.map.find(id),
        };
        let Some(key) = found.map(|(key, _)| key.clone()) else {
            return Ok(BTreeMap::new());
        };
        if key == *id {
            return Ok(BTreeMap::new());
        }

        let mut replaceable = BTreeMap::new();
        if key.has_scope() && key.version().exact().is_some() {
            if let Some((_, object_id)) = self
                .store
                .read_component(&key.with_version(VersionSpec::Latest))?
                .and_then(|record| record.get(key.version()))
            {
                let previous = Version::from_stored_object(&self.store.get(&object_id)?)?;
                replaceable = previous
                    .files
                    .into_iter()
                    .map(|file| (file.path, file.object_id))
                    .collect();
            }
        }
        debug!(from = %key, to = %id, "adopting existing map entry");
        self.map.rekey(&key, id);
        Ok(replaceable)
    }

    /// Does `target` still hold the stored object `previous`?
    fn is_unedited(&self, target: &Path, previous: Option<&ObjectId>) -> SdkResult<bool> {
        let Some(previous) = previous else {
            return Ok(false);
        };
        if !self.fs.exists(target) {
            return Ok(false);
        }
        let stored = SourceObject::from_stored_object(&self.store.get(previous)?)?;
        Ok(self.fs.read_file(target)? == stored.contents)
    }

    fn write_if_changed(
        &self,
        target: &Path,
        contents: &[u8],
        overwrite: bool,
        written: &mut Vec<PathBuf>,
        skipped: &mut Vec<PathBuf>,
    ) -> SdkResult<()> {
        if self.fs.exists(target) && self.fs.read_file(target)? == contents {
            debug!(path = %target.display(), "unchanged, skipping");
            skipped.push(target.to_path_buf());
            return Ok(());
        }
        self.fs
            .write_file(target, contents, WriteMode { overwrite })?;
        written.push(target.to_path_buf());
        Ok(())
    }
}

/// `<base>/dependencies/<namespace>/<name>/<scope>/<version>`
fn nested_dir(base: &Path, id: &ComponentId, fallback_scope: &str) -> PathBuf {
    let mut dir = base
        .join(DEPENDENCIES_DIR)
        .join(id.namespace())
        .join(id.name())
        .join(id.scope().unwrap_or(fallback_scope));
    if let Some(version) = id.version().exact() {
        dir.push(version.to_string());
    }
    dir
}

#[cfg(test)]
mod tests {
    use std::fs;

    use comet_map::MapError;
    use comet_store::{ObjectKind, StoredObject};
    use comet_types::Diagnostic;

    use super::*;

    fn id(s: &str) -> ComponentId {
        ComponentId::parse(s).unwrap()
    }

    /// An authoring workspace `a` that exports to the bare scope `remote`,
    /// and an empty consumer workspace `b` with the same remote.
    struct Fixture {
        dir: tempfile::TempDir,
        author: Workspace,
        consumer: Workspace,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let remote = dir.path().join("remote");
            Workspace::init_bare(&remote, "remote").unwrap();
            let [author, consumer] = ["a", "b"].map(|name| {
                let root = dir.path().join(name);
                fs::create_dir_all(&root).unwrap();
                let mut ws = Workspace::init(&root, None).unwrap();
                ws.add_remote(&remote).unwrap();
                ws
            });
            Self {
                dir,
                author,
                consumer,
            }
        }

        /// Author `global/<name>` with the given dependencies and export it.
        async fn publish(&mut self, name: &str, deps: &[&str], packages: &[(&str, &str)]) {
            let component = id(name);
            self.author.create(&component, false).unwrap();
            let dir = self.author.root().join("components/global").join(name);
            fs::write(dir.join("impl.js"), format!("module.exports = '{name}';")).unwrap();
            if !deps.is_empty() || !packages.is_empty() {
                let mut manifest = ComponentManifest::default();
                for dep in deps {
                    manifest.dependencies.insert(id(dep), "1".into());
                }
                for (package, version) in packages {
                    manifest
                        .package_dependencies
                        .insert((*package).into(), (*version).into());
                }
                manifest.write(&dir, true).unwrap();
            }
            self.author.commit(&[component], "publish").await.unwrap();
            self.author.export("remote", &[]).await.unwrap();
        }

        fn consumer_path(&self, rel: &str) -> PathBuf {
            self.dir.path().join("b").join(rel)
        }
    }

    #[tokio::test]
    async fn import_writes_layout_and_registers_imported() {
        let mut fx = Fixture::new();
        fx.publish("simple", &[], &[]).await;

        let outcome = fx
            .consumer
            .import(&id("remote/global/simple"), ImportOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.imported, id("remote/global/simple::1"));
        assert!(outcome.dependencies.is_empty());
        assert_eq!(
            outcome.written,
            vec![PathBuf::from("components/global/simple/impl.js")]
        );
        assert_eq!(
            fs::read_to_string(fx.consumer_path("components/global/simple/impl.js")).unwrap(),
            "module.exports = 'simple';"
        );

        let (_, entry) = fx.consumer.map().find(&id("global/simple")).unwrap();
        assert_eq!(entry.origin, Origin::Imported);
        assert_eq!(
            fx.consumer.consumer().dependencies[&id("remote/global/simple")],
            "1"
        );
        let status = fx.consumer.status().unwrap();
        assert!(status.is_clean(), "{status:?}");
    }

    #[tokio::test]
    async fn dependencies_are_nested_under_the_importer() {
        let mut fx = Fixture::new();
        fx.publish("simple", &[], &[]).await;
        fx.publish("with-deps", &["remote/global/simple::1"], &[]).await;

        let outcome = fx
            .consumer
            .import(&id("remote/global/with-deps"), ImportOptions::default())
            .await
            .unwrap();
        assert_eq!(
            outcome.dependencies,
            vec![(id("remote/global/simple::1"), Origin::Nested)]
        );
        let nested = "components/global/with-deps/dependencies/global/simple/remote/1/impl.js";
        assert!(fx.consumer_path(nested).is_file());
        assert!(fx
            .consumer_path("components/global/with-deps/comet.json")
            .is_file());

        let status = fx.consumer.status().unwrap();
        assert!(status.is_clean(), "{status:?}");

        // Importing the dependency directly promotes it without rewriting.
        let outcome = fx
            .consumer
            .import(&id("remote/global/simple"), ImportOptions::default())
            .await
            .unwrap();
        assert!(outcome.written.is_empty());
        assert_eq!(outcome.skipped, vec![PathBuf::from(nested)]);
        let (_, entry) = fx.consumer.map().find(&id("global/simple")).unwrap();
        assert_eq!(entry.origin, Origin::Imported);
    }

    #[tokio::test]
    async fn shared_dependency_is_written_once() {
        let mut fx = Fixture::new();
        fx.publish("simple", &[], &[]).await;
        fx.publish("with-deps", &["remote/global/simple::1"], &[]).await;
        fx.publish("with-deps2", &["remote/global/simple::1"], &[]).await;

        fx.consumer
            .import(&id("remote/global/with-deps"), ImportOptions::default())
            .await
            .unwrap();
        let outcome = fx
            .consumer
            .import(&id("remote/global/with-deps2"), ImportOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.skipped.len(), 1);
        assert!(!fx
            .consumer_path("components/global/with-deps2/dependencies")
            .exists());
        let simple_entries = fx
            .consumer
            .map()
            .ids()
            .filter(|key| key.same_component(&id("global/simple")))
            .count();
        assert_eq!(simple_entries, 1);
    }

    #[tokio::test]
    async fn missing_package_is_reported_until_installed() {
        let mut fx = Fixture::new();
        fx.publish("uses-lodash", &[], &[("lodash.get", "4.4.2")]).await;

        let outcome = fx
            .consumer
            .import(&id("remote/global/uses-lodash"), ImportOptions::default())
            .await
            .unwrap();
        assert_eq!(
            outcome.diagnostics.missing_packages(),
            vec![("lodash.get", "4.4.2")]
        );

        fs::create_dir_all(fx.consumer_path("node_modules/lodash.get")).unwrap();
        let outcome = fx
            .consumer
            .import(&id("remote/global/uses-lodash"), ImportOptions::default())
            .await
            .unwrap();
        assert!(!outcome
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::MissingPackageDependency { .. })));
    }

    #[tokio::test]
    async fn explicit_path_overrides_layout() {
        let mut fx = Fixture::new();
        fx.publish("simple", &[], &[]).await;

        let options = ImportOptions {
            path: Some(PathBuf::from("vendor/simple")),
            overwrite: false,
        };
        fx.consumer
            .import(&id("remote/global/simple"), options)
            .await
            .unwrap();
        assert!(fx.consumer_path("vendor/simple/impl.js").is_file());
        assert!(!fx.consumer_path("components/global/simple").exists());
        let (_, entry) = fx.consumer.map().find(&id("global/simple")).unwrap();
        assert_eq!(entry.root_dir.as_deref(), Some("vendor/simple"));
        assert!(fx.consumer.status().unwrap().is_clean());
    }

    #[tokio::test]
    async fn local_edits_are_not_clobbered_without_overwrite() {
        let mut fx = Fixture::new();
        fx.publish("simple", &[], &[]).await;
        fx.consumer
            .import(&id("remote/global/simple"), ImportOptions::default())
            .await
            .unwrap();
        let impl_path = fx.consumer_path("components/global/simple/impl.js");
        fs::write(&impl_path, "edited").unwrap();
        assert_eq!(fx.consumer.status().unwrap().modified, vec![id("global/simple")]);

        let err = fx
            .consumer
            .import(&id("remote/global/simple"), ImportOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Map(MapError::AlreadyExists(_))));

        let options = ImportOptions {
            path: None,
            overwrite: true,
        };
        fx.consumer
            .import(&id("remote/global/simple"), options)
            .await
            .unwrap();
        assert_eq!(
            fs::read_to_string(&impl_path).unwrap(),
            "module.exports = 'simple';"
        );
    }

    #[tokio::test]
    async fn import_reuses_existing_entry_and_its_paths() {
        let mut fx = Fixture::new();
        fx.author.create(&id("bar/foo"), false).unwrap();
        fx.author.commit(&[], "publish").await.unwrap();
        fx.author.export("remote", &[]).await.unwrap();

        fx.consumer.map.add(
            &id("bar/foo"),
            BTreeMap::from([("impl.js".to_string(), "utils/foo.js".to_string())]),
            Origin::Authored,
        );
        fx.consumer.map.save().unwrap();

        let outcome = fx
            .consumer
            .import(&id("remote/bar/foo"), ImportOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.written, vec![PathBuf::from("utils/foo.js")]);
        assert!(fx.consumer_path("utils/foo.js").is_file());
        assert!(!fx.consumer_path("components/bar/foo/impl.js").exists());

        let keys: Vec<String> = fx.consumer.map().ids().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["remote/bar/foo::1"]);
        let entry = fx.consumer.map().get(&id("remote/bar/foo::1")).unwrap();
        assert_eq!(entry.origin, Origin::Imported);
        assert_eq!(entry.disk_path("impl.js"), Some("utils/foo.js"));
    }

    #[tokio::test]
    async fn newer_version_replaces_unedited_import() {
        let mut fx = Fixture::new();
        fx.publish("simple", &[], &[]).await;
        fx.consumer
            .import(&id("remote/global/simple"), ImportOptions::default())
            .await
            .unwrap();

        let authored = fx.author.root().join("components/global/simple/impl.js");
        fs::write(authored, "module.exports = 'simple v2';").unwrap();
        fx.author.commit(&[], "v2").await.unwrap();
        fx.author.export("remote", &[]).await.unwrap();

        let outcome = fx
            .consumer
            .import(&id("remote/global/simple"), ImportOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.imported, id("remote/global/simple::2"));
        assert_eq!(
            fs::read_to_string(fx.consumer_path("components/global/simple/impl.js")).unwrap(),
            "module.exports = 'simple v2';"
        );
        let keys: Vec<String> = fx.consumer.map().ids().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["remote/global/simple::2"]);
        assert!(fx.consumer.status().unwrap().is_clean());
    }

    /// Serves a scope but appends a byte to every version object.
    struct CorruptVersions {
        inner: Arc<dyn RemoteTransport>,
    }

    #[async_trait]
    impl RemoteTransport for CorruptVersions {
        fn scope_name(&self) -> &str {
            self.inner.scope_name()
        }

        async fn fetch_object(&self, id: &ObjectId) -> comet_sync::SyncResult<StoredObject> {
            let object = self.inner.fetch_object(id).await?;
            if object.kind != ObjectKind::Version {
                return Ok(object);
            }
            let mut data = object.data;
            data.push(b' ');
            Ok(StoredObject::new(ObjectKind::Version, data))
        }

        async fn push_objects(
            &self,
            objects: &[StoredObject],
        ) -> comet_sync::SyncResult<comet_sync::PushAck> {
            self.inner.push_objects(objects).await
        }

        async fn fetch_component(
            &self,
            id: &ComponentId,
        ) -> comet_sync::SyncResult<Option<ComponentRecord>> {
            self.inner.fetch_component(id).await
        }

        async fn push_component(&self, record: &ComponentRecord) -> comet_sync::SyncResult<()> {
            self.inner.push_component(record).await
        }
    }

    #[tokio::test]
    async fn corrupted_version_object_is_rejected() {
        let mut fx = Fixture::new();
        fx.publish("simple", &[], &[]).await;
        let inner = fx.consumer.remote("remote").unwrap();
        fx.consumer.register_transport(Arc::new(CorruptVersions { inner }));

        let err = fx
            .consumer
            .import(&id("remote/global/simple"), ImportOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Sync(SyncError::Transport(_))), "{err}");
        assert!(fx
            .consumer
            .store()
            .read_component(&id("remote/global/simple"))
            .unwrap()
            .is_none());
        assert!(!fx.consumer_path("components/global/simple").exists());
    }

    #[tokio::test]
    async fn unknown_component_is_not_found() {
        let mut fx = Fixture::new();
        assert!(matches!(
            fx.consumer
                .import(&id("remote/global/nope"), ImportOptions::default())
                .await,
            Err(SdkError::ComponentNotFound(_))
        ));
    }
}
