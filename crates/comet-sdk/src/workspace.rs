//! A consumer workspace: the manifest, the local scope, the location map and
//! the working directory they describe.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use comet_map::{
    DirStructure, DiskFileSystem, FileSystem, LocationMap, MapEntry, MapError, Origin, WriteMode,
};
use comet_status::{ComponentLoader, ComponentsList, LoadResult, StatusReport};
use comet_store::{FsObjectStore, ObjectStore};
use comet_sync::{RemoteTransport, StoreRemote};
use comet_types::{ComponentId, Diagnostic, Diagnostics};
use comet_version::{DeclaredDependencies, FileRole, Representation, SourceFile};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{ComponentManifest, ConsumerManifest, ScopeConfig, MANIFEST_FILE};
use crate::error::{SdkError, SdkResult};

/// Directory holding the local scope inside a workspace.
pub const SCOPE_DIR: &str = ".comet";
/// Local scope name used when `init` is not given one.
pub const DEFAULT_SCOPE_NAME: &str = "local";
/// Where installed packages live, relative to the workspace root.
pub const PACKAGES_DIR: &str = "node_modules";

/// Outcome of [`Workspace::add`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddOutcome {
    pub id: ComponentId,
    /// Workspace-relative paths now tracked under `id`.
    pub files: Vec<String>,
}

/// Workspace-relative path with `/` separators, as stored in the map.
pub(crate) fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Deepest directory containing every path.
fn common_dir(files: &[PathBuf]) -> PathBuf {
    let mut dir = files
        .first()
        .and_then(|f| f.parent())
        .map(Path::to_path_buf)
        .unwrap_or_default();
    for file in files.iter().skip(1) {
        while !file.starts_with(&dir) {
            if !dir.pop() {
                break;
            }
        }
    }
    dir
}

/// Scope names share the segment rules of namespaces.
fn validate_scope_name(name: &str) -> SdkResult<()> {
    ComponentId::new(name, "probe")?;
    Ok(())
}

/// A consumer workspace rooted at a directory.
pub struct Workspace {
    pub(crate) root: PathBuf,
    pub(crate) consumer: ConsumerManifest,
    pub(crate) scope: ScopeConfig,
    pub(crate) store: Arc<dyn ObjectStore>,
    pub(crate) map: LocationMap,
    pub(crate) fs: DiskFileSystem,
    pub(crate) structure: DirStructure,
    transports: BTreeMap<String, Arc<dyn RemoteTransport>>,
    pub(crate) author: Option<String>,
}

impl Workspace {
    /// Create a workspace in `root`.
    ///
    /// An existing `comet.json` is kept; an existing local scope fails with
    /// [`SdkError::AlreadyInitialized`].
    pub fn init(root: &Path, scope_name: Option<&str>) -> SdkResult<Self> {
        let scope_dir = root.join(SCOPE_DIR);
        if ScopeConfig::path(&scope_dir).exists() {
            return Err(SdkError::AlreadyInitialized(root.to_path_buf()));
        }
        let name = scope_name.unwrap_or(DEFAULT_SCOPE_NAME);
        validate_scope_name(name)?;

        fs::create_dir_all(&scope_dir)?;
        match ConsumerManifest::load(root) {
            Ok(_) => debug!(root = %root.display(), "keeping existing manifest"),
            Err(SdkError::ManifestNotFound(_)) => ConsumerManifest::default().write(root, false)?,
            Err(e) => return Err(e),
        }
        ScopeConfig::new(name).write(&scope_dir, false)?;
        FsObjectStore::open(&scope_dir)?;
        LocationMap::load(root)?.save()?;

        info!(root = %root.display(), scope = name, "initialized workspace");
        Self::open(root)
    }

    /// Create a bare scope directory that workspaces can export to.
    pub fn init_bare(dir: &Path, name: &str) -> SdkResult<ScopeConfig> {
        validate_scope_name(name)?;
        if ScopeConfig::path(dir).exists() {
            return Err(SdkError::AlreadyInitialized(dir.to_path_buf()));
        }
        let config = ScopeConfig::new(name);
        config.write(dir, false)?;
        FsObjectStore::open(dir)?;
        info!(dir = %dir.display(), scope = name, "initialized bare scope");
        Ok(config)
    }

    /// Open the workspace rooted at `root`.
    pub fn open(root: &Path) -> SdkResult<Self> {
        let scope_dir = root.join(SCOPE_DIR);
        if !ScopeConfig::path(&scope_dir).exists() {
            return Err(SdkError::NotInitialized(root.to_path_buf()));
        }
        let consumer = ConsumerManifest::load(root)?;
        let scope = ScopeConfig::load(&scope_dir)?;
        let store: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::open(&scope_dir)?);
        let map = LocationMap::load(root)?;
        let structure = consumer.dir_structure()?;
        debug!(root = %root.display(), scope = %scope.name, components = map.len(), "opened workspace");
        Ok(Self {
            root: root.to_path_buf(),
            consumer,
            scope,
            store,
            map,
            fs: DiskFileSystem::new(root),
            structure,
            transports: BTreeMap::new(),
            author: None,
        })
    }

    /// Open the nearest workspace at or above `start`.
    pub fn discover(start: &Path) -> SdkResult<Self> {
        for dir in start.ancestors() {
            if ScopeConfig::path(&dir.join(SCOPE_DIR)).exists() {
                return Self::open(dir);
            }
        }
        Err(SdkError::NotInitialized(start.to_path_buf()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scope_name(&self) -> &str {
        &self.scope.name
    }

    pub fn consumer(&self) -> &ConsumerManifest {
        &self.consumer
    }

    pub fn map(&self) -> &LocationMap {
        &self.map
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn structure(&self) -> &DirStructure {
        &self.structure
    }

    /// Author recorded in the log of new versions.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    // ----- remotes -----

    /// Register the bare scope at `dir` as a remote. Returns its name.
    pub fn add_remote(&mut self, dir: &Path) -> SdkResult<String> {
        let remote = ScopeConfig::load(dir)?;
        if remote.name == self.scope.name {
            return Err(SdkError::InvalidOperation(format!(
                "remote {} has the same name as the local scope",
                remote.name
            )));
        }
        let dir = fs::canonicalize(dir)?;
        self.scope.remotes.insert(remote.name.clone(), dir);
        self.scope.write(&self.root.join(SCOPE_DIR), true)?;
        info!(remote = %remote.name, "added remote");
        Ok(remote.name)
    }

    /// Use `transport` for its scope instead of a configured directory.
    pub fn register_transport(&mut self, transport: Arc<dyn RemoteTransport>) {
        self.transports
            .insert(transport.scope_name().to_string(), transport);
    }

    /// Names of every reachable remote.
    pub fn remotes(&self) -> BTreeSet<&str> {
        self.transports
            .keys()
            .chain(self.scope.remotes.keys())
            .map(String::as_str)
            .collect()
    }

    pub fn remote(&self, name: &str) -> SdkResult<Arc<dyn RemoteTransport>> {
        if let Some(transport) = self.transports.get(name) {
            return Ok(Arc::clone(transport));
        }
        let dir = self
            .scope
            .remotes
            .get(name)
            .ok_or_else(|| SdkError::RemoteNotFound(name.to_string()))?;
        let config = ScopeConfig::load(dir)?;
        let store = FsObjectStore::open(dir)?;
        Ok(Arc::new(StoreRemote::new(config.name, Arc::new(store))))
    }

    /// Remote owning `id`: its scope when it has one, otherwise the only
    /// configured remote.
    pub(crate) fn remote_for(&self, id: &ComponentId) -> SdkResult<Arc<dyn RemoteTransport>> {
        if let Some(scope) = id.scope() {
            return self.remote(scope);
        }
        let remotes = self.remotes();
        match remotes.len() {
            1 => self.remote(remotes.iter().next().copied().unwrap_or_default()),
            0 => Err(SdkError::RemoteNotFound(id.to_string())),
            _ => Err(SdkError::InvalidOperation(format!(
                "{id} has no scope and several remotes are configured"
            ))),
        }
    }

    // ----- tracking -----

    /// Workspace-relative form of `path`.
    pub(crate) fn relative(&self, path: &Path) -> SdkResult<PathBuf> {
        if path.is_relative() {
            return Ok(path.to_path_buf());
        }
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .map_err(|_| {
                SdkError::InvalidOperation(format!(
                    "{} is outside the workspace",
                    path.display()
                ))
            })
    }

    /// Scaffold a new component in its layout directory and track it.
    pub fn create(&mut self, id: &ComponentId, with_manifest: bool) -> SdkResult<PathBuf> {
        if self.map.contains(id) {
            return Err(SdkError::ComponentAlreadyExists(id.clone()));
        }
        let dir = self.structure.component_dir(id)?;
        let impl_file = self.consumer.sources.impl_file.clone();
        let path = dir.join(&impl_file);
        let body = format!("// {}\nmodule.exports = {{}};\n", id.without_scope());
        self.fs
            .write_file(&path, body.as_bytes(), WriteMode::CREATE_NEW)?;
        if with_manifest {
            ComponentManifest::default().write(&self.fs.absolute(&dir), false)?;
        }

        let files = BTreeMap::from([(impl_file.clone(), slash_path(&path))]);
        let entry = self.map.add(id, files, Origin::Authored);
        entry.root_dir = Some(slash_path(&dir));
        entry.main_file = Some(impl_file);
        self.map.save()?;
        info!(%id, dir = %dir.display(), "created component");
        Ok(path)
    }

    /// Track existing files or directories as one component.
    ///
    /// Without an explicit id, the common directory of `paths` must match
    /// the workspace layout.
    pub fn add(
        &mut self,
        paths: &[PathBuf],
        id: Option<&ComponentId>,
        main_file: Option<&str>,
    ) -> SdkResult<AddOutcome> {
        let mut files = Vec::new();
        for path in paths {
            let relative = self.relative(path)?;
            let absolute = self.fs.absolute(&relative);
            if absolute.is_dir() {
                for entry in WalkDir::new(&absolute).sort_by_file_name() {
                    let entry = entry.map_err(|e| SdkError::Io(e.into()))?;
                    if entry.file_type().is_file() {
                        if let Ok(found) = entry.path().strip_prefix(&self.root) {
                            files.push(found.to_path_buf());
                        }
                    }
                }
            } else if absolute.is_file() {
                files.push(relative);
            } else {
                return Err(MapError::FileNotFound(relative).into());
            }
        }
        files.retain(|f| f.file_name() != Some(OsStr::new(MANIFEST_FILE)));
        files.sort();
        files.dedup();
        if files.is_empty() {
            return Err(SdkError::InvalidOperation("no files to add".into()));
        }

        let dir = common_dir(&files);
        let id = match id {
            Some(id) => id.clone(),
            None => dir
                .strip_prefix(self.structure.base_dir())
                .ok()
                .and_then(|rel| self.structure.candidate_id(rel))
                .ok_or_else(|| {
                    SdkError::InvalidOperation(format!(
                        "cannot derive a component id from {}; pass one explicitly",
                        dir.display()
                    ))
                })?,
        };

        let entries: BTreeMap<String, String> = files
            .iter()
            .map(|f| {
                let inside = f.strip_prefix(&dir).unwrap_or(f);
                (slash_path(inside), slash_path(f))
            })
            .collect();
        let tracked: Vec<String> = entries.values().cloned().collect();
        let default_main = if entries.contains_key(&self.consumer.sources.impl_file) {
            Some(self.consumer.sources.impl_file.clone())
        } else {
            entries.keys().next().cloned()
        };

        let entry = self.map.add(&id, entries, Origin::Authored);
        if entry.root_dir.is_none() && !dir.as_os_str().is_empty() {
            entry.root_dir = Some(slash_path(&dir));
        }
        match main_file {
            Some(main) => entry.main_file = Some(main.to_string()),
            None if entry.main_file.is_none() => entry.main_file = default_main,
            None => {}
        }
        self.map.save()?;
        info!(%id, files = tracked.len(), "tracked component");
        Ok(AddOutcome { id, files: tracked })
    }

    // ----- status -----

    pub(crate) fn loader(&self) -> WorkspaceLoader<'_> {
        WorkspaceLoader {
            fs: &self.fs,
            consumer: &self.consumer,
        }
    }

    pub(crate) fn components_list<'a>(
        &'a self,
        loader: &'a WorkspaceLoader<'a>,
    ) -> ComponentsList<'a> {
        ComponentsList::new(
            &*self.store,
            &self.map,
            &self.fs,
            &self.structure,
            loader,
            &self.scope.name,
        )
    }

    /// Untracked, new, modified and staged components.
    pub fn status(&self) -> SdkResult<StatusReport> {
        let loader = self.loader();
        let report = self.components_list(&loader).status()?;
        debug!(entries = report.total_entries(), "computed status");
        Ok(report)
    }

    /// Package dependencies that are neither installed nor tracked
    /// components.
    pub(crate) fn missing_packages(&self, packages: &BTreeMap<String, String>) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for (name, version) in packages {
            if self.root.join(PACKAGES_DIR).join(name).is_dir() {
                continue;
            }
            let known = ComponentId::parse(name).is_ok_and(|id| self.map.contains(&id));
            if known {
                continue;
            }
            warn!(package = %name, %version, "missing package dependency");
            diagnostics.push(Diagnostic::MissingPackageDependency {
                name: name.clone(),
                version: version.clone(),
            });
        }
        diagnostics
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("root", &self.root)
            .field("scope", &self.scope.name)
            .field("components", &self.map.len())
            .finish()
    }
}

/// Builds working-copy versions from the files a map entry points at.
pub struct WorkspaceLoader<'a> {
    fs: &'a DiskFileSystem,
    consumer: &'a ConsumerManifest,
}

impl WorkspaceLoader<'_> {
    fn role(&self, relative: &str, main_file: Option<&str>) -> FileRole {
        let sources = &self.consumer.sources;
        if relative == sources.spec {
            FileRole::Spec
        } else if relative == sources.impl_file || Some(relative) == main_file {
            FileRole::Impl
        } else {
            FileRole::Other
        }
    }

    /// Snapshot the component tracked by `entry`. Files that vanished are
    /// skipped; `None` when none are left.
    pub fn load_working_copy(
        &self,
        id: &ComponentId,
        entry: &MapEntry,
    ) -> SdkResult<Option<Representation>> {
        let mut sources = Vec::with_capacity(entry.files.len());
        for (relative, disk) in &entry.files {
            let path = Path::new(disk);
            if !self.fs.exists(path) {
                debug!(%id, file = %disk, "tracked file is missing");
                continue;
            }
            let contents = self.fs.read_file(path)?;
            let role = self.role(relative, entry.main_file.as_deref());
            sources.push(SourceFile::new(relative.clone(), contents, role));
        }
        if sources.is_empty() {
            return Ok(None);
        }

        let manifest = match entry.root_dir.as_deref() {
            Some(dir) if !dir.is_empty() && dir != "." => {
                ComponentManifest::load_optional(&self.fs.absolute(Path::new(dir)))?
            }
            _ => None,
        };
        let declared = manifest
            .as_ref()
            .map(ComponentManifest::declared)
            .unwrap_or_else(DeclaredDependencies::default);
        let lang = manifest
            .and_then(|m| m.lang)
            .unwrap_or_else(|| self.consumer.lang.clone());
        let snapshot = Representation::from_file_system(
            id.clone(),
            sources,
            &declared,
            entry.main_file.clone(),
            Some(lang),
        )?;
        Ok(Some(snapshot))
    }
}

impl ComponentLoader for WorkspaceLoader<'_> {
    fn load_from_file_system(&self, id: &ComponentId, entry: &MapEntry) -> LoadResult {
        Ok(self
            .load_working_copy(id, entry)?
            .map(Representation::into_version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::init(dir.path(), None).unwrap();
        (dir, ws)
    }

    fn id(s: &str) -> ComponentId {
        ComponentId::parse(s).unwrap()
    }

    #[test]
    fn init_creates_manifest_scope_and_map() {
        let (dir, ws) = workspace();
        assert!(dir.path().join(MANIFEST_FILE).is_file());
        assert!(dir.path().join(SCOPE_DIR).join("scope.json").is_file());
        assert!(dir.path().join(comet_map::MAP_FILE_NAME).is_file());
        assert_eq!(ws.scope_name(), DEFAULT_SCOPE_NAME);
        assert!(ws.status().unwrap().is_clean());
    }

    #[test]
    fn init_twice_fails() {
        let (dir, _ws) = workspace();
        assert!(matches!(
            Workspace::init(dir.path(), None),
            Err(SdkError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn open_without_init_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Workspace::open(dir.path()),
            Err(SdkError::NotInitialized(_))
        ));
    }

    #[test]
    fn discover_walks_up() {
        let (dir, _ws) = workspace();
        let nested = dir.path().join("components").join("bar");
        fs::create_dir_all(&nested).unwrap();
        let found = Workspace::discover(&nested).unwrap();
        assert_eq!(found.root(), dir.path());
    }

    #[test]
    fn create_writes_layout_and_tracks_component() {
        let (dir, mut ws) = workspace();
        let path = ws.create(&id("bar/foo"), true).unwrap();
        assert_eq!(path, Path::new("components/bar/foo/impl.js"));
        assert!(dir.path().join(&path).is_file());
        assert!(dir.path().join("components/bar/foo/comet.json").is_file());

        let (_, entry) = ws.map().find(&id("bar/foo")).unwrap();
        assert_eq!(entry.origin, Origin::Authored);
        assert_eq!(entry.root_dir.as_deref(), Some("components/bar/foo"));

        let status = ws.status().unwrap();
        assert_eq!(status.new, vec![id("bar/foo")]);
        assert!(status.untracked.is_empty());

        assert!(matches!(
            ws.create(&id("bar/foo"), false),
            Err(SdkError::ComponentAlreadyExists(_))
        ));
    }

    #[test]
    fn untracked_directory_is_reported_then_added() {
        let (dir, mut ws) = workspace();
        let component = dir.path().join("components/bar/foo");
        fs::create_dir_all(&component).unwrap();
        fs::write(component.join("impl.js"), "module.exports = 1;").unwrap();
        fs::write(component.join("spec.js"), "test").unwrap();
        fs::write(component.join(MANIFEST_FILE), "{}").unwrap();

        assert_eq!(ws.status().unwrap().untracked, vec![id("bar/foo")]);

        let added = ws
            .add(&[PathBuf::from("components/bar/foo")], None, None)
            .unwrap();
        assert_eq!(added.id, id("bar/foo"));
        assert_eq!(
            added.files,
            vec!["components/bar/foo/impl.js", "components/bar/foo/spec.js"]
        );
        let (_, entry) = ws.map().find(&id("bar/foo")).unwrap();
        assert_eq!(entry.main_file.as_deref(), Some("impl.js"));

        let status = ws.status().unwrap();
        assert!(status.untracked.is_empty());
        assert_eq!(status.new, vec![id("bar/foo")]);
    }

    #[test]
    fn add_outside_layout_needs_an_id() {
        let (dir, mut ws) = workspace();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/util.js"), "x").unwrap();
        assert!(matches!(
            ws.add(&[PathBuf::from("src/util.js")], None, None),
            Err(SdkError::InvalidOperation(_))
        ));
        let added = ws
            .add(&[PathBuf::from("src/util.js")], Some(&id("utils/util")), None)
            .unwrap();
        assert_eq!(added.id, id("utils/util"));
        let (_, entry) = ws.map().find(&id("utils/util")).unwrap();
        assert_eq!(entry.files["util.js"], "src/util.js");
        assert_eq!(entry.main_file.as_deref(), Some("util.js"));
    }

    #[test]
    fn add_missing_path_fails() {
        let (_dir, mut ws) = workspace();
        assert!(matches!(
            ws.add(&[PathBuf::from("nope.js")], Some(&id("a/b")), None),
            Err(SdkError::Map(MapError::FileNotFound(_)))
        ));
    }

    #[test]
    fn loader_reads_component_manifest() {
        let (dir, mut ws) = workspace();
        ws.create(&id("bar/foo"), false).unwrap();
        fs::write(
            dir.path().join("components/bar/foo/comet.json"),
            r#"{"packageDependencies":{"lodash.get":"4.4.2"}}"#,
        )
        .unwrap();
        let (key, entry) = ws.map().find(&id("bar/foo")).unwrap();
        let snapshot = ws
            .loader()
            .load_working_copy(key, entry)
            .unwrap()
            .unwrap();
        assert_eq!(
            snapshot.version().package_dependencies["lodash.get"],
            "4.4.2"
        );
        assert_eq!(snapshot.version().lang.as_deref(), Some("javascript"));
    }

    #[test]
    fn loader_skips_vanished_files() {
        let (dir, mut ws) = workspace();
        ws.create(&id("bar/foo"), false).unwrap();
        fs::remove_file(dir.path().join("components/bar/foo/impl.js")).unwrap();
        let (key, entry) = ws.map().find(&id("bar/foo")).unwrap();
        assert!(ws.loader().load_working_copy(key, entry).unwrap().is_none());
    }

    #[test]
    fn remotes_resolve_by_scope_or_uniqueness() {
        let (dir, mut ws) = workspace();
        let remote_dir = dir.path().join("remote-scope");
        Workspace::init_bare(&remote_dir, "remote").unwrap();
        assert_eq!(ws.add_remote(&remote_dir).unwrap(), "remote");

        let reopened = Workspace::open(dir.path()).unwrap();
        assert_eq!(reopened.remotes(), BTreeSet::from(["remote"]));
        assert_eq!(
            reopened.remote_for(&id("bar/foo")).unwrap().scope_name(),
            "remote"
        );
        assert!(matches!(
            reopened.remote("elsewhere"),
            Err(SdkError::RemoteNotFound(_))
        ));
    }

    #[test]
    fn missing_packages_respect_installed_modules() {
        let (dir, ws) = workspace();
        let packages = BTreeMap::from([("lodash.get".to_string(), "4.4.2".to_string())]);
        let missing = ws.missing_packages(&packages);
        assert_eq!(missing.missing_packages(), vec![("lodash.get", "4.4.2")]);

        fs::create_dir_all(dir.path().join(PACKAGES_DIR).join("lodash.get")).unwrap();
        assert!(ws.missing_packages(&packages).is_empty());
    }
}
