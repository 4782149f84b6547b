use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use comet_types::ComponentId;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::entry::{MapEntry, Origin};
use crate::error::{MapError, MapResult};
use crate::structure::DirStructure;

/// File name of the persisted map, at the workspace root.
pub const MAP_FILE_NAME: &str = ".comet.map.json";

const MAP_FORMAT_VERSION: &str = "1";

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct MapFile {
    version: String,
    components: BTreeMap<ComponentId, MapEntry>,
}

/// Persisted table from component id to its on-disk location.
///
/// Loaded once per session; [`reload`](Self::reload) re-reads the file and
/// [`save`](Self::save) replaces it atomically.
#[derive(Debug)]
pub struct LocationMap {
    path: PathBuf,
    components: BTreeMap<ComponentId, MapEntry>,
    dirty: bool,
}

impl LocationMap {
    /// Load the map of the workspace at `root`. A missing file is an empty map.
    pub fn load(root: &Path) -> MapResult<Self> {
        let path = root.join(MAP_FILE_NAME);
        let components = Self::read(&path)?;
        debug!(path = %path.display(), entries = components.len(), "loaded location map");
        Ok(Self {
            path,
            components,
            dirty: false,
        })
    }

    fn read(path: &Path) -> MapResult<BTreeMap<ComponentId, MapEntry>> {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        let file: MapFile = serde_json::from_slice(&raw).map_err(|e| MapError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if file.version != MAP_FORMAT_VERSION {
            return Err(MapError::Malformed {
                path: path.to_path_buf(),
                reason: format!("unsupported map version {}", file.version),
            });
        }
        Ok(file.components)
    }

    /// Discard in-memory changes and re-read the persisted map.
    pub fn reload(&mut self) -> MapResult<()> {
        self.components = Self::read(&self.path)?;
        self.dirty = false;
        Ok(())
    }

    /// Write the map if it changed since the last load or save.
    pub fn save(&mut self) -> MapResult<()> {
        if !self.dirty && self.path.exists() {
            return Ok(());
        }
        let file = MapFile {
            version: MAP_FORMAT_VERSION.to_string(),
            components: self.components.clone(),
        };
        let json = serde_json::to_vec_pretty(&file).map_err(|e| MapError::Malformed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        let dir = self
            .path
            .parent()
            .ok_or_else(|| std::io::Error::other("map path has no parent"))?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| MapError::Io(e.error))?;
        self.dirty = false;
        info!(entries = self.components.len(), "saved location map");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn all_entries(&self) -> &BTreeMap<ComponentId, MapEntry> {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Entry stored under exactly `id`.
    pub fn get(&self, id: &ComponentId) -> Option<&MapEntry> {
        self.components.get(id)
    }

    /// Entry for `id`: exact key first, then the same namespace/name in any
    /// scope. Versions must agree unless either side is `latest`; among
    /// several matches the highest version wins, whatever the scope.
    pub fn find(&self, id: &ComponentId) -> Option<(&ComponentId, &MapEntry)> {
        if let Some(found) = self.components.get_key_value(id) {
            return Some(found);
        }
        self.components
            .iter()
            .filter(|(key, _)| {
                key.same_component(id)
                    && (id.version().is_latest()
                        || key.version().is_latest()
                        || key.version() == id.version())
            })
            .max_by_key(|(key, _)| key.version().exact())
    }

    /// Entry for the same namespace/name at any version, in a compatible
    /// scope (equal, or absent on either side). Exact key first.
    pub fn find_any_version(&self, id: &ComponentId) -> Option<(&ComponentId, &MapEntry)> {
        if let Some(found) = self.components.get_key_value(id) {
            return Some(found);
        }
        self.components
            .iter()
            .filter(|(key, _)| {
                key.same_component(id)
                    && match (key.scope(), id.scope()) {
                        (Some(a), Some(b)) => a == b,
                        _ => true,
                    }
            })
            .max_by_key(|(key, _)| key.version().exact())
    }

    pub fn contains(&self, id: &ComponentId) -> bool {
        self.find(id).is_some()
    }

    /// Register files for `id`.
    ///
    /// New files are merged into an existing entry and the origin follows
    /// [`Origin::merge`]. Returns the entry so callers can set the root dir
    /// or main file.
    pub fn add(
        &mut self,
        id: &ComponentId,
        files: BTreeMap<String, String>,
        origin: Origin,
    ) -> &mut MapEntry {
        self.dirty = true;
        let entry = self
            .components
            .entry(id.clone())
            .and_modify(|existing| {
                let merged = existing.origin.merge(origin);
                if merged != existing.origin {
                    debug!(%id, from = %existing.origin, to = %merged, "origin changed");
                }
                existing.origin = merged;
            })
            .or_insert_with(|| MapEntry::new(BTreeMap::new(), origin));
        entry.files.extend(files);
        entry
    }

    /// Move the entry found for `old` under `new`. Used when a component
    /// acquires a remote scope on export.
    pub fn rekey(&mut self, old: &ComponentId, new: &ComponentId) -> bool {
        let Some(key) = self.find(old).map(|(key, _)| key.clone()) else {
            return false;
        };
        if let Some(entry) = self.components.remove(&key) {
            debug!(from = %key, to = %new, "rekeyed map entry");
            self.components.insert(new.clone(), entry);
            self.dirty = true;
        }
        true
    }

    /// Ids of every registered component.
    pub fn ids(&self) -> impl Iterator<Item = &ComponentId> {
        self.components.keys()
    }

    /// Workspace-relative path where `relative` of `id` is written.
    ///
    /// Order: explicit file override, then the entry's root dir, then the
    /// default layout of `structure`.
    pub fn resolve_write_path(
        &self,
        id: &ComponentId,
        relative: &str,
        structure: &DirStructure,
    ) -> MapResult<PathBuf> {
        if let Some((_, entry)) = self.find(id) {
            if let Some(path) = entry.disk_path(relative) {
                return Ok(PathBuf::from(path));
            }
            if let Some(root) = &entry.root_dir {
                return Ok(Path::new(root).join(relative));
            }
        }
        Ok(structure.component_dir(id)?.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ComponentId {
        ComponentId::parse(s).unwrap()
    }

    fn files(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn empty_map() -> (tempfile::TempDir, LocationMap) {
        let dir = tempfile::tempdir().unwrap();
        let map = LocationMap::load(dir.path()).unwrap();
        (dir, map)
    }

    #[test]
    fn missing_file_is_empty_map() {
        let (_dir, map) = empty_map();
        assert!(map.is_empty());
    }

    #[test]
    fn save_and_reload() {
        let (dir, mut map) = empty_map();
        let simple = id("remote/global/simple::1");
        map.add(
            &simple,
            files(&[("impl.js", "components/global/simple/impl.js")]),
            Origin::Imported,
        )
        .root_dir = Some("components/global/simple".into());
        map.save().unwrap();

        let raw = fs::read_to_string(dir.path().join(MAP_FILE_NAME)).unwrap();
        assert!(raw.contains("\"remote/global/simple::1\""));
        assert!(raw.contains("\"IMPORTED\""));

        let reloaded = LocationMap::load(dir.path()).unwrap();
        assert_eq!(reloaded.all_entries(), map.all_entries());
    }

    #[test]
    fn reload_discards_unsaved_changes() {
        let (_dir, mut map) = empty_map();
        map.add(&id("bar/foo"), files(&[("impl.js", "foo.js")]), Origin::Authored);
        map.reload().unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn malformed_map_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MAP_FILE_NAME), b"{\"version\":\"1\"}").unwrap();
        assert!(matches!(
            LocationMap::load(dir.path()),
            Err(MapError::Malformed { .. })
        ));
    }

    #[test]
    fn origin_is_monotonic_across_adds() {
        let (_dir, mut map) = empty_map();
        let simple = id("remote/global/simple::1");
        map.add(&simple, BTreeMap::new(), Origin::Nested);
        assert_eq!(map.add(&simple, BTreeMap::new(), Origin::Imported).origin, Origin::Imported);
        assert_eq!(map.add(&simple, BTreeMap::new(), Origin::Nested).origin, Origin::Imported);
    }

    #[test]
    fn add_merges_files() {
        let (_dir, mut map) = empty_map();
        let foo = id("bar/foo");
        map.add(&foo, files(&[("impl.js", "foo.js")]), Origin::Authored);
        map.add(&foo, files(&[("spec.js", "foo.spec.js")]), Origin::Authored);
        assert_eq!(map.get(&foo).unwrap().files.len(), 2);
    }

    #[test]
    fn find_ignores_scope_and_latest() {
        let (_dir, mut map) = empty_map();
        map.add(&id("remote/global/simple::1"), BTreeMap::new(), Origin::Nested);
        map.add(&id("bar/foo"), BTreeMap::new(), Origin::Authored);

        let (key, _) = map.find(&id("global/simple")).unwrap();
        assert_eq!(key.to_string(), "remote/global/simple::1");
        assert!(map.find(&id("global/simple::1")).is_some());
        assert!(map.find(&id("global/simple::2")).is_none());
        assert!(map.find(&id("local/bar/foo::3")).is_some());
        assert!(map.find(&id("bar/other")).is_none());
    }

    #[test]
    fn find_prefers_highest_version_over_scope_order() {
        let (_dir, mut map) = empty_map();
        map.add(&id("alpha/global/simple::2"), BTreeMap::new(), Origin::Nested);
        map.add(&id("zeta/global/simple::1"), BTreeMap::new(), Origin::Nested);

        let (key, _) = map.find(&id("global/simple")).unwrap();
        assert_eq!(key.to_string(), "alpha/global/simple::2");
    }

    #[test]
    fn find_any_version_respects_scope() {
        let (_dir, mut map) = empty_map();
        map.add(&id("remote/global/simple::1"), BTreeMap::new(), Origin::Imported);

        assert!(map.find(&id("remote/global/simple::2")).is_none());
        let (key, _) = map.find_any_version(&id("remote/global/simple::2")).unwrap();
        assert_eq!(key.to_string(), "remote/global/simple::1");
        assert!(map.find_any_version(&id("global/simple::2")).is_some());
        assert!(map.find_any_version(&id("other/global/simple::2")).is_none());
    }

    #[test]
    fn rekey_moves_entry() {
        let (_dir, mut map) = empty_map();
        map.add(&id("bar/foo"), files(&[("impl.js", "foo.js")]), Origin::Authored);
        assert!(map.rekey(&id("bar/foo"), &id("remote/bar/foo::1")));
        assert!(map.get(&id("bar/foo")).is_none());
        assert_eq!(
            map.get(&id("remote/bar/foo::1")).unwrap().disk_path("impl.js"),
            Some("foo.js")
        );
        assert!(!map.rekey(&id("bar/missing"), &id("remote/bar/missing")));
    }

    #[test]
    fn write_path_prefers_override_then_root_then_layout() {
        let (_dir, mut map) = empty_map();
        let structure = DirStructure::default();
        let foo = id("bar/foo");
        map.add(&foo, files(&[("foo.js", "utils/foo.js")]), Origin::Authored)
            .root_dir = Some("custom".into());

        assert_eq!(
            map.resolve_write_path(&foo, "foo.js", &structure).unwrap(),
            Path::new("utils/foo.js")
        );
        assert_eq!(
            map.resolve_write_path(&foo, "impl.js", &structure).unwrap(),
            Path::new("custom/impl.js")
        );
        assert_eq!(
            map.resolve_write_path(&id("remote/global/simple::1"), "impl.js", &structure)
                .unwrap(),
            Path::new("components/global/simple/impl.js")
        );
    }

    #[test]
    fn write_path_without_layout_fallback_fails() {
        let (_dir, map) = empty_map();
        let structure = DirStructure::parse("vendor/{scope}/{name}").unwrap();
        assert!(matches!(
            map.resolve_write_path(&id("global/simple"), "impl.js", &structure),
            Err(MapError::PathNotRegistered { .. })
        ));
    }
}
