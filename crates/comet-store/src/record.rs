use std::collections::BTreeMap;

use comet_types::{ComponentId, ObjectId, VersionSpec};
use serde::{Deserialize, Serialize};

/// Top-level record of one component inside a scope.
///
/// The record id is scoped and version-less (`remote/global/simple`); every
/// committed version maps to the key of its version object. `latest` is the
/// highest version number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub id: ComponentId,
    pub versions: BTreeMap<u32, ObjectId>,
}

impl ComponentRecord {
    /// Create an empty record. The version part of `id` is dropped.
    pub fn new(id: &ComponentId) -> Self {
        Self {
            id: id.with_version(VersionSpec::Latest),
            versions: BTreeMap::new(),
        }
    }

    /// Highest committed version and its object key.
    pub fn latest(&self) -> Option<(u32, ObjectId)> {
        self.versions.iter().next_back().map(|(v, id)| (*v, *id))
    }

    /// [`VersionSpec`] of the latest version (`Latest` for an empty record).
    pub fn latest_version(&self) -> VersionSpec {
        self.latest()
            .map_or(VersionSpec::Latest, |(v, _)| VersionSpec::Exact(v))
    }

    /// Resolve a version spec against this record.
    pub fn get(&self, version: VersionSpec) -> Option<(u32, ObjectId)> {
        match version {
            VersionSpec::Latest => self.latest(),
            VersionSpec::Exact(v) => self.versions.get(&v).map(|id| (v, *id)),
        }
    }

    /// Record a committed version. Existing version numbers are immutable,
    /// so re-adding one is ignored.
    pub fn add_version(&mut self, version: u32, object_id: ObjectId) {
        self.versions.entry(version).or_insert(object_id);
    }

    /// The record id pinned to a concrete version.
    pub fn id_at(&self, version: u32) -> ComponentId {
        self.id.with_version(VersionSpec::Exact(version))
    }

    /// The same versions, owned by another scope.
    pub fn rescoped(&self, scope: &str) -> Self {
        Self {
            id: self.id.with_scope(Some(scope)),
            versions: self.versions.clone(),
        }
    }

    /// File-name-safe form of the record id.
    pub fn storage_key(id: &ComponentId) -> String {
        id.with_version(VersionSpec::Latest)
            .to_string()
            .replace('/', "~")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ComponentRecord {
        ComponentRecord::new(&ComponentId::parse("local/bar/foo::3").unwrap())
    }

    #[test]
    fn new_record_drops_version() {
        let r = record();
        assert_eq!(r.id.to_string(), "local/bar/foo");
        assert!(r.latest().is_none());
        assert!(r.latest_version().is_latest());
    }

    #[test]
    fn latest_is_highest_version() {
        let mut r = record();
        r.add_version(1, ObjectId::from_bytes(b"v1"));
        r.add_version(2, ObjectId::from_bytes(b"v2"));
        assert_eq!(r.latest(), Some((2, ObjectId::from_bytes(b"v2"))));
        assert_eq!(r.get(VersionSpec::Exact(1)).map(|(v, _)| v), Some(1));
        assert!(r.get(VersionSpec::Exact(7)).is_none());
    }

    #[test]
    fn versions_are_immutable() {
        let mut r = record();
        r.add_version(1, ObjectId::from_bytes(b"first"));
        r.add_version(1, ObjectId::from_bytes(b"second"));
        assert_eq!(r.versions[&1], ObjectId::from_bytes(b"first"));
    }

    #[test]
    fn rescoped_keeps_versions() {
        let mut r = record();
        r.add_version(1, ObjectId::from_bytes(b"v1"));
        let remote = r.rescoped("remote");
        assert_eq!(remote.id.scope(), Some("remote"));
        assert_eq!(remote.versions, r.versions);
    }

    #[test]
    fn storage_key_has_no_separators() {
        let id = ComponentId::parse("remote/global/simple::2").unwrap();
        assert_eq!(ComponentRecord::storage_key(&id), "remote~global~simple");
    }

    #[test]
    fn json_roundtrip() {
        let mut r = record();
        r.add_version(1, ObjectId::from_bytes(b"v1"));
        let json = serde_json::to_string(&r).unwrap();
        let back: ComponentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
