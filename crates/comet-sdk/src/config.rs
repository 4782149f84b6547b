//! Manifests read and written by a workspace.
//!
//! All three are JSON documents deserialized with `deny_unknown_fields`, so a
//! typo in a key is an error instead of a silently ignored setting.
//!
//! - [`ConsumerManifest`]: `comet.json` at the workspace root.
//! - [`ComponentManifest`]: optional `comet.json` inside a component directory.
//! - [`ScopeConfig`]: `scope.json` at the root of every scope directory.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use comet_map::{DirStructure, DEFAULT_STRUCTURE};
use comet_types::ComponentId;
use comet_version::DeclaredDependencies;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{SdkError, SdkResult};

/// File name of consumer and component manifests.
pub const MANIFEST_FILE: &str = "comet.json";
/// File name of a scope's configuration.
pub const SCOPE_FILE: &str = "scope.json";

fn read_json<T: DeserializeOwned>(path: &Path) -> SdkResult<T> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SdkError::ManifestNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&raw).map_err(|e| SdkError::InvalidManifest {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T, overwrite: bool) -> SdkResult<()> {
    if !overwrite && path.exists() {
        return Err(SdkError::ManifestAlreadyExists(path.to_path_buf()));
    }
    let mut json = serde_json::to_vec_pretty(value).map_err(|e| SdkError::InvalidManifest {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    json.push(b'\n');
    let dir = path
        .parent()
        .ok_or_else(|| SdkError::InvalidOperation(format!("{} has no parent", path.display())))?;
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&json)?;
    tmp.persist(path).map_err(|e| SdkError::Io(e.error))?;
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sources {
    #[serde(rename = "impl", default = "Sources::default_impl")]
    pub impl_file: String,
    #[serde(default = "Sources::default_spec")]
    pub spec: String,
}

impl Sources {
    fn default_impl() -> String {
        "impl.js".into()
    }

    fn default_spec() -> String {
        "spec.js".into()
    }
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            impl_file: Self::default_impl(),
            spec: Self::default_spec(),
        }
    }
}

/// Build and test tooling, recorded but never run by the engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Env {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tester: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dist {
    #[serde(default = "Dist::default_target")]
    pub target: String,
    #[serde(default = "Dist::default_entry")]
    pub entry: String,
}

impl Dist {
    fn default_target() -> String {
        "dist".into()
    }

    fn default_entry() -> String {
        ".".into()
    }
}

impl Default for Dist {
    fn default() -> Self {
        Self {
            target: Self::default_target(),
            entry: Self::default_entry(),
        }
    }
}

fn default_lang() -> String {
    "javascript".into()
}

fn default_structure() -> String {
    DEFAULT_STRUCTURE.into()
}

/// Workspace-level `comet.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConsumerManifest {
    #[serde(default)]
    pub sources: Sources,
    #[serde(default)]
    pub env: Env,
    /// Components imported into this workspace, by version-less id.
    #[serde(default)]
    pub dependencies: BTreeMap<ComponentId, String>,
    #[serde(default)]
    pub package_dependencies: BTreeMap<String, String>,
    #[serde(default = "default_lang")]
    pub lang: String,
    /// Directory layout template, see [`DirStructure`].
    #[serde(default = "default_structure")]
    pub structure: String,
    #[serde(default)]
    pub dist: Dist,
}

impl Default for ConsumerManifest {
    fn default() -> Self {
        Self {
            sources: Sources::default(),
            env: Env::default(),
            dependencies: BTreeMap::new(),
            package_dependencies: BTreeMap::new(),
            lang: default_lang(),
            structure: default_structure(),
            dist: Dist::default(),
        }
    }
}

impl ConsumerManifest {
    pub fn path(root: &Path) -> PathBuf {
        root.join(MANIFEST_FILE)
    }

    /// Load `comet.json` from `root`; fails with
    /// [`SdkError::ManifestNotFound`] when absent.
    pub fn load(root: &Path) -> SdkResult<Self> {
        read_json(&Self::path(root))
    }

    /// Write `comet.json` into `root`. Without `overwrite` an existing file
    /// fails with [`SdkError::ManifestAlreadyExists`].
    pub fn write(&self, root: &Path, overwrite: bool) -> SdkResult<()> {
        write_json(&Self::path(root), self, overwrite)
    }

    pub fn dir_structure(&self) -> SdkResult<DirStructure> {
        Ok(DirStructure::parse(&self.structure)?)
    }
}

/// Optional per-component `comet.json`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ComponentManifest {
    #[serde(default)]
    pub dependencies: BTreeMap<ComponentId, String>,
    #[serde(default)]
    pub package_dependencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl ComponentManifest {
    pub fn path(dir: &Path) -> PathBuf {
        dir.join(MANIFEST_FILE)
    }

    pub fn load(dir: &Path) -> SdkResult<Self> {
        read_json(&Self::path(dir))
    }

    /// Like [`load`](Self::load) but an absent manifest is `None`.
    pub fn load_optional(dir: &Path) -> SdkResult<Option<Self>> {
        match Self::load(dir) {
            Ok(manifest) => Ok(Some(manifest)),
            Err(SdkError::ManifestNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn write(&self, dir: &Path, overwrite: bool) -> SdkResult<()> {
        write_json(&Self::path(dir), self, overwrite)
    }

    pub fn declared(&self) -> DeclaredDependencies {
        DeclaredDependencies {
            components: self.dependencies.clone(),
            packages: self.package_dependencies.clone(),
        }
    }

    pub fn to_bytes(&self) -> SdkResult<Vec<u8>> {
        let mut json = serde_json::to_vec_pretty(self).map_err(|e| SdkError::InvalidManifest {
            path: PathBuf::from(MANIFEST_FILE),
            reason: e.to_string(),
        })?;
        json.push(b'\n');
        Ok(json)
    }
}

impl From<&DeclaredDependencies> for ComponentManifest {
    fn from(declared: &DeclaredDependencies) -> Self {
        Self {
            dependencies: declared.components.clone(),
            package_dependencies: declared.packages.clone(),
            lang: None,
        }
    }
}

/// `scope.json`: the name a scope is known by and, for a workspace's local
/// scope, the remotes it exports to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeConfig {
    pub name: String,
    /// Remote scope name to scope directory.
    #[serde(default)]
    pub remotes: BTreeMap<String, PathBuf>,
}

impl ScopeConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remotes: BTreeMap::new(),
        }
    }

    pub fn path(scope_dir: &Path) -> PathBuf {
        scope_dir.join(SCOPE_FILE)
    }

    pub fn load(scope_dir: &Path) -> SdkResult<Self> {
        read_json(&Self::path(scope_dir))
    }

    pub fn write(&self, scope_dir: &Path, overwrite: bool) -> SdkResult<()> {
        write_json(&Self::path(scope_dir), self, overwrite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_manifest_gets_defaults() {
        let manifest: ConsumerManifest = serde_json::from_str("{}").unwrap();
        assert_eq!(manifest, ConsumerManifest::default());
        assert_eq!(manifest.sources.impl_file, "impl.js");
        assert_eq!(manifest.sources.spec, "spec.js");
        assert_eq!(manifest.lang, "javascript");
        assert_eq!(manifest.structure, "components/{namespace}/{name}");
        assert_eq!(manifest.dist.target, "dist");
        assert_eq!(manifest.dist.entry, ".");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), br#"{"lang":"javascript","langg":"x"}"#).unwrap();
        assert!(matches!(
            ConsumerManifest::load(dir.path()),
            Err(SdkError::InvalidManifest { .. })
        ));
    }

    #[test]
    fn missing_manifest_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ConsumerManifest::load(dir.path()),
            Err(SdkError::ManifestNotFound(_))
        ));
        assert!(ComponentManifest::load_optional(dir.path()).unwrap().is_none());
    }

    #[test]
    fn write_refuses_to_clobber_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = ConsumerManifest::default();
        manifest.write(dir.path(), false).unwrap();
        assert!(matches!(
            manifest.write(dir.path(), false),
            Err(SdkError::ManifestAlreadyExists(_))
        ));
        manifest.write(dir.path(), true).unwrap();
        assert_eq!(ConsumerManifest::load(dir.path()).unwrap(), manifest);
    }

    #[test]
    fn component_manifest_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = ComponentManifest::default();
        manifest
            .dependencies
            .insert(ComponentId::parse("remote/global/simple").unwrap(), "1".into());
        manifest
            .package_dependencies
            .insert("lodash.get".into(), "4.4.2".into());
        manifest.write(dir.path(), false).unwrap();
        let loaded = ComponentManifest::load(dir.path()).unwrap();
        assert_eq!(loaded, manifest);
        assert_eq!(loaded.declared().packages["lodash.get"], "4.4.2");
    }

    #[test]
    fn scope_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ScopeConfig::new("local");
        config.remotes.insert("remote".into(), PathBuf::from("/srv/remote"));
        config.write(dir.path(), false).unwrap();
        assert_eq!(ScopeConfig::load(dir.path()).unwrap(), config);
    }

    #[test]
    fn invalid_structure_is_reported() {
        let manifest = ConsumerManifest {
            structure: "components/{nmae}".into(),
            ..ConsumerManifest::default()
        };
        assert!(matches!(manifest.dir_structure(), Err(SdkError::Map(_))));
    }
}
