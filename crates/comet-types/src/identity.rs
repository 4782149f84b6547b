use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Namespace assigned to ids written with a bare name (`simple` ==
/// `global/simple`).
pub const DEFAULT_NAMESPACE: &str = "global";

/// Separator between the path part of an id and its version.
const VERSION_DELIMITER: &str = "::";

/// The version part of a [`ComponentId`].
///
/// `Latest` sorts before every exact version.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VersionSpec {
    /// Whatever the newest committed version is at resolution time.
    #[default]
    Latest,
    /// A concrete committed version. Versions start at 1.
    Exact(u32),
}

impl VersionSpec {
    /// Returns `true` for [`VersionSpec::Latest`].
    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }

    /// The exact version number, if any.
    pub fn exact(&self) -> Option<u32> {
        match self {
            Self::Latest => None,
            Self::Exact(v) => Some(*v),
        }
    }

    /// The version a commit on top of `self` receives.
    pub fn next(&self) -> Self {
        match self {
            Self::Latest => Self::Exact(1),
            Self::Exact(v) => Self::Exact(v + 1),
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Exact(v) => write!(f, "{v}"),
        }
    }
}

impl FromStr for VersionSpec {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "latest" {
            return Ok(Self::Latest);
        }
        match s.parse::<u32>() {
            Ok(v) if v > 0 => Ok(Self::Exact(v)),
            _ => Err(TypeError::MalformedIdentity {
                input: s.to_string(),
                reason: "version must be `latest` or a positive integer".into(),
            }),
        }
    }
}

impl Serialize for VersionSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Logical identity of a component.
///
/// Four parts: an optional scope (the store that owns exported versions; absent
/// until the component is exported or imported), a namespace, a name and a
/// version. Two ids are equal iff all four parts match. Comparisons across
/// stores go through [`ComponentId::without_scope`].
///
/// The canonical string form is `[scope/]namespace/name[::version]` and is what
/// `Display` writes, `FromStr` reads and serde uses, so ids can key JSON maps.
///
/// # Examples
///
/// ```
/// use comet_types::{ComponentId, VersionSpec};
///
/// let id: ComponentId = "@remote/global/simple::1".parse().unwrap();
/// assert_eq!(id.scope(), Some("remote"));
/// assert_eq!(id.version(), VersionSpec::Exact(1));
/// assert_eq!(id.to_string(), "remote/global/simple::1");
/// assert_eq!(id.without_scope().to_string(), "global/simple::1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId {
    scope: Option<String>,
    namespace: String,
    name: String,
    version: VersionSpec,
}

impl ComponentId {
    /// Build an unscoped id at `latest`, validating both segments.
    pub fn new(namespace: &str, name: &str) -> Result<Self, TypeError> {
        validate_segment(namespace, namespace)?;
        validate_segment(name, name)?;
        Ok(Self {
            scope: None,
            namespace: namespace.to_string(),
            name: name.to_string(),
            version: VersionSpec::Latest,
        })
    }

    /// Parse the canonical string form.
    ///
    /// Accepts `name`, `namespace/name` and `scope/namespace/name`, each with
    /// an optional `::version` suffix and an optional leading `@`.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let malformed = |reason: &str| TypeError::MalformedIdentity {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let (path, version) = match trimmed.rsplit_once(VERSION_DELIMITER) {
            Some((path, version)) => (
                path,
                version
                    .parse::<VersionSpec>()
                    .map_err(|_| malformed("version must be `latest` or a positive integer"))?,
            ),
            None => (trimmed, VersionSpec::Latest),
        };
        let path = path.strip_prefix('@').unwrap_or(path);

        let segments: Vec<&str> = path.split('/').collect();
        let (scope, namespace, name) = match segments.as_slice() {
            [name] => (None, DEFAULT_NAMESPACE, *name),
            [namespace, name] => (None, *namespace, *name),
            [scope, namespace, name] => (Some(*scope), *namespace, *name),
            _ => return Err(malformed("expected at most three `/`-separated segments")),
        };

        if let Some(scope) = scope {
            validate_segment(input, scope)?;
        }
        validate_segment(input, namespace)?;
        validate_segment(input, name)?;

        Ok(Self {
            scope: scope.map(str::to_string),
            namespace: namespace.to_string(),
            name: name.to_string(),
            version,
        })
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> VersionSpec {
        self.version
    }

    /// Returns `true` if the id carries a scope.
    pub fn has_scope(&self) -> bool {
        self.scope.is_some()
    }

    /// Copy of this id with the scope replaced (or removed with `None`).
    pub fn with_scope(&self, scope: Option<&str>) -> Self {
        Self {
            scope: scope.map(str::to_string),
            ..self.clone()
        }
    }

    /// Copy of this id without a scope; compares equal across stores.
    pub fn without_scope(&self) -> Self {
        self.with_scope(None)
    }

    /// Copy of this id with the version replaced.
    pub fn with_version(&self, version: VersionSpec) -> Self {
        Self {
            version,
            ..self.clone()
        }
    }

    /// `namespace/name`: the key two ids share when they name the same
    /// component regardless of scope or version.
    pub fn component_key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    /// Same namespace and name, ignoring scope and version.
    pub fn same_component(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.name == other.name
    }
}

fn validate_segment(input: &str, segment: &str) -> Result<(), TypeError> {
    let reason = if segment.is_empty() {
        Some("segments must not be empty")
    } else if segment.starts_with('.') {
        Some("segments must not start with '.'")
    } else if !segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        Some("segments may only contain ASCII letters, digits, '-', '_' and '.'")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(TypeError::MalformedIdentity {
            input: input.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scope) = &self.scope {
            write!(f, "{scope}/")?;
        }
        write!(f, "{}/{}", self.namespace, self.name)?;
        if let VersionSpec::Exact(v) = self.version {
            write!(f, "{VERSION_DELIMITER}{v}")?;
        }
        Ok(())
    }
}

impl FromStr for ComponentId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ComponentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ComponentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn bare_name_gets_default_namespace() {
        let id = ComponentId::parse("simple").unwrap();
        assert_eq!(id.namespace(), DEFAULT_NAMESPACE);
        assert_eq!(id.name(), "simple");
        assert!(id.version().is_latest());
        assert_eq!(id.to_string(), "global/simple");
    }

    #[test]
    fn namespace_and_name() {
        let id = ComponentId::parse("bar/foo").unwrap();
        assert_eq!(id.scope(), None);
        assert_eq!(id.component_key(), "bar/foo");
    }

    #[test]
    fn scoped_with_version() {
        let id = ComponentId::parse("remote/global/simple::1").unwrap();
        assert_eq!(id.scope(), Some("remote"));
        assert_eq!(id.version(), VersionSpec::Exact(1));
    }

    #[test]
    fn at_prefix_is_accepted_but_not_emitted() {
        let id = ComponentId::parse("@remote/global/simple").unwrap();
        assert_eq!(id.scope(), Some("remote"));
        assert_eq!(id.to_string(), "remote/global/simple");
    }

    #[test]
    fn explicit_latest_is_omitted_from_display() {
        let id = ComponentId::parse("bar/foo::latest").unwrap();
        assert!(id.version().is_latest());
        assert_eq!(id.to_string(), "bar/foo");
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        for input in [
            "",
            "a/b/c/d",
            "bar//foo",
            "bar/foo::0",
            "bar/foo::x",
            "bar/fo o",
            "bar/.hidden",
        ] {
            let err = ComponentId::parse(input).unwrap_err();
            assert!(
                matches!(err, TypeError::MalformedIdentity { .. }),
                "{input:?} should be malformed"
            );
        }
    }

    #[test]
    fn with_scope_is_pure() {
        let id = ComponentId::parse("bar/foo::2").unwrap();
        let scoped = id.with_scope(Some("local"));
        assert_eq!(id.scope(), None);
        assert_eq!(scoped.scope(), Some("local"));
        assert_eq!(scoped.without_scope(), id);
    }

    #[test]
    fn equality_needs_all_four_parts() {
        let a = ComponentId::parse("s1/bar/foo::1").unwrap();
        let b = ComponentId::parse("s2/bar/foo::1").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.without_scope(), b.without_scope());
        assert!(a.same_component(&b.with_version(VersionSpec::Exact(3))));
    }

    #[test]
    fn ordering_is_total_and_deterministic() {
        let mut ids: Vec<ComponentId> = ["global/b", "global/a::2", "global/a::1", "global/a"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        ids.sort();
        let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            ["global/a", "global/a::1", "global/a::2", "global/b"]
        );
    }

    #[test]
    fn next_version() {
        assert_eq!(VersionSpec::Latest.next(), VersionSpec::Exact(1));
        assert_eq!(VersionSpec::Exact(4).next(), VersionSpec::Exact(5));
    }

    #[test]
    fn ids_key_json_maps() {
        let mut deps = BTreeMap::new();
        deps.insert(ComponentId::parse("remote/global/simple").unwrap(), "1".to_string());
        let json = serde_json::to_string(&deps).unwrap();
        assert_eq!(json, r#"{"remote/global/simple":"1"}"#);
        let back: BTreeMap<ComponentId, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, deps);
    }

    fn segment() -> impl Strategy<Value = String> {
        "[a-z0-9][a-z0-9_.-]{0,12}"
    }

    proptest! {
        #[test]
        fn display_parse_roundtrip(
            scope in proptest::option::of(segment()),
            namespace in segment(),
            name in segment(),
            version in proptest::option::of(1u32..10_000),
        ) {
            let id = ComponentId::new(&namespace, &name)
                .unwrap()
                .with_scope(scope.as_deref())
                .with_version(version.map_or(VersionSpec::Latest, VersionSpec::Exact));
            let parsed = ComponentId::parse(&id.to_string()).unwrap();
            prop_assert_eq!(parsed, id);
        }
    }
}
