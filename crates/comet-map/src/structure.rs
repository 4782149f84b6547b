use std::fmt;
use std::path::{Path, PathBuf};

use comet_types::{ComponentId, DEFAULT_NAMESPACE};

use crate::error::{MapError, MapResult};

/// Layout used when a consumer manifest does not set one.
pub const DEFAULT_STRUCTURE: &str = "components/{namespace}/{name}";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Part {
    Scope,
    Namespace,
    Name,
    Version,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Static(String),
    Dynamic(Part),
}

/// Parsed directory-structure template such as `components/{namespace}/{name}`.
///
/// Leading static segments form the base directory; everything after it is
/// matched segment by segment when scanning for untracked components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirStructure {
    template: String,
    segments: Vec<Segment>,
}

impl DirStructure {
    pub fn parse(template: &str) -> MapResult<Self> {
        let invalid = |reason: &str| MapError::InvalidStructure {
            template: template.to_string(),
            reason: reason.to_string(),
        };
        let trimmed = template.trim_matches('/');
        if trimmed.is_empty() {
            return Err(invalid("empty template"));
        }
        let mut segments = Vec::new();
        for raw in trimmed.split('/') {
            let segment = match raw {
                "" | "." | ".." => return Err(invalid("empty or relative segment")),
                "{scope}" => Segment::Dynamic(Part::Scope),
                "{namespace}" => Segment::Dynamic(Part::Namespace),
                "{name}" => Segment::Dynamic(Part::Name),
                "{version}" => Segment::Dynamic(Part::Version),
                s if s.contains(['{', '}']) => {
                    return Err(invalid(&format!("unknown placeholder {s}")))
                }
                s => Segment::Static(s.to_string()),
            };
            segments.push(segment);
        }
        if !segments.contains(&Segment::Dynamic(Part::Name)) {
            return Err(invalid("missing {name}"));
        }
        Ok(Self {
            template: template.to_string(),
            segments,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    fn base_len(&self) -> usize {
        self.segments
            .iter()
            .position(|s| matches!(s, Segment::Dynamic(_)))
            .unwrap_or(self.segments.len())
    }

    /// Static prefix under which components are discovered.
    pub fn base_dir(&self) -> PathBuf {
        self.segments[..self.base_len()]
            .iter()
            .filter_map(|s| match s {
                Segment::Static(s) => Some(s.as_str()),
                Segment::Dynamic(_) => None,
            })
            .collect()
    }

    /// Number of directory levels below [`base_dir`](Self::base_dir) that
    /// identify one component.
    pub fn scan_depth(&self) -> usize {
        self.segments.len() - self.base_len()
    }

    /// Default layout directory of `id`, relative to the workspace root.
    pub fn component_dir(&self, id: &ComponentId) -> MapResult<PathBuf> {
        let missing = |part: &str| MapError::PathNotRegistered {
            id: id.clone(),
            reason: format!("layout {} needs a {part}", self.template),
        };
        let mut dir = PathBuf::new();
        for segment in &self.segments {
            match segment {
                Segment::Static(s) => dir.push(s),
                Segment::Dynamic(Part::Scope) => dir.push(id.scope().ok_or_else(|| missing("scope"))?),
                Segment::Dynamic(Part::Namespace) => dir.push(id.namespace()),
                Segment::Dynamic(Part::Name) => dir.push(id.name()),
                Segment::Dynamic(Part::Version) => {
                    let version = id.version().exact().ok_or_else(|| missing("version"))?;
                    dir.push(version.to_string());
                }
            }
        }
        Ok(dir)
    }

    /// Map a directory found `scan_depth` levels below the base back to the
    /// id it would hold. `relative` is relative to the base directory.
    pub fn candidate_id(&self, relative: &Path) -> Option<ComponentId> {
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        let dynamic = &self.segments[self.base_len()..];
        if parts.len() != dynamic.len() {
            return None;
        }

        let (mut scope, mut namespace, mut name, mut version) = (None, None, None, None);
        for (segment, value) in dynamic.iter().zip(parts) {
            match segment {
                Segment::Static(s) if s == value => {}
                Segment::Static(_) => return None,
                Segment::Dynamic(Part::Scope) => scope = Some(value),
                Segment::Dynamic(Part::Namespace) => namespace = Some(value),
                Segment::Dynamic(Part::Name) => name = Some(value),
                Segment::Dynamic(Part::Version) => version = Some(value.parse().ok()?),
            }
        }
        let id = ComponentId::new(namespace.unwrap_or(DEFAULT_NAMESPACE), name?).ok()?;
        let id = id.with_scope(scope);
        Some(match version {
            Some(v) => id.with_version(v),
            None => id,
        })
    }
}

impl Default for DirStructure {
    fn default() -> Self {
        Self {
            template: DEFAULT_STRUCTURE.to_string(),
            segments: vec![
                Segment::Static("components".into()),
                Segment::Dynamic(Part::Namespace),
                Segment::Dynamic(Part::Name),
            ],
        }
    }
}

impl fmt::Display for DirStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}
