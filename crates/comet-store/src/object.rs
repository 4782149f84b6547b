use comet_crypto::ContentHasher;
use comet_types::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// The kind of content object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Raw bytes of one component source file.
    Source,
    /// A serialized component version (file refs, dependencies, log).
    Version,
}

impl ObjectKind {
    /// The tag written in front of the payload by on-disk stores.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Version => "version",
        }
    }

    /// Parse an on-disk tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "source" => Some(Self::Source),
            "version" => Some(Self::Version),
            _ => None,
        }
    }

    fn hasher(&self) -> &'static ContentHasher {
        match self {
            Self::Source => &ContentHasher::SOURCE,
            Self::Version => &ContentHasher::VERSION,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// A stored object: kind tag + serialized data + cached size.
///
/// `StoredObject` is the unit of storage. The store never interprets the
/// contents; it only hashes them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The serialized bytes of the object.
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and data.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID for this object.
    pub fn compute_id(&self) -> ObjectId {
        self.kind.hasher().hash(&self.data)
    }

    /// Fail with [`StoreError::CorruptObject`] unless this object has `kind`.
    pub fn expect_kind(&self, kind: ObjectKind) -> StoreResult<()> {
        if self.kind != kind {
            return Err(StoreError::CorruptObject {
                id: self.compute_id(),
                reason: format!("expected {kind}, got {}", self.kind),
            });
        }
        Ok(())
    }
}

/// Raw content of a single component file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceObject {
    pub contents: Vec<u8>,
}

impl SourceObject {
    pub fn new(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Source, self.contents.clone())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Source)?;
        Ok(Self {
            contents: obj.data.clone(),
        })
    }

    /// The key this source is stored under.
    pub fn object_id(&self) -> ObjectId {
        ContentHasher::SOURCE.hash(&self.contents)
    }
}
