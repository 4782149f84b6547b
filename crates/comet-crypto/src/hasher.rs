use comet_types::ObjectId;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g. `"comet-source-v1"`) prepended to
/// every hash computation, so a source file and a version object with
/// identical bytes never share a key.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for raw component source files.
    pub const SOURCE: Self = Self {
        domain: "comet-source-v1",
    };
    /// Hasher for serialized version objects (log included).
    pub const VERSION: Self = Self {
        domain: "comet-version-v1",
    };
    /// Hasher for the drift-comparison projection of a version (log excluded).
    pub const COMPARISON: Self = Self {
        domain: "comet-comparison-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ObjectId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Hash a serializable value as JSON with domain separation.
    ///
    /// Callers must only pass values whose JSON form is deterministic
    /// (ordered maps, sorted vectors).
    pub fn hash_json<T: serde::Serialize>(&self, value: &T) -> Result<ObjectId, HasherError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        Ok(self.hash(&data))
    }

    /// Verify that data produces the expected object ID.
    pub fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn different_domains_produce_different_hashes() {
        let data = b"same content";
        let source = ContentHasher::SOURCE.hash(data);
        let version = ContentHasher::VERSION.hash(data);
        let comparison = ContentHasher::COMPARISON.hash(data);
        assert_ne!(source, version);
        assert_ne!(source, comparison);
        assert_ne!(version, comparison);
    }

    #[test]
    fn verify_detects_tampering() {
        let id = ContentHasher::SOURCE.hash(b"original");
        assert!(ContentHasher::SOURCE.verify(b"original", &id));
        assert!(!ContentHasher::SOURCE.verify(b"tampered", &id));
    }

    #[test]
    fn hash_json_is_stable_for_ordered_maps() {
        let mut a = BTreeMap::new();
        a.insert("b", 2);
        a.insert("a", 1);
        let mut b = BTreeMap::new();
        b.insert("a", 1);
        b.insert("b", 2);
        assert_eq!(
            ContentHasher::COMPARISON.hash_json(&a).unwrap(),
            ContentHasher::COMPARISON.hash_json(&b).unwrap()
        );
    }

    #[test]
    fn custom_domain() {
        let hasher = ContentHasher::new("comet-test-v1");
        assert_eq!(hasher.domain(), "comet-test-v1");
        assert_ne!(hasher.hash(b"data"), ContentHasher::SOURCE.hash(b"data"));
    }

    proptest! {
        #[test]
        fn hash_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(ContentHasher::SOURCE.hash(&data), ContentHasher::SOURCE.hash(&data));
        }
    }
}
