//! In-memory object store.

use std::collections::BTreeMap;

use super::{ObjectRef, ObjectStore};
use crate::error::LocationError;

/// Buckets of objects held in memory; listings return insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    buckets: BTreeMap<String, Vec<(String, Vec<u8>)>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty bucket.
    #[must_use]
    pub fn with_bucket(mut self, bucket: &str) -> Self {
        self.buckets.entry(bucket.to_owned()).or_default();
        self
    }

    /// Add an object, creating its bucket if needed.
    #[must_use]
    pub fn with_object(mut self, bucket: &str, key: &str, content: &[u8]) -> Self {
        self.insert(bucket, key, content.to_vec());
        self
    }

    /// Insert or replace an object. A replaced object keeps its listing position.
    pub fn insert(&mut self, bucket: &str, key: &str, content: Vec<u8>) {
        let objects = self.buckets.entry(bucket.to_owned()).or_default();
        match objects.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = content,
            None => objects.push((key.to_owned(), content)),
        }
    }

    fn bucket(&self, bucket: &str) -> Result<&[(String, Vec<u8>)], LocationError> {
        self.buckets
            .get(bucket)
            .map(Vec::as_slice)
            .ok_or_else(|| LocationError::NotFound {
                resource: format!("bucket {bucket}"),
            })
    }
}

impl ObjectStore for InMemoryStore {
    fn bucket_exists(&self, bucket: &str) -> bool {
        self.buckets.contains_key(bucket)
    }

    fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectRef>, LocationError> {
        Ok(self
            .bucket(bucket)?
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| ObjectRef::new(bucket, key.as_str()))
            .collect())
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, LocationError> {
        self.bucket(bucket)?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| LocationError::NotFound {
                resource: ObjectRef::new(bucket, key).uri(),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_keeps_insertion_order_and_prefix() {
        let store = InMemoryStore::new()
            .with_object("b", "z.json", b"{}")
            .with_object("b", "lib/a.wstl", b"")
            .with_object("b", "lib2/c.wstl", b"")
            .with_object("b", "lib/b.wstl", b"");
        let keys: Vec<_> = store
            .list_objects("b", "lib")
            .unwrap()
            .into_iter()
            .map(|o| o.key)
            .collect();
        assert_eq!(keys, vec!["lib/a.wstl", "lib2/c.wstl", "lib/b.wstl"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut store = InMemoryStore::new()
            .with_object("b", "a", b"1")
            .with_object("b", "c", b"3");
        store.insert("b", "a", b"2".to_vec());
        assert_eq!(store.get_object("b", "a").unwrap(), b"2");
        let keys: Vec<_> = store
            .list_objects("b", "")
            .unwrap()
            .into_iter()
            .map(|o| o.key)
            .collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_empty_bucket_exists() {
        let store = InMemoryStore::new().with_bucket("empty");
        assert!(store.bucket_exists("empty"));
        assert!(store.list_objects("empty", "").unwrap().is_empty());
        assert!(!store.bucket_exists("other"));
        assert!(store.list_objects("other", "").is_err());
    }
}
