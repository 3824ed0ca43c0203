//! Object storage backends for `gs://` arguments.
//!
//! The resolver only needs listing, an existence check and downloads, so the
//! backend is a small trait. Cloud client construction and auth live with the
//! caller; this crate ships an in-memory store (tests, embedding) and a
//! directory-backed store (local mirrors of a bucket).

pub mod dir;
pub mod memory;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ContentOrigin, LocationError};
use crate::scheme::Scheme;

pub use dir::DirectoryStore;
pub use memory::InMemoryStore;

/// One object returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectRef {
    /// Bucket holding the object.
    pub bucket: String,
    /// Full object key (`/`-separated).
    pub key: String,
}

impl ObjectRef {
    #[must_use]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Canonical `gs://bucket/key` form.
    #[must_use]
    pub fn uri(&self) -> String {
        format!("{}{}/{}", Scheme::Gs.prefix(), self.bucket, self.key)
    }
}

/// Read-only view of an object store.
pub trait ObjectStore: Send + Sync {
    /// Whether `bucket` exists.
    fn bucket_exists(&self, bucket: &str) -> bool;

    /// Objects of `bucket` whose key starts with `prefix`, in listing order.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::NotFound`] if the bucket does not exist, or
    /// [`LocationError::Storage`] if the listing fails.
    fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectRef>, LocationError>;

    /// Download the content of one object.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::NotFound`] if the bucket or object does not
    /// exist, or [`LocationError::Storage`] if the download fails.
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, LocationError>;
}

/// Download `bucket/key` and decode it as a JSON document.
///
/// # Errors
///
/// - [`LocationError::NotFound`] if the bucket or object does not exist
/// - [`LocationError::InvalidEncoding`] if the object is not UTF-8
/// - [`LocationError::MalformedContent`] if it is not valid JSON
pub fn load_object_json(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
) -> Result<Value, LocationError> {
    if !store.bucket_exists(bucket) {
        return Err(LocationError::NotFound {
            resource: format!("bucket {bucket}"),
        });
    }

    let uri = ObjectRef::new(bucket, key).uri();
    let bytes = store.get_object(bucket, key)?;
    let text = String::from_utf8(bytes).map_err(|_| LocationError::InvalidEncoding {
        source_name: uri.clone(),
    })?;
    tracing::debug!(uri = %uri, bytes = text.len(), "downloaded object");

    serde_json::from_str(&text).map_err(|e| LocationError::malformed(ContentOrigin::document(uri), e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn store() -> InMemoryStore {
        InMemoryStore::new()
            .with_object("msgs", "adt/a01.json", br#"{"segments": ["MSH", "PID"]}"#)
            .with_object("msgs", "adt/broken.json", b"{not json")
            .with_object("msgs", "adt/latin1.json", &[0xff, 0xfe])
    }

    #[test]
    fn test_uri() {
        assert_eq!(ObjectRef::new("b", "dir/k.json").uri(), "gs://b/dir/k.json");
    }

    #[test]
    fn test_load_object_json() {
        let value = load_object_json(&store(), "msgs", "adt/a01.json").unwrap();
        assert_eq!(value["segments"][1], "PID");
    }

    #[test]
    fn test_load_object_json_missing_bucket() {
        let err = load_object_json(&store(), "nope", "adt/a01.json").unwrap_err();
        assert!(matches!(err, LocationError::NotFound { .. }), "got: {err}");
    }

    #[test]
    fn test_load_object_json_missing_object() {
        let err = load_object_json(&store(), "msgs", "adt/a02.json").unwrap_err();
        assert!(matches!(err, LocationError::NotFound { .. }), "got: {err}");
    }

    #[test]
    fn test_load_object_json_malformed_names_uri() {
        let err = load_object_json(&store(), "msgs", "adt/broken.json").unwrap_err();
        match err {
            LocationError::MalformedContent { origin, .. } => {
                assert_eq!(origin, ContentOrigin::document("gs://msgs/adt/broken.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_object_json_invalid_utf8() {
        let err = load_object_json(&store(), "msgs", "adt/latin1.json").unwrap_err();
        assert!(matches!(err, LocationError::InvalidEncoding { .. }), "got: {err}");
    }
}
