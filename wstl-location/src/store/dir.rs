//! Directory-backed object store.
//!
//! Each subdirectory of the root is a bucket; object keys are the `/`-joined
//! relative paths of the regular files below it. Symlinks are not followed.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{ObjectRef, ObjectStore};
use crate::error::LocationError;

/// Buckets mirrored as directories under a root.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Open a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::BackendUnavailable`] if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, LocationError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(LocationError::BackendUnavailable {
                reason: format!("bucket root {} is not a directory", root.display()),
            });
        }
        Ok(Self { root })
    }

    /// The store root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> Option<PathBuf> {
        is_plain_segment(bucket).then(|| self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> Option<PathBuf> {
        let mut path = self.bucket_dir(bucket)?;
        for segment in key.split('/') {
            if !is_plain_segment(segment) {
                return None;
            }
            path.push(segment);
        }
        Some(path)
    }
}

/// A non-empty path segment that cannot escape its parent.
fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains(['/', '\\'])
}

/// `/`-joined key of `path` relative to `bucket_dir`.
fn key_of(bucket_dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(bucket_dir).ok()?;
    let segments: Option<Vec<&str>> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect();
    Some(segments?.join("/"))
}

impl ObjectStore for DirectoryStore {
    fn bucket_exists(&self, bucket: &str) -> bool {
        self.bucket_dir(bucket).is_some_and(|dir| dir.is_dir())
    }

    fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectRef>, LocationError> {
        let bucket_dir = self
            .bucket_dir(bucket)
            .filter(|dir| dir.is_dir())
            .ok_or_else(|| LocationError::NotFound {
                resource: format!("bucket {bucket}"),
            })?;

        // Only the directory part of the prefix narrows the walk; the rest is a
        // plain string prefix on the key.
        let walk_root = match prefix.rfind('/') {
            Some(idx) => match self.object_path(bucket, &prefix[..idx]) {
                Some(dir) => dir,
                None => return Ok(Vec::new()),
            },
            None => bucket_dir.clone(),
        };
        if !walk_root.is_dir() {
            return Ok(Vec::new());
        }

        let mut objects = Vec::new();
        for entry in WalkDir::new(&walk_root)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                LocationError::Storage(format!("listing gs://{bucket}/{prefix} failed: {e}"))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(key) = key_of(&bucket_dir, entry.path()) else {
                tracing::warn!(path = %entry.path().display(), "skipping object with non UTF-8 key");
                continue;
            };
            if key.starts_with(prefix) {
                objects.push(ObjectRef::new(bucket, key));
            }
        }
        Ok(objects)
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, LocationError> {
        let not_found = || LocationError::NotFound {
            resource: ObjectRef::new(bucket, key).uri(),
        };
        let path = self.object_path(bucket, key).ok_or_else(not_found)?;
        if !path.is_file() {
            return Err(not_found());
        }
        std::fs::read(&path).map_err(|source| LocationError::Io { file: path, source })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, DirectoryStore) {
        let tmp = TempDir::new().unwrap();
        let bucket = tmp.path().join("dummy_bucket");
        fs::create_dir_all(bucket.join("lib_folder/sub")).unwrap();
        fs::write(bucket.join("input.json"), "{}").unwrap();
        fs::write(bucket.join("lib_folder/file2.wstl"), "x: 1").unwrap();
        fs::write(bucket.join("lib_folder/file3.txt"), "").unwrap();
        fs::write(bucket.join("lib_folder/sub/file4.wstl"), "").unwrap();
        let store = DirectoryStore::open(tmp.path()).unwrap();
        (tmp, store)
    }

    fn keys(objects: Vec<ObjectRef>) -> Vec<String> {
        objects.into_iter().map(|o| o.key).collect()
    }

    #[test]
    fn test_open_requires_directory() {
        let tmp = TempDir::new().unwrap();
        let err = DirectoryStore::open(tmp.path().join("missing")).unwrap_err();
        assert!(matches!(err, LocationError::BackendUnavailable { .. }));
    }

    #[test]
    fn test_list_whole_bucket_sorted() {
        let (_tmp, store) = fixture();
        assert_eq!(
            keys(store.list_objects("dummy_bucket", "").unwrap()),
            vec![
                "input.json",
                "lib_folder/file2.wstl",
                "lib_folder/file3.txt",
                "lib_folder/sub/file4.wstl"
            ]
        );
    }

    #[test]
    fn test_list_with_prefix() {
        let (_tmp, store) = fixture();
        assert_eq!(
            keys(store.list_objects("dummy_bucket", "lib_folder/sub").unwrap()),
            vec!["lib_folder/sub/file4.wstl"]
        );
        assert!(store.list_objects("dummy_bucket", "nothing/here").unwrap().is_empty());
    }

    #[test]
    fn test_missing_bucket() {
        let (_tmp, store) = fixture();
        assert!(!store.bucket_exists("other"));
        assert!(!store.bucket_exists(".."));
        let err = store.list_objects("other", "").unwrap_err();
        assert!(matches!(err, LocationError::NotFound { .. }));
    }

    #[test]
    fn test_get_object_rejects_escape() {
        let (_tmp, store) = fixture();
        assert_eq!(store.get_object("dummy_bucket", "lib_folder/file2.wstl").unwrap(), b"x: 1");
        let err = store.get_object("dummy_bucket", "../dummy_bucket/input.json").unwrap_err();
        assert!(matches!(err, LocationError::NotFound { .. }));
        let err = store.get_object("dummy_bucket", "lib_folder").unwrap_err();
        assert!(matches!(err, LocationError::NotFound { .. }));
    }
}
