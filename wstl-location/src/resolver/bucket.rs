//! `gs://` arguments.
//!
//! The payload is `bucket/key-or-glob`. Objects are listed under the directory
//! part of the key pattern and the full key of each object is matched against
//! the pattern with shell-glob semantics. Wildcards never cross `/`, so
//! `lib_folder/*` selects direct children of `lib_folder/` only.

use std::collections::BTreeSet;

use glob::{MatchOptions, Pattern};
use tracing::{debug, info};

use super::{ResolvePolicy, escape_unclosed_brackets, required_extensions};
use crate::error::LocationError;
use crate::location::RawItem;
use crate::policy::extension_of;
use crate::scheme::Scheme;
use crate::store::{ObjectRef, ObjectStore};

/// Match options for object keys: case-sensitive, `/` only matched literally,
/// leading dots matched by wildcards.
const KEY_MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A bucket argument split into bucket name and key pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPath {
    /// Bucket name.
    pub bucket: String,
    /// Key or key glob within the bucket.
    pub key_pattern: String,
}

impl BucketPath {
    /// Normalize `path` and split it at the first separator.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::InvalidBucketPath`] if the normalized path has
    /// no separator or starts with one (no bucket name can be extracted).
    pub fn parse(path: &str) -> Result<Self, LocationError> {
        let normalized = normalize_path(path);
        match normalized.find('/') {
            Some(offset) if offset > 0 => Ok(Self {
                bucket: normalized[..offset].to_owned(),
                key_pattern: normalized[offset + 1..].to_owned(),
            }),
            _ => Err(LocationError::InvalidBucketPath { path: normalized }),
        }
    }

    /// Listing prefix: everything before the final `/` of the key pattern.
    #[must_use]
    pub fn listing_prefix(&self) -> &str {
        self.key_pattern
            .rfind('/')
            .map_or("", |idx| &self.key_pattern[..idx])
    }
}

/// Collapse redundant separators, drop `.` segments and resolve `..` segments.
///
/// Follows POSIX `normpath` rules: an empty path becomes `.`, `..` cannot climb
/// above an absolute root, and a leading `//` (exactly two slashes) is kept.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_owned();
    }

    let leading = if path.starts_with("//") && !path.starts_with("///") {
        "//"
    } else if path.starts_with('/') {
        "/"
    } else {
        ""
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if leading.is_empty() {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let joined = format!("{leading}{}", segments.join("/"));
    if joined.is_empty() {
        ".".to_owned()
    } else {
        joined
    }
}

/// Filter a listing by extension and key pattern, returning `gs://` URIs.
///
/// Pure over the listing so it can be exercised without a storage backend.
/// Listing order is preserved.
///
/// # Errors
///
/// Returns [`LocationError::InvalidPattern`] if `key_pattern` is not a valid
/// glob.
pub fn match_listing(
    objects: &[ObjectRef],
    key_pattern: &str,
    accepted_extensions: Option<&BTreeSet<String>>,
) -> Result<Vec<String>, LocationError> {
    let pattern =
        Pattern::new(&escape_unclosed_brackets(key_pattern)).map_err(|e| {
            LocationError::InvalidPattern {
                pattern: key_pattern.to_owned(),
                message: e.to_string(),
            }
        })?;

    Ok(objects
        .iter()
        .filter(|object| {
            accepted_extensions.is_none_or(|accepted| {
                extension_of(&object.key).is_some_and(|ext| accepted.contains(ext))
            })
        })
        .filter(|object| pattern.matches_with(&object.key, KEY_MATCH_OPTIONS))
        .map(ObjectRef::uri)
        .collect())
}

/// Resolve a bucket path into the URIs of matching objects.
///
/// An empty listing, or one where every object is filtered out, is an empty
/// result rather than an error.
///
/// # Errors
///
/// - [`LocationError::Configuration`] if no extension set is given
/// - [`LocationError::InvalidBucketPath`] if no bucket name can be extracted
/// - [`LocationError::BackendUnavailable`] if no store is configured
/// - [`LocationError::NotFound`] if the bucket does not exist
/// - [`LocationError::InvalidPattern`] if the key pattern is not a valid glob
/// - any listing failure reported by the store
pub fn resolve_bucket(
    payload: &str,
    policy: ResolvePolicy<'_>,
    store: Option<&dyn ObjectStore>,
) -> Result<Vec<RawItem>, LocationError> {
    let accepted = required_extensions(Scheme::Gs, policy)?;
    let path = BucketPath::parse(payload)?;

    let store = store.ok_or_else(|| LocationError::BackendUnavailable {
        reason: "no object store configured".to_owned(),
    })?;
    if !store.bucket_exists(&path.bucket) {
        return Err(LocationError::NotFound {
            resource: format!("bucket {}", path.bucket),
        });
    }

    let prefix = path.listing_prefix();
    let objects = store.list_objects(&path.bucket, prefix)?;
    debug!(bucket = %path.bucket, prefix, listed = objects.len(), "listed bucket objects");

    let uris = match_listing(&objects, &path.key_pattern, Some(accepted))?;
    info!(
        bucket = %path.bucket,
        pattern = %path.key_pattern,
        matched = uris.len(),
        "resolved bucket pattern"
    );
    Ok(uris.into_iter().map(RawItem::Path).collect())
}
