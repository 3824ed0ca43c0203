//! Location values and the builder that wraps resolver output into them.

use serde::{Deserialize, Serialize};

use crate::error::LocationError;
use crate::scheme::Scheme;

/// A normalized reference to transform or validation input.
///
/// Serializes as the wire union consumed by the transform service: exactly one
/// of `inline_json`, `local_path` or `gcs_location` is present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    /// Literal or decoded content.
    #[serde(rename = "inline_json")]
    InlineContent(String),
    /// An on-disk path whose content has not been read.
    #[serde(rename = "local_path")]
    LocalPath(String),
    /// A fully-qualified `gs://bucket/key` reference.
    #[serde(rename = "gcs_location")]
    BucketUri(String),
}

impl Location {
    /// The wire field name of the populated variant.
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::InlineContent(_) => "inline_json",
            Self::LocalPath(_) => "local_path",
            Self::BucketUri(_) => "gcs_location",
        }
    }

    /// The content, path or URI carried by this location.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::InlineContent(s) | Self::LocalPath(s) | Self::BucketUri(s) => s,
        }
    }
}

/// One resolver output item, before it is tagged by scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawItem {
    /// Literal, decoded or raw text content.
    Content(String),
    /// A reference (local path or bucket URI) whose content was not read.
    Path(String),
}

impl RawItem {
    /// The carried text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Content(s) | Self::Path(s) => s,
        }
    }

    fn into_text(self) -> String {
        match self {
            Self::Content(s) | Self::Path(s) => s,
        }
    }
}

/// Wrap resolver output for `scheme` into locations, preserving order.
///
/// - `json` and `py` items always become [`Location::InlineContent`].
/// - `file` items become [`Location::LocalPath`] when `want_path` is set or the
///   item is a path reference, [`Location::InlineContent`] otherwise.
/// - `gs` items always become [`Location::BucketUri`].
#[must_use]
pub fn build(scheme: Scheme, items: Vec<RawItem>, want_path: bool) -> Vec<Location> {
    items
        .into_iter()
        .map(|item| match scheme {
            Scheme::Json | Scheme::Py => Location::InlineContent(item.into_text()),
            Scheme::Gs => Location::BucketUri(item.into_text()),
            Scheme::File => match item {
                RawItem::Path(path) => Location::LocalPath(path),
                RawItem::Content(text) if want_path => Location::LocalPath(text),
                RawItem::Content(text) => Location::InlineContent(text),
            },
        })
        .collect()
}

/// [`build`] for a scheme given by name (`json`, `file`, `gs`, `py`).
///
/// # Errors
///
/// Returns [`LocationError::UnknownScheme`] for any other name; the message
/// lists the supported prefixes.
pub fn build_named(
    scheme: &str,
    items: Vec<RawItem>,
    want_path: bool,
) -> Result<Vec<Location>, LocationError> {
    let scheme: Scheme = scheme.parse()?;
    Ok(build(scheme, items, want_path))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn content(s: &str) -> RawItem {
        RawItem::Content(s.to_owned())
    }

    fn path(s: &str) -> RawItem {
        RawItem::Path(s.to_owned())
    }

    #[test]
    fn test_inline_schemes_are_always_content() {
        for scheme in [Scheme::Json, Scheme::Py] {
            let locations = build(scheme, vec![content("{}"), path("x")], true);
            assert_eq!(
                locations,
                vec![
                    Location::InlineContent("{}".to_owned()),
                    Location::InlineContent("x".to_owned())
                ]
            );
        }
    }

    #[test]
    fn test_file_scheme_respects_path_items_and_want_path() {
        let items = vec![content(r#"{"a":1}"#), path("/tmp/lib.wstl")];
        assert_eq!(
            build(Scheme::File, items.clone(), false),
            vec![
                Location::InlineContent(r#"{"a":1}"#.to_owned()),
                Location::LocalPath("/tmp/lib.wstl".to_owned())
            ]
        );
        assert_eq!(
            build(Scheme::File, items, true),
            vec![
                Location::LocalPath(r#"{"a":1}"#.to_owned()),
                Location::LocalPath("/tmp/lib.wstl".to_owned())
            ]
        );
    }

    #[test]
    fn test_gs_scheme_is_always_bucket_uri() {
        let locations = build(Scheme::Gs, vec![path("gs://b/k.json")], false);
        assert_eq!(locations, vec![Location::BucketUri("gs://b/k.json".to_owned())]);
    }

    #[test]
    fn test_build_named_unknown_scheme() {
        let err = build_named("s3", vec![], false).unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, LocationError::UnknownScheme { .. }));
        assert!(msg.contains("json://,gs://,file://,py://"), "got: {msg}");
    }

    #[test]
    fn test_location_wire_shape() {
        let json = serde_json::to_value(vec![
            Location::InlineContent("{}".to_owned()),
            Location::LocalPath("/a.wstl".to_owned()),
            Location::BucketUri("gs://b/c".to_owned()),
        ])
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"inline_json": "{}"},
                {"local_path": "/a.wstl"},
                {"gcs_location": "gs://b/c"}
            ])
        );
    }
}
