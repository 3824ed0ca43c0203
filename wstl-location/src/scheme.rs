//! Scheme prefix dispatch.

use std::fmt;
use std::str::FromStr;

use crate::error::LocationError;

/// The data source an argument points at, selected by its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// `json://` - inline JSON literal.
    Json,
    /// `gs://` - object in a storage bucket.
    Gs,
    /// `file://` - path or glob on the local filesystem.
    File,
    /// `py://` - named variable in the host namespace.
    Py,
}

impl Scheme {
    /// Every scheme, in the order used for diagnostics.
    pub const ALL: [Self; 4] = [Self::Json, Self::Gs, Self::File, Self::Py];

    /// The argument prefix, including the `://` separator.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Json => "json://",
            Self::Gs => "gs://",
            Self::File => "file://",
            Self::Py => "py://",
        }
    }

    /// The bare scheme name (`json`, `gs`, `file`, `py`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Gs => "gs",
            Self::File => "file",
            Self::Py => "py",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scheme {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scheme| scheme.name() == s)
            .ok_or_else(|| unknown_scheme(s))
    }
}

/// Comma-separated list of supported prefixes, e.g. `json://,gs://,file://,py://`.
#[must_use]
pub fn supported_prefixes() -> String {
    Scheme::ALL
        .into_iter()
        .map(Scheme::prefix)
        .collect::<Vec<_>>()
        .join(",")
}

fn unknown_scheme(argument: &str) -> LocationError {
    LocationError::UnknownScheme {
        argument: argument.to_owned(),
        supported: supported_prefixes(),
    }
}

/// Split a raw argument into its scheme and payload.
///
/// Matching is case-sensitive and prefix-based; the payload is returned exactly
/// as it follows the prefix.
///
/// # Errors
///
/// Returns [`LocationError::UnknownScheme`] if `raw` starts with none of the
/// supported prefixes.
pub fn dispatch(raw: &str) -> Result<(Scheme, &str), LocationError> {
    Scheme::ALL
        .into_iter()
        .find_map(|scheme| {
            raw.strip_prefix(scheme.prefix())
                .map(|payload| (scheme, payload))
        })
        .ok_or_else(|| unknown_scheme(raw))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_extracts_payload_for_every_prefix() {
        for scheme in Scheme::ALL {
            let raw = format!("{}some/payload*.json", scheme.prefix());
            let (got, payload) = dispatch(&raw).unwrap();
            assert_eq!(got, scheme);
            assert_eq!(payload, "some/payload*.json");
        }
    }

    #[test]
    fn test_dispatch_keeps_payload_verbatim() {
        let (scheme, payload) = dispatch(r#"json://  {"a": [1, 2]} "#).unwrap();
        assert_eq!(scheme, Scheme::Json);
        assert_eq!(payload, r#"  {"a": [1, 2]} "#);
    }

    #[test]
    fn test_dispatch_empty_payload() {
        let (scheme, payload) = dispatch("py://").unwrap();
        assert_eq!(scheme, Scheme::Py);
        assert_eq!(payload, "");
    }

    #[test]
    fn test_dispatch_is_case_sensitive() {
        let err = dispatch("JSON://{}").unwrap_err();
        assert!(matches!(err, LocationError::UnknownScheme { .. }));
    }

    #[test]
    fn test_dispatch_unknown_prefix_lists_supported() {
        let err = dispatch("invalid://blah").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("json://,gs://,file://,py://"), "got: {msg}");
        assert!(msg.contains("invalid://blah"), "got: {msg}");
    }

    #[test]
    fn test_dispatch_bare_path_is_unknown() {
        assert!(dispatch("/tmp/input.json").is_err());
        assert!(dispatch("").is_err());
    }

    #[test]
    fn test_scheme_from_name() {
        assert_eq!("gs".parse::<Scheme>().unwrap(), Scheme::Gs);
        assert!("s3".parse::<Scheme>().is_err());
    }
}
